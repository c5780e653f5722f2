//! Builder syntax for Discord slash commands, buttons and selection menus.
//!
//! Commands implement [`SlashCommand`](command::SlashCommand) and describe
//! themselves with a [`CommandDefinition`](command::CommandDefinition). A
//! [`SlashCommandClient`](client::SlashCommandClient) registers them when the
//! gateway reports READY and routes every interaction to the right handler.
//! Gateway, REST and models all come from twilight.
//!
//! With the `gateway` feature, [`bot::start`] runs a complete bot:
//!
//! ```no_run
//! # async fn run(say: impl slashcord::command::SlashCommand) -> anyhow::Result<()> {
//! use slashcord::prelude::*;
//!
//! let config = ClientConfig::of(|c| {
//!     c.command(say);
//! });
//! slashcord::bot::start(config).await
//! # }
//! ```

#[cfg(feature = "gateway")]
pub mod bot;
pub mod check;
pub mod client;
pub mod command;
pub mod component_id;
pub mod components;
pub mod config;
pub mod context;
pub mod embed;
pub mod error;
pub mod events;
pub mod ext;
pub mod http;
pub mod markdown;
pub mod options;
pub mod reply;

pub use error::{Error, Result};

/// Everything a command implementation usually needs.
pub mod prelude {
    pub use async_trait::async_trait;

    pub use crate::check::{Check, ChecksBuilder};
    pub use crate::client::SlashCommandClient;
    pub use crate::command::{CommandDefinition, SlashCommand};
    pub use crate::component_id::ComponentId;
    pub use crate::components::{
        unicode_emoji, ButtonsBuilder, MenusBuilder, SelectMenuBuilder, SelectOption,
    };
    pub use crate::config::{ClientConfig, Settings};
    pub use crate::context::{
        ButtonClickContext, ComponentContext, FromOptionValue, SelectionMenuContext,
        SlashCommandContext,
    };
    pub use crate::embed::{colors, embed, EmbedBuilder};
    pub use crate::ext::{CommandOptionExt, InteractionExt, PermissionsExt};
    pub use crate::markdown::markdown;
    pub use crate::options::{build_options, CommandListBuilder, OptionsBuilder};
    pub use crate::reply::CommandResult;
}
