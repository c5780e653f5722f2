//! Slash command definitions and the handler trait.
//!
//! A command is any type implementing [`SlashCommand`]. Its static shape
//! (name, description, options, checks, and the lazily built buttons and
//! menus attached to its replies) lives in a [`CommandDefinition`], built
//! once when the command is constructed:
//!
//! ```
//! use slashcord::prelude::*;
//!
//! struct Say {
//!     definition: CommandDefinition,
//! }
//!
//! impl Say {
//!     fn new() -> Self {
//!         let definition = CommandDefinition::new("say", "Bot repeats what you tell it to.")
//!             .options(|o| {
//!                 o.required_string("content", "What to say");
//!             })
//!             .checks(|c| {
//!                 c.check("User is a bot.", |ctx| !ctx.user().is_some_and(|u| u.bot));
//!             })
//!             .buttons(|b, ctx| {
//!                 let id = ctx.owned_component_id().action("delete");
//!                 b.danger(&id, "Delete");
//!             });
//!         Self { definition }
//!     }
//! }
//!
//! #[async_trait]
//! impl SlashCommand for Say {
//!     fn definition(&self) -> &CommandDefinition {
//!         &self.definition
//!     }
//!
//!     async fn handle_slash_command(&self, ctx: &SlashCommandContext) -> anyhow::Result<CommandResult> {
//!         let content: String = ctx.option_value("content")?;
//!         Ok(ctx.result().embed(|e| e.description(content)).with_command_buttons())
//!     }
//! }
//! ```

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use twilight_model::{
    application::command::{Command, CommandOption, CommandType},
    channel::message::Component,
    id::{marker::GuildMarker, Id},
};
use twilight_util::builder::command::CommandBuilder;

use crate::{
    check::{run_checks, Check, ChecksBuilder},
    component_id::ComponentId,
    components::{ButtonsBuilder, MenusBuilder},
    context::{ButtonClickContext, SelectionMenuContext, SlashCommandContext},
    options::OptionsBuilder,
    reply::CommandResult,
};

type ButtonFactory = dyn Fn(&mut ButtonsBuilder, &SlashCommandContext) + Send + Sync;
type MenuFactory = dyn Fn(&mut MenusBuilder, &SlashCommandContext) + Send + Sync;

/// A slash command and the handlers for the components on its replies.
///
/// Handlers must acknowledge Discord within 3 seconds. For slash commands
/// the dispatcher sends the returned [`CommandResult`]; for long work,
/// call [`SlashCommandContext::defer`] first and return the final result,
/// which then edits the deferred reply.
#[async_trait]
pub trait SlashCommand: Send + Sync + 'static {
    fn definition(&self) -> &CommandDefinition;

    /// Called when the command is invoked and every check passed.
    async fn handle_slash_command(
        &self,
        ctx: &SlashCommandContext,
    ) -> anyhow::Result<CommandResult>;

    /// Called for buttons whose component id names this command.
    async fn handle_button_click(&self, _ctx: &ButtonClickContext) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called for selection menus whose component id names this command.
    async fn handle_selection_menu(&self, _ctx: &SelectionMenuContext) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Static description of a slash command.
#[derive(Clone)]
pub struct CommandDefinition {
    name: String,
    description: String,
    guild_id: Option<Id<GuildMarker>>,
    options: Vec<CommandOption>,
    checks: Vec<Check>,
    buttons: Option<Arc<ButtonFactory>>,
    menus: Option<Arc<MenuFactory>>,
}

impl CommandDefinition {
    /// A global command.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            guild_id: None,
            options: Vec::new(),
            checks: Vec::new(),
            buttons: None,
            menus: None,
        }
    }

    /// A command registered to, and only handled in, one guild.
    pub fn guild(
        name: impl Into<String>,
        description: impl Into<String>,
        guild_id: Id<GuildMarker>,
    ) -> Self {
        Self {
            guild_id: Some(guild_id),
            ..Self::new(name, description)
        }
    }

    pub fn options(mut self, func: impl FnOnce(&mut OptionsBuilder)) -> Self {
        let mut builder = OptionsBuilder::new();
        func(&mut builder);
        self.options = builder.build();
        self
    }

    pub fn checks(mut self, func: impl FnOnce(&mut ChecksBuilder)) -> Self {
        let mut builder = ChecksBuilder::new();
        func(&mut builder);
        self.checks = builder.build();
        self
    }

    /// Buttons attached to replies that ask for them, built per invocation.
    pub fn buttons<F>(mut self, factory: F) -> Self
    where
        F: Fn(&mut ButtonsBuilder, &SlashCommandContext) + Send + Sync + 'static,
    {
        self.buttons = Some(Arc::new(factory));
        self
    }

    /// Selection menus attached to replies that ask for them, built per invocation.
    pub fn selection_menus<F>(mut self, factory: F) -> Self
    where
        F: Fn(&mut MenusBuilder, &SlashCommandContext) + Send + Sync + 'static,
    {
        self.menus = Some(Arc::new(factory));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn guild_id(&self) -> Option<Id<GuildMarker>> {
        self.guild_id
    }

    pub fn option_list(&self) -> &[CommandOption] {
        &self.options
    }

    pub fn check_list(&self) -> &[Check] {
        &self.checks
    }

    /// Global commands run anywhere; guild commands only in their guild.
    pub fn usable_in(&self, guild_id: Option<Id<GuildMarker>>) -> bool {
        match self.guild_id {
            None => true,
            Some(own) => guild_id == Some(own),
        }
    }

    /// Reasons of every failing check. Empty means the handler may run.
    pub fn run_checks(&self, ctx: &SlashCommandContext) -> Vec<String> {
        run_checks(&self.checks, ctx)
    }

    /// A component id whose first segment is this command's name.
    pub fn component_id(&self, separator: char) -> ComponentId {
        ComponentId::for_command(&self.name, separator)
    }

    pub fn build_buttons(&self, ctx: &SlashCommandContext) -> Vec<Component> {
        let mut builder = ButtonsBuilder::new();
        if let Some(factory) = &self.buttons {
            factory(&mut builder, ctx);
        }
        builder.build()
    }

    pub fn build_menus(&self, ctx: &SlashCommandContext) -> Vec<Component> {
        let mut builder = MenusBuilder::new();
        if let Some(factory) = &self.menus {
            factory(&mut builder, ctx);
        }
        builder.build()
    }

    /// The registration payload. Discord requires lowercase names.
    pub fn to_command(&self) -> Command {
        let mut builder = CommandBuilder::new(
            self.name.to_lowercase(),
            self.description.clone(),
            CommandType::ChatInput,
        );
        if let Some(guild_id) = self.guild_id {
            builder = builder.guild_id(guild_id);
        }
        for option in &self.options {
            builder = builder.option(option.clone());
        }
        builder.build()
    }
}

impl fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("guild_id", &self.guild_id)
            .field("options", &self.options.len())
            .field("checks", &self.checks.len())
            .field("buttons", &self.buttons.is_some())
            .field("menus", &self.menus.is_some())
            .finish()
    }
}
