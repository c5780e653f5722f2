//! Builders for slash command options and raw command lists.
//!
//! Each `required_*` / `optional_*` method adds one option and hands back a
//! mutable reference to it, so a chain of
//! [`CommandOptionExt`](crate::ext::CommandOptionExt) calls can refine it:
//!
//! ```
//! use slashcord::ext::CommandOptionExt;
//! use slashcord::options::build_options;
//!
//! let options = build_options(|o| {
//!     o.required_string("content", "What to say");
//!     o.optional_integer("times", "How many times").min_value(1).max_value(5);
//! });
//! assert_eq!(options.len(), 2);
//! ```

use twilight_model::{
    application::command::{Command, CommandOption, CommandOptionType, CommandType},
    id::{marker::GuildMarker, Id},
};
use twilight_util::builder::command::CommandBuilder;

/// Build a list of options through an [`OptionsBuilder`].
pub fn build_options(func: impl FnOnce(&mut OptionsBuilder)) -> Vec<CommandOption> {
    let mut builder = OptionsBuilder::new();
    func(&mut builder);
    builder.build()
}

fn simple_option(
    kind: CommandOptionType,
    name: impl Into<String>,
    description: impl Into<String>,
    required: bool,
) -> CommandOption {
    CommandOption {
        autocomplete: None,
        channel_types: None,
        choices: None,
        description: description.into(),
        description_localizations: None,
        kind,
        max_length: None,
        max_value: None,
        min_length: None,
        min_value: None,
        name: name.into(),
        name_localizations: None,
        options: None,
        required: Some(required),
    }
}

macro_rules! option_kinds {
    ($( $kind:ident => $required:ident, $optional:ident; )*) => {
        $(
            pub fn $required(
                &mut self,
                name: impl Into<String>,
                description: impl Into<String>,
            ) -> &mut CommandOption {
                self.push(CommandOptionType::$kind, name, description, true)
            }

            pub fn $optional(
                &mut self,
                name: impl Into<String>,
                description: impl Into<String>,
            ) -> &mut CommandOption {
                self.push(CommandOptionType::$kind, name, description, false)
            }
        )*
    };
}

/// Collects the options of one command.
#[derive(Debug, Clone, Default)]
pub struct OptionsBuilder {
    options: Vec<CommandOption>,
}

impl OptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(
        &mut self,
        kind: CommandOptionType,
        name: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> &mut CommandOption {
        let index = self.options.len();
        self.options
            .push(simple_option(kind, name, description, required));
        &mut self.options[index]
    }

    option_kinds! {
        String => required_string, optional_string;
        Boolean => required_boolean, optional_boolean;
        User => required_user, optional_user;
        Channel => required_channel, optional_channel;
        Integer => required_integer, optional_integer;
        Number => required_number, optional_number;
        Mentionable => required_mentionable, optional_mentionable;
        Role => required_role, optional_role;
        Attachment => required_attachment, optional_attachment;
    }

    /// Add a prebuilt option.
    pub fn raw(&mut self, option: CommandOption) -> &mut CommandOption {
        let index = self.options.len();
        self.options.push(option);
        &mut self.options[index]
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Discord requires required options to precede optional ones; the
    /// order within each group is kept.
    pub fn build(mut self) -> Vec<CommandOption> {
        self.options
            .sort_by_key(|o| !o.required.unwrap_or(false));
        self.options
    }
}

/// Builds a raw list of chat-input commands for bulk registration, without
/// going through [`SlashCommand`](crate::command::SlashCommand).
#[derive(Debug, Clone, Default)]
pub struct CommandListBuilder {
    guild_id: Option<Id<GuildMarker>>,
    commands: Vec<Command>,
}

impl CommandListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp every command with `guild_id`.
    pub fn for_guild(guild_id: Id<GuildMarker>) -> Self {
        Self {
            guild_id: Some(guild_id),
            commands: Vec::new(),
        }
    }

    pub fn command(&mut self, name: &str, description: impl Into<String>) -> &mut Self {
        self.command_with(name, description, |_| {})
    }

    pub fn command_with(
        &mut self,
        name: &str,
        description: impl Into<String>,
        options: impl FnOnce(&mut OptionsBuilder),
    ) -> &mut Self {
        let mut builder = CommandBuilder::new(
            name.to_lowercase(),
            description.into(),
            CommandType::ChatInput,
        );
        if let Some(guild_id) = self.guild_id {
            builder = builder.guild_id(guild_id);
        }
        for option in build_options(options) {
            builder = builder.option(option);
        }
        self.commands.push(builder.build());
        self
    }

    pub fn build(self) -> Vec<Command> {
        self.commands
    }
}
