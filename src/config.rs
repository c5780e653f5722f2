//! Client configuration: the registered commands plus the handful of values
//! that would otherwise be constants (separator, check-failure embed text).

use std::{fmt, path::Path, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    command::SlashCommand,
    component_id::DEFAULT_SEPARATOR,
    embed::colors,
    error::Result,
};

/// Tunable values, loadable from JSON.
///
/// Every field has a default, so a settings file only needs to name what it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The separator used when forming and parsing component ids.
    pub component_id_separator: char,
    /// Color of the embed sent when one or more checks fail.
    pub checks_failed_color: u32,
    /// Title of the embed sent when one or more checks fail.
    pub checks_failed_title: String,
    /// Line format for each failed check; `{}` is replaced by its reason.
    pub checks_failed_line_format: String,
    /// Reason of the built-in application-owner check.
    pub check_user_not_owner: String,
    /// Reason of the built-in administrator check.
    pub check_user_not_admin: String,
    /// Overwrite the application's commands when READY arrives.
    pub register_commands: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            component_id_separator: DEFAULT_SEPARATOR,
            checks_failed_color: colors::RED,
            checks_failed_title: "One or more checks failed".to_string(),
            checks_failed_line_format: " - {}".to_string(),
            check_user_not_owner: "User is not an owner of the Application.".to_string(),
            check_user_not_admin: "User does not have the Administrator permission.".to_string(),
            register_commands: true,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Render one line of the check-failure embed.
    pub fn format_failed_check(&self, reason: &str) -> String {
        self.checks_failed_line_format.replace("{}", reason)
    }
}

/// Commands plus [`Settings`].
#[derive(Clone, Default)]
pub struct ClientConfig {
    settings: Settings,
    commands: Vec<Arc<dyn SlashCommand>>,
}

impl ClientConfig {
    /// Default settings, no commands.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure in a closure.
    pub fn of(func: impl FnOnce(&mut ClientConfig)) -> Self {
        let mut config = Self::default();
        func(&mut config);
        config
    }

    /// Default settings with the given commands.
    pub fn just_commands<I>(commands: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn SlashCommand>>,
    {
        let mut config = Self::default();
        config.commands(commands);
        config
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Register one command. A command whose name is already taken
    /// (case-insensitively) is ignored.
    pub fn command(&mut self, command: impl SlashCommand) -> &mut Self {
        self.add(Arc::new(command))
    }

    pub fn commands<I>(&mut self, commands: I) -> &mut Self
    where
        I: IntoIterator<Item = Arc<dyn SlashCommand>>,
    {
        for command in commands {
            self.add(command);
        }
        self
    }

    fn add(&mut self, command: Arc<dyn SlashCommand>) -> &mut Self {
        let name = command.definition().name();
        if self.command_by(name).is_some() {
            warn!(command = name, "duplicate slash command name, ignoring");
        } else {
            self.commands.push(command);
        }
        self
    }

    pub fn all_commands(&self) -> &[Arc<dyn SlashCommand>] {
        &self.commands
    }

    /// Commands registered application-wide.
    pub fn global_commands(&self) -> impl Iterator<Item = &Arc<dyn SlashCommand>> {
        self.commands
            .iter()
            .filter(|c| c.definition().guild_id().is_none())
    }

    /// Commands bound to a single guild.
    pub fn guild_commands(&self) -> impl Iterator<Item = &Arc<dyn SlashCommand>> {
        self.commands
            .iter()
            .filter(|c| c.definition().guild_id().is_some())
    }

    /// Look a command up by name, ignoring case.
    pub fn command_by(&self, name: &str) -> Option<&Arc<dyn SlashCommand>> {
        self.commands
            .iter()
            .find(|c| c.definition().name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self
            .commands
            .iter()
            .map(|c| c.definition().name())
            .collect();
        f.debug_struct("ClientConfig")
            .field("settings", &self.settings)
            .field("commands", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::test_support::StaticCommand;
    use serde_test::{assert_de_tokens, Token};
    use twilight_model::id::Id;

    #[test]
    fn default_settings_match_documented_values() {
        let s = Settings::default();
        assert_eq!(s.component_id_separator, ':');
        assert_eq!(s.checks_failed_color, 0xFF0000);
        assert_eq!(s.checks_failed_title, "One or more checks failed");
        assert!(s.register_commands);
    }

    #[test]
    fn partial_settings_fill_defaults() {
        let custom = Settings {
            component_id_separator: '|',
            checks_failed_title: "Nope".to_string(),
            ..Settings::default()
        };
        assert_de_tokens(
            &custom,
            &[
                Token::Struct {
                    name: "Settings",
                    len: 2,
                },
                Token::Str("component_id_separator"),
                Token::Char('|'),
                Token::Str("checks_failed_title"),
                Token::Str("Nope"),
                Token::StructEnd,
            ],
        );
    }

    #[test]
    fn settings_from_json() {
        let s = Settings::from_json(r#"{ "checks_failed_color": 255 }"#).unwrap();
        assert_eq!(s.checks_failed_color, 255);
        assert_eq!(s.checks_failed_line_format, " - {}");
    }

    #[test]
    fn settings_from_bad_json_is_an_error() {
        let err = Settings::from_json("{ not json").unwrap_err();
        assert!(err.to_string().starts_with("failed to parse settings"));
    }

    #[test]
    fn format_failed_check_replaces_placeholder() {
        let s = Settings::default();
        assert_eq!(s.format_failed_check("no admin"), " - no admin");
    }

    #[test]
    fn command_lookup_is_case_insensitive() {
        let config = ClientConfig::of(|c| {
            c.command(StaticCommand::global("Say", "Repeat"));
        });
        assert!(config.command_by("say").is_some());
        assert!(config.command_by("SAY").is_some());
        assert!(config.command_by("other").is_none());
    }

    #[test]
    fn duplicate_names_are_ignored() {
        let config = ClientConfig::of(|c| {
            c.command(StaticCommand::global("say", "first"))
                .command(StaticCommand::global("SAY", "second"));
        });
        assert_eq!(config.all_commands().len(), 1);
        assert_eq!(
            config.command_by("say").map(|c| c.definition().description()),
            Some("first")
        );
    }

    #[test]
    fn splits_global_and_guild_commands() {
        let config = ClientConfig::of(|c| {
            c.command(StaticCommand::global("a", "global"))
                .command(StaticCommand::guild("b", "guild", Id::new(7)))
                .command(StaticCommand::global("c", "global"));
        });
        assert_eq!(config.global_commands().count(), 2);
        let guild: Vec<_> = config
            .guild_commands()
            .map(|c| c.definition().name())
            .collect();
        assert_eq!(guild, ["b"]);
    }

    #[test]
    fn debug_lists_command_names() {
        let config = ClientConfig::just_commands([
            Arc::new(StaticCommand::global("ping", "p")) as Arc<dyn SlashCommand>,
        ]);
        assert!(format!("{config:?}").contains("\"ping\""));
    }
}
