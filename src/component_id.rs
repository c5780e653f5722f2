//! Component IDs carried by buttons and selection menus.
//!
//! Every interactive component this crate creates carries a custom id of the
//! form `command:user:action:value`. The dispatcher reads the first segment
//! to find which [`SlashCommand`](crate::command::SlashCommand) should
//! receive the click. The rest is free for the command to use: the user
//! segment is usually the invoker so other people can't press someone
//! else's buttons, the action distinguishes several buttons on one message,
//! and the value carries an argument (page number, amount, ...).

use std::fmt;

/// Separator used when none is configured.
pub const DEFAULT_SEPARATOR: char = ':';

const NAME: usize = 0;
const USER: usize = 1;
const ACTION: usize = 2;
const VALUE: usize = 3;

/// Builder and parser for `name:user:action:value` component ids.
///
/// Encoding appends segments in call order, so call [`name`](Self::name),
/// [`user`](Self::user), [`action`](Self::action) and [`value`](Self::value)
/// in that order.
///
/// ```
/// use slashcord::component_id::ComponentId;
///
/// let id = ComponentId::for_command("say", ':').user(42).action("delete");
/// assert_eq!(id.as_str(), "say:42:delete");
///
/// let parsed = ComponentId::parse("say:42:delete", ':');
/// assert_eq!(parsed.action_part(), Some("delete"));
/// assert_eq!(parsed.value_part(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentId {
    raw: String,
    separator: char,
}

impl ComponentId {
    /// An empty id.
    pub fn new(separator: char) -> Self {
        Self {
            raw: String::new(),
            separator,
        }
    }

    /// Wrap an existing custom id for decoding.
    pub fn parse(raw: impl Into<String>, separator: char) -> Self {
        Self {
            raw: raw.into(),
            separator,
        }
    }

    /// An id whose first segment is `command`.
    pub fn for_command(command: &str, separator: char) -> Self {
        Self::new(separator).name(command)
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// The buffer as built, trailing separators included.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The id as it should be sent to Discord.
    pub fn as_str(&self) -> &str {
        self.raw.trim_end_matches(self.separator)
    }

    fn push(mut self, value: impl fmt::Display) -> Self {
        use fmt::Write;
        // Writing into a String cannot fail.
        let _ = write!(self.raw, "{}{}", value, self.separator);
        self
    }

    fn segment(&self, index: usize) -> Option<&str> {
        self.raw
            .split(self.separator)
            .nth(index)
            .filter(|s| !s.is_empty())
    }

    pub fn name(self, value: impl fmt::Display) -> Self {
        self.push(value)
    }

    pub fn user(self, value: impl fmt::Display) -> Self {
        self.push(value)
    }

    pub fn action(self, value: impl fmt::Display) -> Self {
        self.push(value)
    }

    pub fn value(self, value: impl fmt::Display) -> Self {
        self.push(value)
    }

    /// The command name segment.
    pub fn command_name(&self) -> Option<&str> {
        self.segment(NAME)
    }

    pub fn user_part(&self) -> Option<&str> {
        self.segment(USER)
    }

    pub fn action_part(&self) -> Option<&str> {
        self.segment(ACTION)
    }

    pub fn value_part(&self) -> Option<&str> {
        self.segment(VALUE)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ComponentId> for String {
    fn from(id: ComponentId) -> Self {
        id.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_all_four_segments() {
        let id = ComponentId::for_command("purge", ':')
            .user(123)
            .action("confirm")
            .value(50);
        assert_eq!(id.as_str(), "purge:123:confirm:50");
        assert_eq!(id.raw(), "purge:123:confirm:50:");
    }

    #[test]
    fn trailing_separators_are_trimmed() {
        let id = ComponentId::for_command("say", ':');
        assert_eq!(id.as_str(), "say");
        assert_eq!(id.to_string(), "say");
    }

    #[test]
    fn decodes_segments() {
        let id = ComponentId::parse("purge:123:confirm:50", ':');
        assert_eq!(id.command_name(), Some("purge"));
        assert_eq!(id.user_part(), Some("123"));
        assert_eq!(id.action_part(), Some("confirm"));
        assert_eq!(id.value_part(), Some("50"));
    }

    #[test]
    fn id_without_separator_is_name_only() {
        let id = ComponentId::parse("legacy-button", ':');
        assert_eq!(id.command_name(), Some("legacy-button"));
        assert_eq!(id.user_part(), None);
    }

    #[test]
    fn empty_segments_decode_as_none() {
        let id = ComponentId::parse("say::delete", ':');
        assert_eq!(id.user_part(), None);
        assert_eq!(id.action_part(), Some("delete"));
    }

    #[test]
    fn extra_segments_are_ignored() {
        let id = ComponentId::parse("a:b:c:d:e:f", ':');
        assert_eq!(id.value_part(), Some("d"));
    }

    #[test]
    fn custom_separator() {
        let id = ComponentId::for_command("page", '|').user(1).action("next");
        assert_eq!(id.as_str(), "page|1|next");
        let parsed = ComponentId::parse(id.as_str(), '|');
        assert_eq!(parsed.action_part(), Some("next"));
        // A different separator sees the whole id as a name.
        let wrong = ComponentId::parse(id.as_str(), ':');
        assert_eq!(wrong.command_name(), Some("page|1|next"));
    }

    #[test]
    fn converts_into_string() {
        let s: String = ComponentId::for_command("x", ':').action("y").into();
        assert_eq!(s, "x:y");
    }
}
