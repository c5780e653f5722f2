//! Error type shared by every module in the crate.
//!
//! Most failures are simply forwarded from twilight. The remaining variants
//! cover misuse of the builders and contexts, like sending a reply with
//! nothing in it or answering the same interaction twice.

use twilight_http::response::DeserializeBodyError;

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A reply was built without content, embeds, components or a defer.
    #[error("cannot form a reply with no data")]
    EmptyReply,

    /// A required option was absent from the command invocation.
    #[error("option `{0}` did not have a value")]
    MissingOption(String),

    /// An option was present but of a different type than requested.
    #[error("option `{name}` is not of type {expected}")]
    OptionType {
        name: String,
        expected: &'static str,
    },

    /// The interaction has already received its initial response.
    #[error("interaction has already been acknowledged")]
    AlreadyAcknowledged,

    /// READY arrived after the client had already been initialized.
    #[error("cannot reinitialize the slash command client")]
    AlreadyInitialized,

    /// REST call failed inside twilight-http.
    #[error(transparent)]
    Http(#[from] twilight_http::Error),

    /// REST call succeeded but the body could not be parsed.
    #[error(transparent)]
    Deserialize(#[from] DeserializeBodyError),

    /// Settings file could not be read.
    #[error("failed to read settings: {0}")]
    SettingsIo(#[from] std::io::Error),

    /// Settings file is not valid JSON for [`Settings`](crate::config::Settings).
    #[error("failed to parse settings: {0}")]
    SettingsFormat(#[from] serde_json::Error),

    /// A command handler returned an error.
    #[error("command handler failed: {0:#}")]
    Handler(#[source] anyhow::Error),
}

impl Error {
    /// Whether this error was raised by the library rather than Discord.
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            Error::EmptyReply
                | Error::MissingOption(_)
                | Error::OptionType { .. }
                | Error::AlreadyAcknowledged
                | Error::AlreadyInitialized
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_reply_message() {
        assert_eq!(
            Error::EmptyReply.to_string(),
            "cannot form a reply with no data"
        );
    }

    #[test]
    fn option_type_message_names_option_and_type() {
        let err = Error::OptionType {
            name: "sides".into(),
            expected: "integer",
        };
        assert_eq!(err.to_string(), "option `sides` is not of type integer");
    }

    #[test]
    fn handler_error_keeps_context_chain() {
        let inner = anyhow::anyhow!("disk full").context("saving state");
        let err = Error::Handler(inner);
        assert_eq!(
            err.to_string(),
            "command handler failed: saving state: disk full"
        );
        assert!(!err.is_misuse());
    }

    #[test]
    fn misuse_variants_are_flagged() {
        assert!(Error::EmptyReply.is_misuse());
        assert!(Error::AlreadyAcknowledged.is_misuse());
        assert!(Error::MissingOption("x".into()).is_misuse());
    }
}
