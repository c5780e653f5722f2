//! Tiny helpers for Discord flavoured markdown.

/// Wrap `value` for formatting.
///
/// ```
/// use slashcord::markdown::markdown;
///
/// assert_eq!(markdown("hi").bold(), "**hi**");
/// ```
pub fn markdown(value: impl Into<String>) -> Markdown {
    Markdown {
        value: value.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markdown {
    value: String,
}

impl Markdown {
    fn surround(&self, with: &str) -> String {
        format!("{with}{}{with}", self.value)
    }

    pub fn bold(&self) -> String {
        self.surround("**")
    }

    pub fn italicize(&self) -> String {
        self.surround("*")
    }

    pub fn spoiler(&self) -> String {
        self.surround("||")
    }

    pub fn underline(&self) -> String {
        self.surround("__")
    }

    pub fn inline_code(&self) -> String {
        self.surround("`")
    }

    /// A fenced code block, optionally tagged with a language.
    pub fn block_code(&self, lang: &str) -> String {
        if lang.is_empty() {
            format!("```{}```", self.value)
        } else {
            format!("```{lang}\n{}```", self.value)
        }
    }
}
