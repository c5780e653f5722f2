//! Builder for rich embeds.
//!
//! twilight-model does not ship a mutable embed builder, and the one in
//! twilight-util cannot be inspected or reset while building. [`EmbedBuilder`]
//! fills in the 13-field [`Embed`] struct for us and adds the small
//! conveniences commands reach for: appending to the description, blank
//! fields, timestamps from `chrono`, and a running [`length`](EmbedBuilder::length).

use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use twilight_model::{
    channel::message::embed::{
        Embed, EmbedAuthor, EmbedField, EmbedFooter, EmbedImage, EmbedThumbnail,
    },
    util::Timestamp,
};

/// Zero-width space Discord accepts as an "empty" field name or value.
const BLANK: &str = "\u{200B}";

/// Named 24-bit RGB colors.
pub mod colors {
    pub const RED: u32 = 0xFF0000;
    pub const GREEN: u32 = 0x00FF00;
    pub const BLUE: u32 = 0x0000FF;
    pub const MAGENTA: u32 = 0xFF00FF;
    pub const ORANGE: u32 = 0xFFC800;
    pub const YELLOW: u32 = 0xFFFF00;
    pub const BLURPLE: u32 = 0x5865F2;
    pub const GRAY: u32 = 0x808080;
}

/// Build an [`Embed`] in one expression.
///
/// ```
/// use slashcord::embed::{embed, colors};
///
/// let e = embed(|b| b.title("Hello").description("World").color(colors::GREEN));
/// assert_eq!(e.title.as_deref(), Some("Hello"));
/// ```
pub fn embed(func: impl FnOnce(EmbedBuilder) -> EmbedBuilder) -> Embed {
    func(EmbedBuilder::new()).build()
}

/// Ergonomic builder for [`Embed`].
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedBuilder {
    inner: Embed,
}

fn empty_embed() -> Embed {
    Embed {
        author: None,
        color: None,
        description: None,
        fields: Vec::new(),
        footer: None,
        image: None,
        kind: "rich".to_string(),
        provider: None,
        thumbnail: None,
        timestamp: None,
        title: None,
        url: None,
        video: None,
    }
}

impl EmbedBuilder {
    /// Create a new empty embed builder.
    pub fn new() -> Self {
        Self {
            inner: empty_embed(),
        }
    }

    /// Start from an existing embed, e.g. to edit a message's embed.
    pub fn from_embed(embed: Embed) -> Self {
        Self { inner: embed }
    }

    /// Clear everything set so far.
    pub fn reset(mut self) -> Self {
        self.inner = empty_embed();
        self
    }

    /// Number of characters counted against Discord's 6000 character limit.
    pub fn length(&self) -> usize {
        let e = &self.inner;
        let count = |s: &Option<String>| s.as_deref().map_or(0, |s| s.chars().count());

        count(&e.title)
            + count(&e.description)
            + e.fields
                .iter()
                .map(|f| f.name.chars().count() + f.value.chars().count())
                .sum::<usize>()
            + e.footer.as_ref().map_or(0, |f| f.text.chars().count())
            + e.author.as_ref().map_or(0, |a| a.name.chars().count())
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.inner.title = Some(title.into());
        self
    }

    /// Set the title and make it a hyperlink.
    pub fn title_url(mut self, title: impl Into<String>, url: impl Into<String>) -> Self {
        self.inner.title = Some(title.into());
        self.inner.url = Some(url.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.inner.url = Some(url.into());
        self
    }

    pub fn description(mut self, content: impl Into<String>) -> Self {
        self.inner.description = Some(content.into());
        self
    }

    /// Append to the description, starting one if none is set.
    pub fn append_description(mut self, content: impl AsRef<str>) -> Self {
        self.inner
            .description
            .get_or_insert_with(String::new)
            .push_str(content.as_ref());
        self
    }

    /// Write the description through a `String` buffer.
    pub fn build_description(mut self, func: impl FnOnce(&mut String)) -> Self {
        let mut buf = String::new();
        func(&mut buf);
        self.inner.description = Some(buf);
        self
    }

    /// Add a field. `body` is rendered with its `Display` impl.
    pub fn field(mut self, name: impl Into<String>, body: impl Display, inline: bool) -> Self {
        self.inner.fields.push(EmbedField {
            inline,
            name: name.into(),
            value: body.to_string(),
        });
        self
    }

    pub fn field_inline(self, name: impl Into<String>, body: impl Display) -> Self {
        self.field(name, body, true)
    }

    /// Add a field with no visible name or value, used as a spacer.
    pub fn blank_field(self, inline: bool) -> Self {
        self.field(BLANK, BLANK, inline)
    }

    pub fn raw_field(mut self, field: EmbedField) -> Self {
        self.inner.fields.push(field);
        self
    }

    /// Add several fields through a [`FieldScope`].
    ///
    /// ```
    /// use slashcord::embed::EmbedBuilder;
    ///
    /// let e = EmbedBuilder::new()
    ///     .fields(|f| f.normal("Uptime", "3h").inline("Guilds", 12).blank(false))
    ///     .build();
    /// assert_eq!(e.fields.len(), 3);
    /// ```
    pub fn fields(self, func: impl FnOnce(FieldScope) -> FieldScope) -> Self {
        func(FieldScope { builder: self }).builder
    }

    pub fn author(self, name: impl Into<String>) -> Self {
        self.author_with(name, None::<String>, None::<String>)
    }

    pub fn author_with(
        mut self,
        name: impl Into<String>,
        url: Option<impl Into<String>>,
        icon_url: Option<impl Into<String>>,
    ) -> Self {
        self.inner.author = Some(EmbedAuthor {
            icon_url: icon_url.map(Into::into),
            name: name.into(),
            proxy_icon_url: None,
            url: url.map(Into::into),
        });
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.inner.footer = Some(EmbedFooter {
            icon_url: None,
            proxy_icon_url: None,
            text: text.into(),
        });
        self
    }

    pub fn footer_with_icon(mut self, text: impl Into<String>, icon_url: impl Into<String>) -> Self {
        self.inner.footer = Some(EmbedFooter {
            icon_url: Some(icon_url.into()),
            proxy_icon_url: None,
            text: text.into(),
        });
        self
    }

    /// Set the timestamp. Out-of-range instants leave it unset.
    pub fn timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.inner.timestamp = Timestamp::from_micros(at.timestamp_micros()).ok();
        self
    }

    pub fn timestamp_now(self) -> Self {
        self.timestamp(Utc::now())
    }

    /// Set the embed color (as a 24-bit RGB integer, e.g. `0xFF6600`).
    pub fn color(mut self, color: u32) -> Self {
        self.inner.color = Some(color & 0xFF_FFFF);
        self
    }

    pub fn image(mut self, url: impl Into<String>) -> Self {
        self.inner.image = Some(EmbedImage {
            height: None,
            proxy_url: None,
            url: url.into(),
            width: None,
        });
        self
    }

    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.inner.thumbnail = Some(EmbedThumbnail {
            height: None,
            proxy_url: None,
            url: url.into(),
            width: None,
        });
        self
    }

    /// Consume the builder and return the finished [`Embed`].
    pub fn build(self) -> Embed {
        self.inner
    }
}

impl Default for EmbedBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Embed> for EmbedBuilder {
    fn from(embed: Embed) -> Self {
        Self::from_embed(embed)
    }
}

/// Field helpers handed out by [`EmbedBuilder::fields`].
pub struct FieldScope {
    builder: EmbedBuilder,
}

impl FieldScope {
    pub fn normal(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.builder = self.builder.field(name, value, false);
        self
    }

    pub fn inline(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.builder = self.builder.field(name, value, true);
        self
    }

    pub fn blank(mut self, inline: bool) -> Self {
        self.builder = self.builder.blank_field(inline);
        self
    }

    pub fn raw(mut self, field: EmbedField) -> Self {
        self.builder = self.builder.raw_field(field);
        self
    }
}

impl fmt::Debug for FieldScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldScope")
            .field("fields", &self.builder.inner.fields.len())
            .finish()
    }
}
