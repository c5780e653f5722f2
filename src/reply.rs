//! What a slash command handler returns.
//!
//! A [`CommandResult`] is turned into the initial interaction response by the
//! dispatcher, or into an edit of the original response when the handler
//! already acknowledged the interaction itself.

use std::fmt;

use twilight_model::{
    channel::message::{Component, Embed, MessageFlags},
    http::interaction::{InteractionResponse, InteractionResponseType},
};
use twilight_util::builder::InteractionResponseDataBuilder;

use crate::{
    components::{button_rows, menu_rows, ButtonsBuilder, MenusBuilder},
    embed::{embed, EmbedBuilder},
    error::{Error, Result},
};

type Modifier =
    Box<dyn FnOnce(InteractionResponseDataBuilder) -> InteractionResponseDataBuilder + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResultKind {
    Reply,
    Deferred,
    Handled,
}

/// The reply a handler wants sent.
pub struct CommandResult {
    kind: ResultKind,
    ephemeral: bool,
    content: Option<String>,
    embeds: Vec<Embed>,
    buttons: Vec<Component>,
    menus: Vec<Component>,
    command_buttons: bool,
    command_menus: bool,
    modifiers: Vec<Modifier>,
}

/// The message parts of a reply, used to edit a response already sent.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyEdit {
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
    pub components: Vec<Component>,
}

impl ReplyEdit {
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.embeds.is_empty() && self.components.is_empty()
    }
}

impl Default for CommandResult {
    fn default() -> Self {
        Self {
            kind: ResultKind::Reply,
            ephemeral: false,
            content: None,
            embeds: Vec::new(),
            buttons: Vec::new(),
            menus: Vec::new(),
            command_buttons: false,
            command_menus: false,
            modifiers: Vec::new(),
        }
    }
}

impl CommandResult {
    /// An empty reply; add content, embeds or components before returning it.
    pub fn new() -> Self {
        Self::default()
    }

    /// The handler already answered the interaction, nothing more to send.
    pub fn handled() -> Self {
        Self {
            kind: ResultKind::Handled,
            ..Self::default()
        }
    }

    /// Only acknowledge, showing the "thinking..." state.
    pub fn deferred() -> Self {
        Self {
            kind: ResultKind::Deferred,
            ..Self::default()
        }
    }

    /// Only the invoking user sees the reply.
    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn embed(mut self, func: impl FnOnce(EmbedBuilder) -> EmbedBuilder) -> Self {
        self.embeds.push(embed(func));
        self
    }

    pub fn embed_value(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn embeds(mut self, embeds: impl IntoIterator<Item = Embed>) -> Self {
        self.embeds.extend(embeds);
        self
    }

    /// Buttons specific to this reply, laid out after the command's own.
    pub fn buttons(mut self, func: impl FnOnce(&mut ButtonsBuilder)) -> Self {
        let mut builder = ButtonsBuilder::new();
        func(&mut builder);
        self.buttons.extend(builder.build());
        self
    }

    /// Selection menus specific to this reply, laid out after the command's own.
    pub fn selection_menus(mut self, func: impl FnOnce(&mut MenusBuilder)) -> Self {
        let mut builder = MenusBuilder::new();
        func(&mut builder);
        self.menus.extend(builder.build());
        self
    }

    /// Attach the buttons from the command's definition.
    pub fn with_command_buttons(mut self) -> Self {
        self.command_buttons = true;
        self
    }

    /// Attach the selection menus from the command's definition.
    pub fn with_command_menus(mut self) -> Self {
        self.command_menus = true;
        self
    }

    pub fn with_all_command_components(self) -> Self {
        self.with_command_buttons().with_command_menus()
    }

    /// Tweak the response data directly, for anything the builder lacks
    /// (allowed mentions, tts, attachments). Ignored for deferred results and
    /// edits.
    pub fn modify<F>(mut self, func: F) -> Self
    where
        F: FnOnce(InteractionResponseDataBuilder) -> InteractionResponseDataBuilder
            + Send
            + 'static,
    {
        self.modifiers.push(Box::new(func));
        self
    }

    pub fn is_handled(&self) -> bool {
        self.kind == ResultKind::Handled
    }

    pub fn is_deferred(&self) -> bool {
        self.kind == ResultKind::Deferred
    }

    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    pub fn wants_command_buttons(&self) -> bool {
        self.command_buttons
    }

    pub fn wants_command_menus(&self) -> bool {
        self.command_menus
    }

    /// A reply with nothing to show. Deferred and handled results are never empty.
    pub fn is_empty(&self) -> bool {
        self.kind == ResultKind::Reply
            && self.content.as_deref().map_or(true, str::is_empty)
            && self.embeds.is_empty()
            && self.buttons.is_empty()
            && self.menus.is_empty()
            && !self.command_buttons
            && !self.command_menus
    }

    fn split(
        self,
        command_buttons: Vec<Component>,
        command_menus: Vec<Component>,
    ) -> (ReplyEdit, bool, Vec<Modifier>) {
        let mut buttons = Vec::new();
        if self.command_buttons {
            buttons.extend(command_buttons);
        }
        buttons.extend(self.buttons);

        let mut menus = Vec::new();
        if self.command_menus {
            menus.extend(command_menus);
        }
        menus.extend(self.menus);

        let mut components = button_rows(buttons);
        components.extend(menu_rows(menus));

        let edit = ReplyEdit {
            content: self.content.filter(|c| !c.is_empty()),
            embeds: self.embeds,
            components,
        };
        (edit, self.ephemeral, self.modifiers)
    }

    /// The initial response for this result, or `None` when the handler
    /// already answered.
    ///
    /// `command_buttons` and `command_menus` are the components built from
    /// the command's definition; they are only used when requested.
    pub fn into_response(
        self,
        command_buttons: Vec<Component>,
        command_menus: Vec<Component>,
    ) -> Result<Option<InteractionResponse>> {
        match self.kind {
            ResultKind::Handled => Ok(None),
            ResultKind::Deferred => {
                let mut data = InteractionResponseDataBuilder::new();
                if self.ephemeral {
                    data = data.flags(MessageFlags::EPHEMERAL);
                }
                Ok(Some(InteractionResponse {
                    kind: InteractionResponseType::DeferredChannelMessageWithSource,
                    data: Some(data.build()),
                }))
            }
            ResultKind::Reply => {
                let (edit, ephemeral, modifiers) = self.split(command_buttons, command_menus);
                if edit.is_empty() {
                    return Err(Error::EmptyReply);
                }

                let mut data = InteractionResponseDataBuilder::new()
                    .embeds(edit.embeds)
                    .components(edit.components);
                if let Some(content) = edit.content {
                    data = data.content(content);
                }
                if ephemeral {
                    data = data.flags(MessageFlags::EPHEMERAL);
                }
                for modify in modifiers {
                    data = modify(data);
                }

                Ok(Some(InteractionResponse {
                    kind: InteractionResponseType::ChannelMessageWithSource,
                    data: Some(data.build()),
                }))
            }
        }
    }

    /// The edit to apply to the original response, or `None` for deferred
    /// and handled results.
    pub fn into_edit(
        self,
        command_buttons: Vec<Component>,
        command_menus: Vec<Component>,
    ) -> Result<Option<ReplyEdit>> {
        if self.kind != ResultKind::Reply {
            return Ok(None);
        }
        let (edit, _, _) = self.split(command_buttons, command_menus);
        if edit.is_empty() {
            return Err(Error::EmptyReply);
        }
        Ok(Some(edit))
    }
}

impl fmt::Debug for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandResult")
            .field("kind", &self.kind)
            .field("ephemeral", &self.ephemeral)
            .field("content", &self.content)
            .field("embeds", &self.embeds.len())
            .field("buttons", &self.buttons.len())
            .field("menus", &self.menus.len())
            .field("command_buttons", &self.command_buttons)
            .field("command_menus", &self.command_menus)
            .field("modifiers", &self.modifiers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{component_id::ComponentId, components::button};
    use twilight_model::channel::message::component::ButtonStyle;

    fn some_button(n: usize) -> Component {
        button(ButtonStyle::Primary, format!("b:{n}"), Some(n.to_string()), None)
    }

    fn rows(response: &InteractionResponse) -> Vec<usize> {
        response
            .data
            .as_ref()
            .and_then(|d| d.components.as_ref())
            .map(|rows| {
                rows.iter()
                    .map(|row| match row {
                        Component::ActionRow(r) => r.components.len(),
                        _ => 0,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    // -- emptiness --

    #[test]
    fn empty_reply_is_an_error() {
        let result = CommandResult::new();
        assert!(result.is_empty());
        let err = result.into_response(Vec::new(), Vec::new()).unwrap_err();
        assert!(matches!(err, Error::EmptyReply));
    }

    #[test]
    fn requesting_missing_command_buttons_is_still_empty() {
        let result = CommandResult::new().with_command_buttons();
        assert!(!result.is_empty());
        let err = result.into_response(Vec::new(), Vec::new()).unwrap_err();
        assert!(matches!(err, Error::EmptyReply));
    }

    #[test]
    fn empty_content_does_not_count() {
        assert!(CommandResult::new().content("").is_empty());
    }

    // -- kinds --

    #[test]
    fn handled_sends_nothing() {
        let result = CommandResult::handled();
        assert!(!result.is_empty());
        assert!(result.into_response(Vec::new(), Vec::new()).unwrap().is_none());
    }

    #[test]
    fn deferred_ephemeral_sets_flag() {
        let response = CommandResult::deferred()
            .ephemeral(true)
            .into_response(Vec::new(), Vec::new())
            .unwrap()
            .unwrap();
        assert_eq!(
            response.kind,
            InteractionResponseType::DeferredChannelMessageWithSource
        );
        let flags = response.data.and_then(|d| d.flags);
        assert_eq!(flags, Some(MessageFlags::EPHEMERAL));
    }

    #[test]
    fn deferred_ignores_content_and_modifiers() {
        let response = CommandResult::deferred()
            .content("ignored")
            .modify(|d| d.tts(true))
            .into_response(Vec::new(), Vec::new())
            .unwrap()
            .unwrap();
        let data = response.data.unwrap();
        assert!(data.content.is_none());
        assert!(data.tts.is_none());
    }

    // -- replies --

    #[test]
    fn content_and_embeds_are_both_sent() {
        let response = CommandResult::new()
            .content("hello")
            .embed(|e| e.title("title"))
            .into_response(Vec::new(), Vec::new())
            .unwrap()
            .unwrap();
        assert_eq!(
            response.kind,
            InteractionResponseType::ChannelMessageWithSource
        );
        let data = response.data.unwrap();
        assert_eq!(data.content.as_deref(), Some("hello"));
        assert_eq!(data.embeds.map(|e| e.len()), Some(1));
        assert!(data.flags.is_none());
    }

    #[test]
    fn ephemeral_reply_sets_flag() {
        let response = CommandResult::new()
            .content("secret")
            .ephemeral(true)
            .into_response(Vec::new(), Vec::new())
            .unwrap()
            .unwrap();
        assert_eq!(
            response.data.and_then(|d| d.flags),
            Some(MessageFlags::EPHEMERAL)
        );
    }

    #[test]
    fn modifiers_run_last() {
        let response = CommandResult::new()
            .content("before")
            .modify(|d| d.content("after").tts(true))
            .into_response(Vec::new(), Vec::new())
            .unwrap()
            .unwrap();
        let data = response.data.unwrap();
        assert_eq!(data.content.as_deref(), Some("after"));
        assert_eq!(data.tts, Some(true));
    }

    // -- components --

    #[test]
    fn command_buttons_only_when_requested() {
        let command_buttons = vec![some_button(0)];

        let without = CommandResult::new()
            .content("x")
            .into_response(command_buttons.clone(), Vec::new())
            .unwrap()
            .unwrap();
        assert!(rows(&without).is_empty());

        let with = CommandResult::new()
            .content("x")
            .with_command_buttons()
            .into_response(command_buttons, Vec::new())
            .unwrap()
            .unwrap();
        assert_eq!(rows(&with), [1]);
    }

    #[test]
    fn buttons_fill_rows_of_five_then_menus_get_their_own() {
        let command_buttons: Vec<_> = (0..4).map(some_button).collect();
        let response = CommandResult::new()
            .with_all_command_components()
            .buttons(|b| {
                let id = ComponentId::for_command("x", ':');
                b.primary(&id.clone().action("a"), "A")
                    .primary(&id.clone().action("b"), "B")
                    .primary(&id.action("c"), "C");
            })
            .selection_menus(|m| {
                m.menu(&ComponentId::for_command("x", ':'), |s| {
                    s.option("one", "1");
                });
            })
            .into_response(command_buttons, Vec::new())
            .unwrap()
            .unwrap();
        assert_eq!(rows(&response), [5, 2, 1]);
    }

    // -- edits --

    #[test]
    fn into_edit_keeps_parts_and_skips_deferred() {
        let edit = CommandResult::new()
            .content("done")
            .ephemeral(true)
            .into_edit(Vec::new(), Vec::new())
            .unwrap()
            .unwrap();
        assert_eq!(edit.content.as_deref(), Some("done"));
        assert!(edit.components.is_empty());

        assert!(CommandResult::deferred()
            .into_edit(Vec::new(), Vec::new())
            .unwrap()
            .is_none());
        assert!(CommandResult::new()
            .into_edit(Vec::new(), Vec::new())
            .is_err());
    }
}
