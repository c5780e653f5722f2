//! Typed interaction events.
//!
//! Instead of matching on `(kind, data)` pairs everywhere, the dispatcher
//! sorts each incoming [`Interaction`] into this enum so the rest of the
//! client can pattern-match on the payload it actually handles.

use tracing::trace;
use twilight_model::application::{
    command::CommandType,
    interaction::{
        application_command::CommandData, message_component::MessageComponentInteractionData,
        Interaction, InteractionData, InteractionType,
    },
};
use twilight_model::channel::message::component::ComponentType;

// ---------------------------------------------------------------------------
// The interaction event enum
// ---------------------------------------------------------------------------

/// What an interaction means to the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEvent {
    /// A chat input (slash) command was invoked.
    SlashCommand(Box<CommandData>),

    /// A button was clicked.
    ButtonClick(Box<MessageComponentInteractionData>),

    /// Values were picked in a select menu of any kind.
    SelectionMenu(Box<MessageComponentInteractionData>),

    /// Anything else: pings, autocomplete, modals, context menu commands.
    Ignored(InteractionType),
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

impl InteractionEvent {
    /// Move the payload out of `interaction` and classify it.
    ///
    /// This never fails: an interaction whose data doesn't fit its kind is
    /// [`Ignored`](Self::Ignored) and keeps its data.
    pub fn classify(interaction: &mut Interaction) -> Self {
        let kind = interaction.kind;
        let event = match (kind, interaction.data.take()) {
            // ----- Slash commands -----
            (InteractionType::ApplicationCommand, Some(InteractionData::ApplicationCommand(data)))
                if data.kind == CommandType::ChatInput =>
            {
                return InteractionEvent::SlashCommand(data);
            }

            // ----- Buttons and menus -----
            (InteractionType::MessageComponent, Some(InteractionData::MessageComponent(data))) => {
                match data.component_type {
                    ComponentType::Button => return InteractionEvent::ButtonClick(data),
                    ComponentType::TextSelectMenu
                    | ComponentType::UserSelectMenu
                    | ComponentType::RoleSelectMenu
                    | ComponentType::MentionableSelectMenu
                    | ComponentType::ChannelSelectMenu => {
                        return InteractionEvent::SelectionMenu(data)
                    }
                    _ => Some(InteractionData::MessageComponent(data)),
                }
            }

            // ----- Anything else -----
            (_, data) => data,
        };

        interaction.data = event;
        trace!(kind = ?kind, "ignoring interaction");
        InteractionEvent::Ignored(kind)
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            InteractionEvent::SlashCommand(_) => "slash_command",
            InteractionEvent::ButtonClick(_) => "button_click",
            InteractionEvent::SelectionMenu(_) => "selection_menu",
            InteractionEvent::Ignored(_) => "ignored",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
