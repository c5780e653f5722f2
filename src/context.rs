//! Per-interaction contexts handed to command handlers.
//!
//! [`SlashCommandContext`] wraps one slash command invocation: its options,
//! the invoking user and the responders. [`ComponentContext`] is the same for
//! a click on a button or a selection menu, and is shared by
//! [`ButtonClickContext`] and [`SelectionMenuContext`].
//!
//! Every interaction must be acknowledged exactly once. The contexts track
//! that, so the second initial response fails with
//! [`Error::AlreadyAcknowledged`] instead of a 400 from Discord.

use std::{
    fmt,
    ops::Deref,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use twilight_model::{
    application::interaction::{
        application_command::{CommandData, CommandDataOption, CommandOptionValue},
        message_component::MessageComponentInteractionData,
        Interaction, InteractionMember,
    },
    channel::{
        message::{component::ComponentType, Component, Embed},
        Message,
    },
    guild::{PartialMember, Permissions, Role},
    http::interaction::{InteractionResponse, InteractionResponseType},
    id::{
        marker::{
            AttachmentMarker, ChannelMarker, CommandMarker, GenericMarker, GuildMarker,
            RoleMarker, UserMarker,
        },
        Id,
    },
    user::User,
};
use twilight_util::builder::InteractionResponseDataBuilder;

use crate::{
    client::SlashCommandClient,
    command::SlashCommand,
    component_id::ComponentId,
    config::Settings,
    embed::{embed, EmbedBuilder},
    error::{Error, Result},
    ext::InteractionExt,
    http::DiscordHttp,
    reply::{CommandResult, ReplyEdit},
};

// ===========================================================================
// Option values
// ===========================================================================

/// Types an option value can be read as.
pub trait FromOptionValue: Sized {
    /// Shown in [`Error::OptionType`].
    const TYPE_NAME: &'static str;

    fn from_option_value(value: &CommandOptionValue) -> Option<Self>;
}

macro_rules! from_option_value {
    ($ty:ty, $name:literal, $variant:ident => $conv:expr) => {
        impl FromOptionValue for $ty {
            const TYPE_NAME: &'static str = $name;

            fn from_option_value(value: &CommandOptionValue) -> Option<Self> {
                match value {
                    CommandOptionValue::$variant(v) => Some($conv(v)),
                    _ => None,
                }
            }
        }
    };
}

from_option_value!(String, "string", String => |v: &String| v.clone());
from_option_value!(i64, "integer", Integer => |v: &i64| *v);
from_option_value!(bool, "boolean", Boolean => |v: &bool| *v);
from_option_value!(Id<UserMarker>, "user", User => |v: &Id<UserMarker>| *v);
from_option_value!(Id<ChannelMarker>, "channel", Channel => |v: &Id<ChannelMarker>| *v);
from_option_value!(Id<RoleMarker>, "role", Role => |v: &Id<RoleMarker>| *v);
from_option_value!(Id<AttachmentMarker>, "attachment", Attachment => |v: &Id<AttachmentMarker>| *v);
from_option_value!(Id<GenericMarker>, "mentionable", Mentionable => |v: &Id<GenericMarker>| *v);

impl FromOptionValue for f64 {
    const TYPE_NAME: &'static str = "number";

    fn from_option_value(value: &CommandOptionValue) -> Option<Self> {
        match value {
            CommandOptionValue::Number(v) => Some(*v),
            CommandOptionValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }
}

/// The options of the innermost subcommand, or the top level if there is none.
fn leaf_options(options: &[CommandDataOption]) -> &[CommandDataOption] {
    match options.first().map(|o| &o.value) {
        Some(CommandOptionValue::SubCommand(inner))
        | Some(CommandOptionValue::SubCommandGroup(inner)) => leaf_options(inner),
        _ => options,
    }
}

// ===========================================================================
// Shared invoker accessors
// ===========================================================================

macro_rules! invoker_accessors {
    () => {
        /// The raw interaction.
        pub fn interaction(&self) -> &Interaction {
            &self.interaction
        }

        pub fn client(&self) -> &SlashCommandClient {
            &self.client
        }

        pub fn settings(&self) -> &Settings {
            self.client.settings()
        }

        pub fn http(&self) -> &DiscordHttp {
            self.client.http()
        }

        /// The command this interaction was routed to.
        pub fn command(&self) -> &Arc<dyn SlashCommand> {
            &self.command
        }

        /// The user who triggered the interaction, in guilds and DMs alike.
        pub fn user(&self) -> Option<&User> {
            self.interaction.invoker()
        }

        pub fn user_id(&self) -> Option<Id<UserMarker>> {
            self.interaction.invoker_id()
        }

        /// The invoking member; `None` in DMs.
        pub fn member(&self) -> Option<&PartialMember> {
            self.interaction.member.as_ref()
        }

        /// The invoking member's permissions in the channel; `None` in DMs.
        pub fn member_permissions(&self) -> Option<Permissions> {
            self.member().and_then(|m| m.permissions)
        }

        pub fn guild_id(&self) -> Option<Id<GuildMarker>> {
            self.interaction.guild_id
        }

        pub fn channel_id(&self) -> Option<Id<ChannelMarker>> {
            self.interaction.channel.as_ref().map(|c| c.id)
        }

        pub fn is_dm(&self) -> bool {
            self.interaction.guild_id.is_none()
        }

        /// The interaction token, valid for 15 minutes.
        pub fn token(&self) -> &str {
            &self.interaction.token
        }

        /// Whether the initial response has been sent.
        pub fn acked(&self) -> bool {
            self.acked.load(Ordering::Acquire)
        }

        /// Send the initial response. Fails if one was already sent.
        async fn send_initial(&self, response: &InteractionResponse) -> Result<()> {
            if self.acked.swap(true, Ordering::AcqRel) {
                return Err(Error::AlreadyAcknowledged);
            }
            let sent = self
                .http()
                .create_interaction_response(&self.interaction, response)
                .await;
            if sent.is_err() {
                self.acked.store(false, Ordering::Release);
            }
            sent
        }
    };
}

fn message_response(
    kind: InteractionResponseType,
    data: InteractionResponseDataBuilder,
) -> InteractionResponse {
    InteractionResponse {
        kind,
        data: Some(data.build()),
    }
}

// ===========================================================================
// SlashCommandContext
// ===========================================================================

/// One slash command invocation.
pub struct SlashCommandContext {
    client: SlashCommandClient,
    interaction: Interaction,
    data: CommandData,
    command: Arc<dyn SlashCommand>,
    owners: Vec<Id<UserMarker>>,
    acked: AtomicBool,
}

impl SlashCommandContext {
    pub fn new(
        client: SlashCommandClient,
        interaction: Interaction,
        data: CommandData,
        command: Arc<dyn SlashCommand>,
        owners: Vec<Id<UserMarker>>,
    ) -> Self {
        Self {
            client,
            interaction,
            data,
            command,
            owners,
            acked: AtomicBool::new(false),
        }
    }

    invoker_accessors!();

    /// The command name as invoked.
    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn command_id(&self) -> Id<CommandMarker> {
        self.data.id
    }

    pub fn data(&self) -> &CommandData {
        &self.data
    }

    /// `/command group sub`: the `group` part.
    pub fn subcommand_group(&self) -> Option<&str> {
        match self.data.options.first() {
            Some(o) if matches!(o.value, CommandOptionValue::SubCommandGroup(_)) => {
                Some(&o.name)
            }
            _ => None,
        }
    }

    /// `/command sub` or `/command group sub`: the `sub` part.
    pub fn subcommand_name(&self) -> Option<&str> {
        let first = self.data.options.first()?;
        match &first.value {
            CommandOptionValue::SubCommand(_) => Some(&first.name),
            CommandOptionValue::SubCommandGroup(inner) => inner
                .first()
                .filter(|o| matches!(o.value, CommandOptionValue::SubCommand(_)))
                .map(|o| o.name.as_str()),
            _ => None,
        }
    }

    /// Options of the invoked (sub)command.
    pub fn options(&self) -> &[CommandDataOption] {
        leaf_options(&self.data.options)
    }

    pub fn option(&self, name: &str) -> Option<&CommandOptionValue> {
        self.options()
            .iter()
            .find(|o| o.name == name)
            .map(|o| &o.value)
    }

    /// Read a required option.
    pub fn option_value<T: FromOptionValue>(&self, name: &str) -> Result<T> {
        let value = self
            .option(name)
            .ok_or_else(|| Error::MissingOption(name.to_string()))?;
        T::from_option_value(value).ok_or_else(|| Error::OptionType {
            name: name.to_string(),
            expected: T::TYPE_NAME,
        })
    }

    /// Read an optional option, falling back to `default` when it was not
    /// given. A value of the wrong type is still an [`Error::OptionType`].
    pub fn option_or<T: FromOptionValue>(&self, name: &str, default: T) -> Result<T> {
        match self.option_value(name) {
            Err(Error::MissingOption(_)) => Ok(default),
            other => other,
        }
    }

    pub fn option_user(&self, name: &str) -> Option<&User> {
        let id: Id<UserMarker> = self.option_value(name).ok()?;
        self.data.resolved.as_ref()?.users.get(&id)
    }

    pub fn option_member(&self, name: &str) -> Option<&InteractionMember> {
        let id: Id<UserMarker> = self.option_value(name).ok()?;
        self.data.resolved.as_ref()?.members.get(&id)
    }

    pub fn option_role(&self, name: &str) -> Option<&Role> {
        let id: Id<RoleMarker> = self.option_value(name).ok()?;
        self.data.resolved.as_ref()?.roles.get(&id)
    }

    /// Users allowed through the application-owner check.
    pub fn application_owners(&self) -> &[Id<UserMarker>] {
        &self.owners
    }

    /// Start building the handler's return value.
    pub fn result(&self) -> CommandResult {
        CommandResult::new()
    }

    /// A component id routed back to this command.
    pub fn component_id(&self) -> ComponentId {
        self.command
            .definition()
            .component_id(self.settings().component_id_separator)
    }

    /// [`component_id`](Self::component_id) with the invoking user filled in,
    /// for buttons only the invoker should be able to use.
    pub fn owned_component_id(&self) -> ComponentId {
        let id = self.component_id();
        match self.user_id() {
            Some(user) => id.user(user),
            None => id.user(""),
        }
    }

    // ------------------------------------------------------------------
    // Responders
    // ------------------------------------------------------------------

    /// Acknowledge now and answer later with [`edit_reply`](Self::edit_reply).
    pub async fn defer(&self, ephemeral: bool) -> Result<()> {
        self.respond(CommandResult::deferred().ephemeral(ephemeral))
            .await
    }

    pub async fn reply(&self, content: impl Into<String>) -> Result<()> {
        self.respond(self.result().content(content)).await
    }

    pub async fn reply_embed(&self, func: impl FnOnce(EmbedBuilder) -> EmbedBuilder) -> Result<()> {
        self.respond(self.result().embed(func)).await
    }

    /// Send `result` as the initial response.
    pub async fn respond(&self, result: CommandResult) -> Result<()> {
        let (buttons, menus) = self.command_components(&result);
        match result.into_response(buttons, menus)? {
            Some(response) => self.send_initial(&response).await,
            None => Ok(()),
        }
    }

    /// Replace the original response, typically after [`defer`](Self::defer).
    pub async fn edit_reply(&self, result: CommandResult) -> Result<()> {
        let (buttons, menus) = self.command_components(&result);
        match result.into_edit(buttons, menus)? {
            Some(edit) => {
                self.http()
                    .edit_original_interaction_response(&self.interaction, &edit)
                    .await
            }
            None => Ok(()),
        }
    }

    /// The edit a handler's result makes once the interaction was already
    /// acknowledged. `None` when there is nothing to change, including a
    /// result that only asked for command components the command lacks.
    pub fn follow_up_edit(&self, result: CommandResult) -> Result<Option<ReplyEdit>> {
        let (buttons, menus) = self.command_components(&result);
        match result.into_edit(buttons, menus) {
            Err(Error::EmptyReply) => Ok(None),
            other => other,
        }
    }

    pub async fn delete_reply(&self) -> Result<()> {
        self.http()
            .delete_original_interaction_response(&self.interaction)
            .await
    }

    fn command_components(&self, result: &CommandResult) -> (Vec<Component>, Vec<Component>) {
        let definition = self.command.definition();
        let buttons = if result.wants_command_buttons() {
            definition.build_buttons(self)
        } else {
            Vec::new()
        };
        let menus = if result.wants_command_menus() {
            definition.build_menus(self)
        } else {
            Vec::new()
        };
        (buttons, menus)
    }
}

impl fmt::Debug for SlashCommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlashCommandContext")
            .field("command", &self.data.name)
            .field("interaction_id", &self.interaction.id)
            .field("user_id", &self.user_id())
            .field("guild_id", &self.interaction.guild_id)
            .field("acked", &self.acked())
            .finish()
    }
}

// ===========================================================================
// ComponentContext
// ===========================================================================

/// A click on a component attached to one of our messages.
pub struct ComponentContext {
    client: SlashCommandClient,
    interaction: Interaction,
    data: MessageComponentInteractionData,
    command: Arc<dyn SlashCommand>,
    acked: AtomicBool,
}

impl ComponentContext {
    pub fn new(
        client: SlashCommandClient,
        interaction: Interaction,
        data: MessageComponentInteractionData,
        command: Arc<dyn SlashCommand>,
    ) -> Self {
        Self {
            client,
            interaction,
            data,
            command,
            acked: AtomicBool::new(false),
        }
    }

    invoker_accessors!();

    /// The raw custom id of the clicked component.
    pub fn component_id(&self) -> &str {
        &self.data.custom_id
    }

    /// The custom id split into its `command:user:action:value` segments.
    pub fn parsed_id(&self) -> ComponentId {
        ComponentId::parse(
            self.data.custom_id.as_str(),
            self.settings().component_id_separator,
        )
    }

    pub fn component_type(&self) -> ComponentType {
        self.data.component_type
    }

    pub fn data(&self) -> &MessageComponentInteractionData {
        &self.data
    }

    /// The message the component is attached to.
    pub fn message(&self) -> Option<&Message> {
        self.interaction.message.as_ref()
    }

    // ------------------------------------------------------------------
    // Responders
    // ------------------------------------------------------------------

    /// Acknowledge without changing the message.
    pub async fn ack(&self) -> Result<()> {
        self.send_initial(&InteractionResponse {
            kind: InteractionResponseType::DeferredUpdateMessage,
            data: None,
        })
        .await
    }

    /// Answer with a new message.
    pub async fn reply(&self, content: impl Into<String>) -> Result<()> {
        self.respond(CommandResult::new().content(content)).await
    }

    pub async fn reply_embed(&self, func: impl FnOnce(EmbedBuilder) -> EmbedBuilder) -> Result<()> {
        self.respond(CommandResult::new().embed(func)).await
    }

    /// Answer with a new message. The command's own components are not
    /// available here, only those added to `result` directly.
    pub async fn respond(&self, result: CommandResult) -> Result<()> {
        match result.into_response(Vec::new(), Vec::new())? {
            Some(response) => self.send_initial(&response).await,
            None => Ok(()),
        }
    }

    /// Change the message the component is attached to. Works before or
    /// after [`ack`](Self::ack).
    async fn update_message(&self, edit: ReplyEdit) -> Result<()> {
        if self.acked() {
            return self
                .http()
                .edit_original_interaction_response(&self.interaction, &edit)
                .await;
        }
        let mut data = InteractionResponseDataBuilder::new()
            .embeds(edit.embeds)
            .components(edit.components);
        if let Some(content) = edit.content {
            data = data.content(content);
        }
        self.send_initial(&message_response(
            InteractionResponseType::UpdateMessage,
            data,
        ))
        .await
    }

    fn current_edit(&self) -> ReplyEdit {
        let message = self.message();
        ReplyEdit {
            content: message.map(|m| m.content.clone()).filter(|c| !c.is_empty()),
            embeds: message.map(|m| m.embeds.clone()).unwrap_or_default(),
            components: message.map(|m| m.components.clone()).unwrap_or_default(),
        }
    }

    /// Replace the text of the message, keeping its embeds and components.
    pub async fn edit_message(&self, content: impl Into<String>) -> Result<()> {
        let edit = ReplyEdit {
            content: Some(content.into()),
            ..self.current_edit()
        };
        self.update_message(edit).await
    }

    /// Replace the embeds of the message.
    pub async fn edit_message_embeds(&self, embeds: Vec<Embed>) -> Result<()> {
        let edit = ReplyEdit {
            embeds,
            ..self.current_edit()
        };
        self.update_message(edit).await
    }

    /// Replace the single embed of the message.
    pub async fn edit_message_embed(
        &self,
        func: impl FnOnce(EmbedBuilder) -> EmbedBuilder,
    ) -> Result<()> {
        self.edit_message_embeds(vec![embed(func)]).await
    }

    /// Replace the component rows of the message; pass an empty vec to
    /// remove them.
    pub async fn edit_components(&self, components: Vec<Component>) -> Result<()> {
        let edit = ReplyEdit {
            components,
            ..self.current_edit()
        };
        self.update_message(edit).await
    }

    /// Delete the message the component is attached to.
    pub async fn delete_message(&self) -> Result<()> {
        match self.message() {
            Some(message) => {
                self.http()
                    .delete_message(message.channel_id, message.id)
                    .await
            }
            None => {
                self.http()
                    .delete_original_interaction_response(&self.interaction)
                    .await
            }
        }
    }
}

impl fmt::Debug for ComponentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentContext")
            .field("custom_id", &self.data.custom_id)
            .field("component_type", &self.data.component_type)
            .field("interaction_id", &self.interaction.id)
            .field("user_id", &self.user_id())
            .field("acked", &self.acked())
            .finish()
    }
}

// ===========================================================================
// Button / menu contexts
// ===========================================================================

/// A button was clicked.
#[derive(Debug)]
pub struct ButtonClickContext(ComponentContext);

impl ButtonClickContext {
    pub fn new(inner: ComponentContext) -> Self {
        Self(inner)
    }
}

impl Deref for ButtonClickContext {
    type Target = ComponentContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Values were picked in a selection menu.
#[derive(Debug)]
pub struct SelectionMenuContext(ComponentContext);

impl SelectionMenuContext {
    pub fn new(inner: ComponentContext) -> Self {
        Self(inner)
    }

    /// The values of the options the user selected.
    pub fn selected_values(&self) -> &[String] {
        &self.0.data.values
    }
}

impl Deref for SelectionMenuContext {
    type Target = ComponentContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// ===========================================================================
// Test fixtures
// ===========================================================================
