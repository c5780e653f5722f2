//! The dispatcher: registers commands on READY and routes interactions.
//!
//! [`SlashCommandClient`] owns the [`ClientConfig`] and the REST handle. Feed
//! it every gateway event with [`handle_event`](SlashCommandClient::handle_event);
//! it ignores everything but READY and INTERACTION_CREATE.

use std::{
    collections::BTreeMap,
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, OnceLock,
    },
};

use async_lock::RwLock;
use tracing::{debug, error, info, warn};
use twilight_model::{
    application::{
        command::Command,
        interaction::{
            application_command::CommandData,
            message_component::MessageComponentInteractionData, Interaction,
        },
    },
    gateway::event::Event,
    id::{
        marker::{ApplicationMarker, GuildMarker, UserMarker},
        Id,
    },
};

use crate::{
    command::SlashCommand,
    component_id::ComponentId,
    config::{ClientConfig, Settings},
    context::{ButtonClickContext, ComponentContext, SelectionMenuContext, SlashCommandContext},
    error::{Error, Result},
    events::InteractionEvent,
    http::DiscordHttp,
    reply::CommandResult,
};

static INSTANCE: OnceLock<SlashCommandClient> = OnceLock::new();

/// Routes interactions to [`SlashCommand`]s.
///
/// Cheap to clone (internals are behind `Arc`).
#[derive(Clone)]
pub struct SlashCommandClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    http: DiscordHttp,
    initialized: AtomicBool,
    readying: AtomicBool,
    owners: RwLock<Vec<Id<UserMarker>>>,
}

impl SlashCommandClient {
    pub fn new(config: ClientConfig, http: Arc<twilight_http::Client>) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                config,
                http: DiscordHttp::new(http),
                initialized: AtomicBool::new(false),
                readying: AtomicBool::new(false),
                owners: RwLock::new(Vec::new()),
            }),
        }
    }

    /// The process-wide client, created on first call. Later calls return
    /// the first client and drop their arguments.
    pub fn get_or_init(config: ClientConfig, http: Arc<twilight_http::Client>) -> &'static Self {
        INSTANCE.get_or_init(|| Self::new(config, http))
    }

    /// The process-wide client, if [`get_or_init`](Self::get_or_init) ran.
    pub fn global() -> Option<&'static Self> {
        INSTANCE.get()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn settings(&self) -> &Settings {
        self.inner.config.settings()
    }

    pub fn http(&self) -> &DiscordHttp {
        &self.inner.http
    }

    /// Whether READY has been handled.
    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.load(Ordering::Acquire)
    }

    /// Owners fetched on READY; empty before that.
    pub async fn application_owners(&self) -> Vec<Id<UserMarker>> {
        self.inner.owners.read().await.clone()
    }

    // ------------------------------------------------------------------
    // Gateway events
    // ------------------------------------------------------------------

    pub async fn handle_event(&self, event: &Event) -> Result<()> {
        match event {
            Event::Ready(ready) => {
                info!(user = %ready.user.name, guilds = ready.guilds.len(), "bot is ready!");
                self.on_ready(ready.application.id).await
            }
            Event::InteractionCreate(create) => {
                let interaction: &Interaction = create;
                self.on_interaction(interaction.clone()).await
            }
            _ => Ok(()),
        }
    }

    /// Register commands and fetch the owners, then mark the client
    /// initialized. Runs once per client; a READY that fails partway leaves
    /// the client uninitialized so the next READY tries again.
    pub async fn on_ready(&self, application_id: Id<ApplicationMarker>) -> Result<()> {
        if self.is_initialized() {
            warn!("received READY again, keeping the existing setup");
            return Err(Error::AlreadyInitialized);
        }
        if self.inner.readying.swap(true, Ordering::AcqRel) {
            warn!("READY already being handled");
            return Err(Error::AlreadyInitialized);
        }

        let outcome = self.initialize(application_id).await;
        if let Err(e) = &outcome {
            error!(error = %e, "READY handling failed, will retry on the next READY");
        }
        self.inner.readying.store(false, Ordering::Release);
        outcome
    }

    async fn initialize(&self, application_id: Id<ApplicationMarker>) -> Result<()> {
        if self.settings().register_commands {
            self.register_commands(application_id).await?;
        }

        match self.http().application_owners().await {
            Ok(owners) => {
                debug!(count = owners.len(), "fetched application owners");
                *self.inner.owners.write().await = owners;
            }
            Err(e) => warn!(error = %e, "failed to fetch application owners"),
        }

        self.inner.initialized.store(true, Ordering::Release);
        info!("slash command client initialized");
        Ok(())
    }

    /// Overwrite the global commands, then the commands of every guild that
    /// has some.
    pub async fn register_commands(&self, application_id: Id<ApplicationMarker>) -> Result<()> {
        let global: Vec<Command> = self
            .config()
            .global_commands()
            .map(|c| c.definition().to_command())
            .collect();
        let mut names: Vec<String> = self
            .http()
            .bulk_overwrite_global_commands(application_id, &global)
            .await?
            .into_iter()
            .map(|c| c.name)
            .collect();

        for (guild_id, commands) in guild_command_sets(self.config()) {
            let registered = self
                .http()
                .bulk_overwrite_guild_commands(application_id, guild_id, &commands)
                .await?;
            names.extend(registered.into_iter().map(|c| c.name));
        }

        info!(count = names.len(), ?names, "registered slash commands");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Routing
    // ------------------------------------------------------------------

    pub async fn on_interaction(&self, mut interaction: Interaction) -> Result<()> {
        match InteractionEvent::classify(&mut interaction) {
            InteractionEvent::SlashCommand(data) => self.on_slash_command(interaction, *data).await,
            InteractionEvent::ButtonClick(data) => self.on_button_click(interaction, *data).await,
            InteractionEvent::SelectionMenu(data) => {
                self.on_selection_menu(interaction, *data).await
            }
            InteractionEvent::Ignored(_) => Ok(()),
        }
    }

    /// The command named `name`, if it may run in `guild_id`.
    pub fn resolve_command(
        &self,
        name: &str,
        guild_id: Option<Id<GuildMarker>>,
    ) -> Option<Arc<dyn SlashCommand>> {
        let command = self.config().command_by(name)?;
        if command.definition().usable_in(guild_id) {
            Some(Arc::clone(command))
        } else {
            debug!(command = name, ?guild_id, "command not available in this guild");
            None
        }
    }

    /// The command a component belongs to: the name segment of its id, or
    /// the whole id when it has none.
    pub fn resolve_component_command(
        &self,
        custom_id: &str,
        guild_id: Option<Id<GuildMarker>>,
    ) -> Option<Arc<dyn SlashCommand>> {
        let parsed = ComponentId::parse(custom_id, self.settings().component_id_separator);
        let name = parsed.command_name().unwrap_or(custom_id);
        self.resolve_command(name, guild_id)
    }

    /// The reply sent instead of running a command whose checks failed.
    pub fn checks_failed_result(&self, reasons: &[String]) -> CommandResult {
        let settings = self.settings();
        let description = reasons
            .iter()
            .map(|reason| settings.format_failed_check(reason))
            .collect::<Vec<_>>()
            .join("\n");
        CommandResult::new().embed(|e| {
            e.title(settings.checks_failed_title.as_str())
                .color(settings.checks_failed_color)
                .description(description)
        })
    }

    async fn on_slash_command(&self, interaction: Interaction, data: CommandData) -> Result<()> {
        let Some(command) = self.resolve_command(&data.name, interaction.guild_id) else {
            debug!(command = %data.name, "no handler for slash command");
            return Ok(());
        };

        let owners = self.application_owners().await;
        let ctx = SlashCommandContext::new(
            self.clone(),
            interaction,
            data,
            Arc::clone(&command),
            owners,
        );

        let failures = command.definition().run_checks(&ctx);
        if !failures.is_empty() {
            info!(
                command = ctx.name(),
                user_id = ?ctx.user_id(),
                failures = failures.len(),
                "command checks failed"
            );
            return ctx.respond(self.checks_failed_result(&failures)).await;
        }

        debug!(command = ctx.name(), user_id = ?ctx.user_id(), "running slash command");
        let result = command
            .handle_slash_command(&ctx)
            .await
            .map_err(|e| handler_error(ctx.name(), e))?;

        if !ctx.acked() {
            return ctx.respond(result).await;
        }
        match ctx.follow_up_edit(result)? {
            Some(edit) => {
                self.http()
                    .edit_original_interaction_response(ctx.interaction(), &edit)
                    .await
            }
            None => {
                debug!(command = ctx.name(), "nothing to edit after acknowledgement");
                Ok(())
            }
        }
    }

    fn component_context(
        &self,
        interaction: Interaction,
        data: MessageComponentInteractionData,
    ) -> Option<(Arc<dyn SlashCommand>, ComponentContext)> {
        let Some(command) = self.resolve_component_command(&data.custom_id, interaction.guild_id)
        else {
            debug!(custom_id = %data.custom_id, "no handler for component");
            return None;
        };
        let ctx = ComponentContext::new(self.clone(), interaction, data, Arc::clone(&command));
        Some((command, ctx))
    }

    async fn on_button_click(
        &self,
        interaction: Interaction,
        data: MessageComponentInteractionData,
    ) -> Result<()> {
        let Some((command, ctx)) = self.component_context(interaction, data) else {
            return Ok(());
        };
        let ctx = ButtonClickContext::new(ctx);
        debug!(custom_id = ctx.component_id(), "handling button click");
        command
            .handle_button_click(&ctx)
            .await
            .map_err(|e| handler_error(command.definition().name(), e))
    }

    async fn on_selection_menu(
        &self,
        interaction: Interaction,
        data: MessageComponentInteractionData,
    ) -> Result<()> {
        let Some((command, ctx)) = self.component_context(interaction, data) else {
            return Ok(());
        };
        let ctx = SelectionMenuContext::new(ctx);
        debug!(
            custom_id = ctx.component_id(),
            values = ?ctx.selected_values(),
            "handling selection menu"
        );
        command
            .handle_selection_menu(&ctx)
            .await
            .map_err(|e| handler_error(command.definition().name(), e))
    }
}

fn handler_error(command: &str, e: anyhow::Error) -> Error {
    error!(command, error = %format!("{e:#}"), "command handler failed");
    Error::Handler(e)
}

/// Guild-bound commands grouped by guild, ready for bulk overwrite.
pub fn guild_command_sets(config: &ClientConfig) -> BTreeMap<Id<GuildMarker>, Vec<Command>> {
    let mut sets: BTreeMap<Id<GuildMarker>, Vec<Command>> = BTreeMap::new();
    for command in config.guild_commands() {
        let definition = command.definition();
        if let Some(guild_id) = definition.guild_id() {
            sets.entry(guild_id)
                .or_default()
                .push(definition.to_command());
        }
    }
    sets
}

impl fmt::Debug for SlashCommandClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlashCommandClient")
            .field("config", &self.inner.config)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        command::{test_support::StaticCommand, CommandDefinition},
        context::test_support::{
            command_interaction, component_interaction, test_client, Invoker, APPLICATION_ID,
            GUILD_ID,
        },
    };
    use async_trait::async_trait;
    use serde_json::json;
    use twilight_model::{
        channel::message::Embed,
        gateway::payload::incoming::{InteractionCreate, Ready},
        guild::Permissions,
    };

    static_assertions::assert_impl_all!(SlashCommandClient: Send, Sync, Clone);

    /// A command whose handlers always fail.
    struct Failing(CommandDefinition);

    #[async_trait]
    impl SlashCommand for Failing {
        fn definition(&self) -> &CommandDefinition {
            &self.0
        }

        async fn handle_slash_command(
            &self,
            _ctx: &SlashCommandContext,
        ) -> anyhow::Result<CommandResult> {
            anyhow::bail!("boom")
        }

        async fn handle_button_click(&self, _ctx: &ButtonClickContext) -> anyhow::Result<()> {
            anyhow::bail!("button boom")
        }

        async fn handle_selection_menu(
            &self,
            _ctx: &SelectionMenuContext,
        ) -> anyhow::Result<()> {
            anyhow::bail!("menu boom")
        }
    }

    /// A command that forgets to put anything in its reply.
    struct Silent(CommandDefinition);

    #[async_trait]
    impl SlashCommand for Silent {
        fn definition(&self) -> &CommandDefinition {
            &self.0
        }

        async fn handle_slash_command(
            &self,
            ctx: &SlashCommandContext,
        ) -> anyhow::Result<CommandResult> {
            Ok(ctx.result())
        }
    }

    fn client() -> SlashCommandClient {
        test_client(ClientConfig::of(|c| {
            c.command(StaticCommand::global("say", "Say"))
                .command(StaticCommand::guild("local", "Local", Id::new(GUILD_ID)))
                .command(StaticCommand::guild("elsewhere", "Other", Id::new(1)))
                .command(Failing(CommandDefinition::new("fail", "Fails")))
                .command(Failing(CommandDefinition::guild("fail-elsewhere", "Fails", Id::new(1))))
                .command(Silent(CommandDefinition::new("silent", "Nothing")));
        }))
    }

    fn member() -> Invoker {
        Invoker::member(7, Permissions::empty())
    }

    fn first_embed(result: CommandResult) -> Embed {
        result
            .into_response(Vec::new(), Vec::new())
            .unwrap()
            .and_then(|r| r.data)
            .and_then(|d| d.embeds)
            .and_then(|e| e.into_iter().next())
            .unwrap()
    }

    // -- resolution ----------------------------------------------------------

    #[test]
    fn resolves_commands_case_insensitively() {
        let client = client();
        assert!(client.resolve_command("SAY", None).is_some());
        assert!(client.resolve_command("missing", None).is_none());
    }

    #[test]
    fn guild_commands_only_resolve_in_their_guild() {
        let client = client();
        assert!(client.resolve_command("local", Some(Id::new(GUILD_ID))).is_some());
        assert!(client.resolve_command("local", Some(Id::new(2))).is_none());
        assert!(client.resolve_command("local", None).is_none());
        assert!(client.resolve_command("say", Some(Id::new(2))).is_some());
    }

    #[test]
    fn component_routing_uses_the_name_segment() {
        let client = client();
        let found = client.resolve_component_command("say:7:delete", None).unwrap();
        assert_eq!(found.definition().name(), "say");
        let whole = client.resolve_component_command("say", None).unwrap();
        assert_eq!(whole.definition().name(), "say");
        assert!(client.resolve_component_command(":7:delete", None).is_none());
        assert!(client
            .resolve_component_command("elsewhere:1", Some(Id::new(GUILD_ID)))
            .is_none());
    }

    // -- check failures ------------------------------------------------------

    #[test]
    fn checks_failed_embed_lists_every_reason() {
        let embed = first_embed(
            client().checks_failed_result(&["not an admin".to_string(), "bot".to_string()]),
        );
        assert_eq!(embed.title.as_deref(), Some("One or more checks failed"));
        assert_eq!(embed.color, Some(0xFF0000));
        assert_eq!(
            embed.description.as_deref(),
            Some(" - not an admin\n - bot")
        );
    }

    #[test]
    fn checks_failed_embed_follows_settings() {
        let mut config = ClientConfig::new();
        config.settings_mut().checks_failed_title = "Denied".to_string();
        config.settings_mut().checks_failed_line_format = "* {}".to_string();
        let embed = first_embed(test_client(config).checks_failed_result(&["x".to_string()]));
        assert_eq!(embed.title.as_deref(), Some("Denied"));
        assert_eq!(embed.description.as_deref(), Some("* x"));
    }

    // -- registration --------------------------------------------------------

    #[test]
    fn guild_commands_are_grouped_per_guild() {
        let sets = guild_command_sets(client().config());
        assert_eq!(sets.len(), 2);
        let local: Vec<_> = sets[&Id::new(GUILD_ID)].iter().map(|c| c.name.as_str()).collect();
        assert_eq!(local, ["local"]);
        let other: Vec<_> = sets[&Id::new(1)].iter().map(|c| c.name.as_str()).collect();
        assert_eq!(other, ["elsewhere", "fail-elsewhere"]);
    }

    #[tokio::test]
    async fn second_ready_is_rejected() {
        let client = client();
        client.inner.initialized.store(true, Ordering::Release);
        assert!(client.is_initialized());
        assert!(matches!(
            client.on_ready(Id::new(1)).await,
            Err(Error::AlreadyInitialized)
        ));
    }

    #[tokio::test]
    async fn failed_ready_is_retried() {
        let client = client();
        let first = client.on_ready(Id::new(APPLICATION_ID)).await;
        assert!(matches!(first, Err(Error::Http(_))));
        assert!(!client.is_initialized());

        let second = client.on_ready(Id::new(APPLICATION_ID)).await;
        assert!(matches!(second, Err(Error::Http(_))));
        assert!(!client.is_initialized());
    }

    #[tokio::test]
    async fn concurrent_ready_is_rejected() {
        let client = client();
        client.inner.readying.store(true, Ordering::Release);
        assert!(matches!(
            client.on_ready(Id::new(APPLICATION_ID)).await,
            Err(Error::AlreadyInitialized)
        ));
        assert!(!client.is_initialized());
    }

    fn unregistered_client() -> SlashCommandClient {
        let mut config = ClientConfig::of(|c| {
            c.command(StaticCommand::global("say", "Say"));
        });
        config.settings_mut().register_commands = false;
        test_client(config)
    }

    #[tokio::test]
    async fn ready_survives_a_failed_owner_fetch() {
        let client = unregistered_client();
        client.on_ready(Id::new(APPLICATION_ID)).await.unwrap();
        assert!(client.is_initialized());
        assert!(client.application_owners().await.is_empty());
        assert!(matches!(
            client.on_ready(Id::new(APPLICATION_ID)).await,
            Err(Error::AlreadyInitialized)
        ));
    }

    #[tokio::test]
    async fn ready_event_initializes_the_client() {
        let ready: Ready = serde_json::from_value(json!({
            "application": { "id": APPLICATION_ID.to_string(), "flags": 0 },
            "guilds": [],
            "resume_gateway_url": "wss://gateway.discord.gg",
            "session_id": "session",
            "user": {
                "id": "2000",
                "username": "slashcord",
                "discriminator": "0001",
                "avatar": null,
                "bot": true,
                "mfa_enabled": false,
            },
            "v": 10,
        }))
        .unwrap();

        let client = unregistered_client();
        client.handle_event(&Event::Ready(Box::new(ready))).await.unwrap();
        assert!(client.is_initialized());
    }

    #[tokio::test]
    async fn owners_are_empty_before_ready() {
        assert!(client().application_owners().await.is_empty());
    }

    // -- dispatch ------------------------------------------------------------

    #[tokio::test]
    async fn unknown_commands_are_dropped() {
        let interaction = command_interaction("missing", member(), json!([]));
        client().on_interaction(interaction).await.unwrap();
    }

    #[tokio::test]
    async fn guild_filter_runs_before_the_handler() {
        let interaction = command_interaction("fail-elsewhere", member(), json!([]));
        client().on_interaction(interaction).await.unwrap();
    }

    #[tokio::test]
    async fn handler_errors_are_returned() {
        let interaction = command_interaction("fail", member(), json!([]));
        let err = client().on_interaction(interaction).await.unwrap_err();
        assert!(matches!(err, Error::Handler(_)));
        assert_eq!(err.to_string(), "command handler failed: boom");
    }

    #[tokio::test]
    async fn empty_results_are_a_misuse() {
        let interaction = command_interaction("silent", member(), json!([]));
        let err = client().on_interaction(interaction).await.unwrap_err();
        assert!(matches!(err, Error::EmptyReply));
    }

    #[tokio::test]
    async fn components_route_to_their_command() {
        let client = client();

        let button = component_interaction("fail:7:delete", 2, &[], member());
        let err = client.on_interaction(button).await.unwrap_err();
        assert_eq!(err.to_string(), "command handler failed: button boom");

        let menu = component_interaction("fail:::pick", 3, &["a"], member());
        let err = client.on_interaction(menu).await.unwrap_err();
        assert_eq!(err.to_string(), "command handler failed: menu boom");

        let orphan = component_interaction("nobody:7", 2, &[], member());
        client.on_interaction(orphan).await.unwrap();
    }

    #[tokio::test]
    async fn gateway_events_reach_the_router() {
        let interaction = command_interaction("fail", member(), json!([]));
        let event = Event::InteractionCreate(Box::new(InteractionCreate(interaction)));
        assert!(client().handle_event(&event).await.is_err());
        assert!(client().handle_event(&Event::GatewayClose(None)).await.is_ok());
    }

    #[test]
    fn singleton_keeps_the_first_config() {
        let http = Arc::new(twilight_http::Client::builder().ratelimiter(None).build());
        let first = SlashCommandClient::get_or_init(
            ClientConfig::of(|c| {
                c.command(StaticCommand::global("first", "First"));
            }),
            Arc::clone(&http),
        );
        let second = SlashCommandClient::get_or_init(ClientConfig::new(), http);
        assert!(Arc::ptr_eq(&first.inner, &second.inner));
        assert!(second.config().command_by("first").is_some());
        assert!(SlashCommandClient::global().is_some());
    }
}
