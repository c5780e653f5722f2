//! Bot runner: gateway shard, environment, and the async event loop.
//!
//! The shard and REST client come from twilight; this module wires them to a
//! [`SlashCommandClient`] and spawns one task per event so a slow handler
//! never stalls the gateway.

use std::sync::Arc;

use anyhow::Context as _;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use twilight_gateway::{EventTypeFlags, Intents, Shard, ShardId, StreamExt as _};

use crate::{
    client::SlashCommandClient,
    config::{ClientConfig, Settings},
};

/// Environment variable holding the bot token.
pub const TOKEN_VAR: &str = "DISCORD_TOKEN";
/// Environment variable holding an optional path to a settings JSON file.
pub const SETTINGS_VAR: &str = "SLASHCORD_SETTINGS";

// ---------------------------------------------------------------------------
// Gateway intents
// ---------------------------------------------------------------------------

/// Interactions arrive without any privileged intent; GUILDS keeps the
/// session's guild list for READY.
pub fn gateway_intents() -> Intents {
    Intents::GUILDS
}

/// Only these events are deserialized; the rest are skipped by the shard.
pub fn event_types() -> EventTypeFlags {
    EventTypeFlags::READY | EventTypeFlags::INTERACTION_CREATE
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Install a fmt subscriber filtered by `RUST_LOG`, defaulting to `info`.
/// Does nothing if a subscriber is already set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Settings from the file named by `path`, if any.
pub fn load_settings(path: Option<&str>) -> crate::error::Result<Option<Settings>> {
    path.map(Settings::from_json_file).transpose()
}

// ---------------------------------------------------------------------------
// Bot entry point
// ---------------------------------------------------------------------------

/// Run a bot serving `config` until the gateway closes.
///
/// Reads `.env`, then [`TOKEN_VAR`] and optionally [`SETTINGS_VAR`], whose
/// settings replace those in `config`.
pub async fn start(mut config: ClientConfig) -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let token = std::env::var(TOKEN_VAR).map_err(|_| {
        error!("{TOKEN_VAR} environment variable not set");
        anyhow::anyhow!("{TOKEN_VAR} environment variable not set")
    })?;

    let settings_path = std::env::var(SETTINGS_VAR).ok();
    if let Some(settings) = load_settings(settings_path.as_deref())
        .with_context(|| format!("loading {SETTINGS_VAR}"))?
    {
        info!(path = ?settings_path, "loaded settings");
        config = config.with_settings(settings);
    }

    let http = Arc::new(twilight_http::Client::new(token.clone()));
    let client = SlashCommandClient::get_or_init(config, http);

    let mut shard = Shard::new(ShardId::ONE, token, gateway_intents());
    info!(
        commands = client.config().all_commands().len(),
        "gateway connecting, entering event loop"
    );

    // ----- Main event loop -----
    while let Some(item) = shard.next_event(event_types()).await {
        let event = match item {
            Ok(event) => event,
            Err(source) => {
                warn!(?source, "error receiving event");
                continue;
            }
        };

        tokio::spawn(async move {
            if let Err(e) = client.handle_event(&event).await {
                error!(error = %e, kind = ?event.kind(), "failed to handle event");
            }
        });
    }

    warn!("event stream ended, bot shutting down");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
