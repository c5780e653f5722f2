//! REST calls made on behalf of commands and contexts.
//!
//! All outbound HTTP calls go through [`DiscordHttp`] so that logging and
//! error conversion live in one place. Auth, rate limiting and retries are
//! twilight-http's job; this module only picks the routes.

use std::sync::Arc;

use tracing::{debug, info};
use twilight_http::Client;
use twilight_model::{
    application::{command::Command, interaction::Interaction},
    http::interaction::InteractionResponse,
    id::{
        marker::{ApplicationMarker, ChannelMarker, GuildMarker, MessageMarker, UserMarker},
        Id,
    },
    oauth::Application,
};

use crate::{error::Result, reply::ReplyEdit};

/// Handle to the twilight REST client.
///
/// Cheap to clone (internals are behind `Arc`).
#[derive(Debug, Clone)]
pub struct DiscordHttp {
    client: Arc<Client>,
}

impl DiscordHttp {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    /// Create a new client with the given bot token.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self::new(Arc::new(Client::new(token.into())))
    }

    /// The underlying twilight client, for routes not wrapped here.
    pub fn client(&self) -> &Client {
        &self.client
    }

    // ------------------------------------------------------------------
    // Interaction responses
    // ------------------------------------------------------------------

    /// `POST /interactions/{id}/{token}/callback`
    pub async fn create_interaction_response(
        &self,
        interaction: &Interaction,
        response: &InteractionResponse,
    ) -> Result<()> {
        self.client
            .interaction(interaction.application_id)
            .create_response(interaction.id, &interaction.token, response)
            .await?;
        debug!(
            interaction_id = %interaction.id,
            kind = ?response.kind,
            "sent interaction response"
        );
        Ok(())
    }

    /// `PATCH /webhooks/{application_id}/{token}/messages/@original`
    ///
    /// Content is only touched when the edit carries some; embeds and
    /// components are always replaced.
    pub async fn edit_original_interaction_response(
        &self,
        interaction: &Interaction,
        edit: &ReplyEdit,
    ) -> Result<()> {
        let interaction_client = self.client.interaction(interaction.application_id);
        let mut request = interaction_client
            .update_response(&interaction.token)
            .embeds(Some(edit.embeds.as_slice()))
            .components(Some(edit.components.as_slice()));
        if let Some(content) = edit.content.as_deref() {
            request = request.content(Some(content));
        }
        request.await?;
        debug!(interaction_id = %interaction.id, "edited original response");
        Ok(())
    }

    /// `DELETE /webhooks/{application_id}/{token}/messages/@original`
    pub async fn delete_original_interaction_response(
        &self,
        interaction: &Interaction,
    ) -> Result<()> {
        self.client
            .interaction(interaction.application_id)
            .delete_response(&interaction.token)
            .await?;
        debug!(interaction_id = %interaction.id, "deleted original response");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Messages
    // ------------------------------------------------------------------

    /// `DELETE /channels/{channel_id}/messages/{message_id}`
    pub async fn delete_message(
        &self,
        channel_id: Id<ChannelMarker>,
        message_id: Id<MessageMarker>,
    ) -> Result<()> {
        self.client.delete_message(channel_id, message_id).await?;
        debug!(%channel_id, %message_id, "deleted message");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Application commands
    // ------------------------------------------------------------------

    /// `PUT /applications/{application_id}/commands`
    pub async fn bulk_overwrite_global_commands(
        &self,
        application_id: Id<ApplicationMarker>,
        commands: &[Command],
    ) -> Result<Vec<Command>> {
        let registered = self
            .client
            .interaction(application_id)
            .set_global_commands(commands)
            .await?
            .models()
            .await?;
        info!(count = registered.len(), "registered global slash commands");
        Ok(registered)
    }

    /// `PUT /applications/{application_id}/guilds/{guild_id}/commands`
    pub async fn bulk_overwrite_guild_commands(
        &self,
        application_id: Id<ApplicationMarker>,
        guild_id: Id<GuildMarker>,
        commands: &[Command],
    ) -> Result<Vec<Command>> {
        let registered = self
            .client
            .interaction(application_id)
            .set_guild_commands(guild_id, commands)
            .await?
            .models()
            .await?;
        info!(
            count = registered.len(),
            %guild_id,
            "registered guild slash commands"
        );
        Ok(registered)
    }

    // ------------------------------------------------------------------
    // Application info
    // ------------------------------------------------------------------

    /// `GET /oauth2/applications/@me`, reduced to the users who own it.
    pub async fn application_owners(&self) -> Result<Vec<Id<UserMarker>>> {
        let application = self
            .client
            .current_user_application()
            .await?
            .model()
            .await?;
        Ok(owners_of(&application))
    }
}

/// Team members when the application belongs to a team, else its owner.
pub fn owners_of(application: &Application) -> Vec<Id<UserMarker>> {
    match &application.team {
        Some(team) => team.members.iter().map(|m| m.user.id).collect(),
        None => application.owner.iter().map(|u| u.id).collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::user_json;
    use serde_json::{json, Value};

    static_assertions::assert_impl_all!(DiscordHttp: Send, Sync, Clone);

    fn application_json(owner: Value, team: Value) -> Value {
        json!({
            "id": "2000",
            "name": "slashcord",
            "description": "",
            "summary": "",
            "icon": null,
            "bot_public": true,
            "bot_require_code_grant": false,
            "verify_key": "key",
            "flags": 0,
            "rpc_origins": [],
            "redirect_uris": [],
            "tags": [],
            "owner": owner,
            "team": team,
        })
    }

    fn team_member(id: u64) -> Value {
        json!({
            "membership_state": 2,
            "permissions": ["*"],
            "role": "admin",
            "team_id": "500",
            "user": user_json(id, false),
        })
    }

    // -- owners_of() ---------------------------------------------------------

    #[test]
    fn single_owner_without_a_team() {
        let application: Application =
            serde_json::from_value(application_json(user_json(10, false), Value::Null)).unwrap();
        assert_eq!(owners_of(&application), [Id::<UserMarker>::new(10)]);
    }

    #[test]
    fn team_members_replace_the_owner() {
        let team = json!({
            "icon": null,
            "id": "500",
            "members": [team_member(11), team_member(12)],
            "name": "devs",
            "owner_user_id": "11",
        });
        let application: Application =
            serde_json::from_value(application_json(user_json(10, false), team)).unwrap();
        assert_eq!(owners_of(&application), [Id::<UserMarker>::new(11), Id::new(12)]);
    }

    #[test]
    fn no_owner_at_all() {
        let application: Application =
            serde_json::from_value(application_json(Value::Null, Value::Null)).unwrap();
        assert!(owners_of(&application).is_empty());
    }
}
