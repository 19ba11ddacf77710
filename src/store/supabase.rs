//! Supabase (PostgREST) backed store.

use async_trait::async_trait;
use log::debug;
use poise::serenity_prelude::MessageId;
use reqwest::{Client, RequestBuilder, Response};
use url::Url;

use crate::config::SupabaseConfig;
use crate::error::{BotError, Result};
use crate::types::{LogRecord, ReactionRoleBinding};

use super::Store;

const LOGS_TABLE: &str = "logs";
const REACTION_ROLES_TABLE: &str = "reaction_roles";

pub struct SupabaseStore {
    client: Client,
    rest_url: Url,
    key: String,
}

impl SupabaseStore {
    /// # Errors
    ///
    /// Returns an error if the configured URL cannot be parsed.
    pub fn new(config: &SupabaseConfig) -> Result<Self> {
        let base = format!("{}/", config.url.trim_end_matches('/'));
        let rest_url = Url::parse(&base)?.join("rest/v1/")?;
        Ok(Self {
            client: Client::new(),
            rest_url,
            key: config.key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> Result<Url> {
        Ok(self.rest_url.join(table)?)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    async fn check(response: Response, operation: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("Failed to read error response: {e}"));
        Err(BotError::Persistence(format!(
            "{operation} failed ({status}): {body}"
        )))
    }
}

#[async_trait]
impl Store for SupabaseStore {
    async fn insert_log(&self, record: &LogRecord) -> Result<()> {
        let response = self
            .authorize(self.client.post(self.table_url(LOGS_TABLE)?))
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await?;
        Self::check(response, "insert log").await?;
        Ok(())
    }

    async fn list_reaction_roles(&self) -> Result<Vec<ReactionRoleBinding>> {
        let mut url = self.table_url(REACTION_ROLES_TABLE)?;
        url.query_pairs_mut().append_pair("select", "*");
        let response = self.authorize(self.client.get(url)).send().await?;
        let bindings: Vec<ReactionRoleBinding> =
            Self::check(response, "list reaction roles").await?.json().await?;
        debug!("Loaded {} reaction role bindings", bindings.len());
        Ok(bindings)
    }

    async fn insert_reaction_role(&self, binding: &ReactionRoleBinding) -> Result<()> {
        let mut url = self.table_url(REACTION_ROLES_TABLE)?;
        url.query_pairs_mut()
            .append_pair("on_conflict", "message_id,emoji");
        let response = self
            .authorize(self.client.post(url))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(binding)
            .send()
            .await?;
        Self::check(response, "insert reaction role").await?;
        Ok(())
    }

    async fn delete_reaction_role(&self, message_id: MessageId) -> Result<usize> {
        let mut url = self.table_url(REACTION_ROLES_TABLE)?;
        url.query_pairs_mut()
            .append_pair("message_id", &format!("eq.{message_id}"));
        let response = self
            .authorize(self.client.delete(url))
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let removed: Vec<serde_json::Value> =
            Self::check(response, "delete reaction role").await?.json().await?;
        Ok(removed.len())
    }
}
