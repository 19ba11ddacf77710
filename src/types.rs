//! Common types used throughout the mepa bot.

use chrono::{DateTime, Utc};
use poise::serenity_prelude::{ChannelId, GuildId, MessageId, Permissions, RoleId, UserId};
use serde::{Deserialize, Serialize};

/// Role of a turn in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the human user
    User,
    /// Message from the bot
    Assistant,
}

/// A single remembered (role, text) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: MessageRole,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            text: text.into(),
        }
    }
}

/// A role mentioned in a message, with its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMention {
    pub id: RoleId,
    pub name: String,
}

/// A user mentioned in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMention {
    pub id: UserId,
    pub name: String,
    pub bot: bool,
}

/// Normalized message-create event. Built once per event by the Discord
/// adapter and discarded after handling.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub guild_name: Option<String>,
    pub author_id: UserId,
    pub username: String,
    pub display_name: String,
    pub author_is_bot: bool,
    pub role_names: Vec<String>,
    pub permissions: Permissions,
    pub content: String,
    pub mentions_bot: bool,
    pub mentions: Vec<UserMention>,
    pub role_mentions: Vec<RoleMention>,
    pub avatar_url: String,
    pub voice_channel: Option<ChannelId>,
}

impl IncomingMessage {
    /// First mentioned user that is not a bot.
    #[must_use]
    pub fn first_user_mention(&self) -> Option<&UserMention> {
        self.mentions.iter().find(|m| !m.bot)
    }

    /// Author display for logs and log records.
    #[must_use]
    pub fn author_tag(&self) -> &str {
        &self.username
    }
}

/// Reaction add/remove event.
#[derive(Debug, Clone)]
pub struct ReactionEvent {
    pub guild_id: Option<GuildId>,
    pub message_id: MessageId,
    pub emoji: String,
    pub user_id: UserId,
    pub user_is_bot: bool,
}

/// Member-join event, real or simulated via `.testwelcome`.
#[derive(Debug, Clone)]
pub struct MemberJoin {
    pub guild_id: GuildId,
    pub guild_name: String,
    pub user_id: UserId,
    pub username: String,
    pub avatar_url: String,
}

/// Raw image bytes with their MIME type, for vision providers.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Text produced by a provider, with provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    pub text: String,
    pub provider: &'static str,
}

/// Persisted (message, emoji) -> role mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionRoleBinding {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub emoji: String,
    pub role_id: RoleId,
    pub role_name: String,
}

/// Structured moderation log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub action: String,
    pub subject: String,
    pub context: String,
    pub actor: String,
    pub created_at: DateTime<Utc>,
}

impl LogRecord {
    pub fn new(
        action: impl Into<String>,
        subject: impl Into<String>,
        context: impl Into<String>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            subject: subject.into(),
            context: context.into(),
            actor: actor.into(),
            created_at: Utc::now(),
        }
    }
}

/// Embed-style welcome card, rendered by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WelcomeCard {
    pub greeting: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub fields: Vec<(String, String)>,
    pub footer: String,
    pub color: u32,
}
