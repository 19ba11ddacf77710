//! Chat-platform capabilities the bot consumes.

use std::time::Duration;

use async_trait::async_trait;
use poise::serenity_prelude::{ChannelId, GuildId, MessageId, RoleId, UserId};

use crate::error::Result;
use crate::types::{ImageInput, IncomingMessage, WelcomeCard};

/// Opaque side-effecting operations against the chat platform.
///
/// Every call may fail with a platform error; callers convert failures into
/// replies or log lines and never let them escape the event boundary.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn send_message(&self, channel: ChannelId, text: &str) -> Result<MessageId>;

    /// Sends `text` as a reply referencing `to`.
    async fn reply(&self, to: &IncomingMessage, text: &str) -> Result<MessageId>;

    async fn edit_message(&self, channel: ChannelId, message: MessageId, text: &str)
    -> Result<()>;

    async fn react(&self, channel: ChannelId, message: MessageId, emoji: &str) -> Result<()>;

    async fn broadcast_typing(&self, channel: ChannelId) -> Result<()>;

    async fn delete_message(&self, channel: ChannelId, message: MessageId) -> Result<()>;

    /// Deletes up to `count` recent messages and returns how many went.
    async fn delete_recent_messages(&self, channel: ChannelId, count: u8) -> Result<usize>;

    async fn timeout_member(
        &self,
        guild: GuildId,
        user: UserId,
        duration: Duration,
        reason: &str,
    ) -> Result<()>;

    async fn kick_member(&self, guild: GuildId, user: UserId, reason: &str) -> Result<()>;

    async fn ban_member(
        &self,
        guild: GuildId,
        user: UserId,
        delete_message_days: u8,
        reason: &str,
    ) -> Result<()>;

    async fn unban_member(&self, guild: GuildId, user: UserId) -> Result<()>;

    async fn grant_role(&self, guild: GuildId, user: UserId, role: RoleId) -> Result<()>;

    async fn revoke_role(&self, guild: GuildId, user: UserId, role: RoleId) -> Result<()>;

    /// First text channel whose name contains one of `fragments`, tried in order.
    async fn find_channel(&self, guild: GuildId, fragments: &[&str]) -> Option<ChannelId>;

    async fn send_card(&self, channel: ChannelId, card: &WelcomeCard) -> Result<()>;

    async fn fetch_image(&self, url: &str) -> Result<ImageInput>;
}
