//! Welcome card for new members.

use chrono::{DateTime, Utc};
use log::{debug, info};
use poise::serenity_prelude::ChannelId;

use crate::error::Result;
use crate::gateway::Gateway;
use crate::store::{Store, log_action};
use crate::types::{LogRecord, MemberJoin, WelcomeCard};

/// Channel name fragments, in preference order.
pub const WELCOME_CHANNEL_HINTS: &[&str] = &["welcome", "general", "chat"];

/// Gold.
pub const WELCOME_COLOR: u32 = 0x00D4_AF37;

#[must_use]
pub fn build_card(join: &MemberJoin, joined_at: DateTime<Utc>) -> WelcomeCard {
    WelcomeCard {
        greeting: format!(
            "Hey <@{}>, welcome to {}. 🍸",
            join.user_id, join.guild_name
        ),
        title: "✨ A New Muse Has Arrived".to_string(),
        description: format!(
            "Welcome to the inner circle, **{}**.\n\nWe were waiting for someone with actual \
             taste to show up. Don't disappoint us.",
            join.username
        ),
        thumbnail_url: join.avatar_url.clone(),
        fields: vec![
            (
                "📅 Member Since".to_string(),
                format!("<t:{}:R>", joined_at.timestamp()),
            ),
            ("💅 Vibe Check".to_string(), "Pending...".to_string()),
        ],
        footer: "Mepa | High Standards Only".to_string(),
        color: WELCOME_COLOR,
    }
}

/// Sends the welcome card to the first matching channel and logs the join.
/// Returns the channel used, or `None` when the server has no such channel.
///
/// # Errors
///
/// Returns an error if sending the card fails.
pub async fn welcome_member(
    gateway: &dyn Gateway,
    store: &dyn Store,
    join: &MemberJoin,
) -> Result<Option<ChannelId>> {
    let Some(channel) = gateway
        .find_channel(join.guild_id, WELCOME_CHANNEL_HINTS)
        .await
    else {
        debug!("No welcome channel in guild {}", join.guild_id);
        return Ok(None);
    };

    let card = build_card(join, Utc::now());
    gateway.send_card(channel, &card).await?;
    info!("Welcomed {} in channel {channel}", join.username);

    log_action(
        store,
        LogRecord::new(
            "JOIN",
            &join.username,
            "User joined the server.",
            &join.username,
        ),
    )
    .await;
    Ok(Some(channel))
}
