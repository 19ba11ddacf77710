//! Moderation command handlers.

use std::time::Duration;

use log::debug;

use crate::error::{BotError, Result};
use crate::store::{Store, log_action};
use crate::types::{LogRecord, UserMention};

use super::dispatch::Invocation;
use super::parser::parse_clear_amount;

const DEFAULT_REASON: &str = "No reason given";
const SOFTBAN_DELETE_DAYS: u8 = 7;

/// Mentioned target, refusing self-targeting.
fn target<'a>(inv: &'a Invocation<'_>) -> Result<&'a UserMention> {
    let target = inv.target()?;
    if target.id == inv.message.author_id {
        return Err(BotError::Validation(
            "Self-sabotage isn't a vibe. Pick someone else.".to_string(),
        ));
    }
    Ok(target)
}

fn reason(inv: &Invocation<'_>) -> String {
    inv.command
        .reason()
        .unwrap_or_else(|| DEFAULT_REASON.to_string())
}

pub async fn ban(inv: &Invocation<'_>, store: &dyn Store) -> Result<()> {
    let guild = inv.guild()?;
    let target = target(inv)?;
    let reason = reason(inv);

    inv.gateway
        .ban_member(guild, target.id, 0, &reason)
        .await?;
    log_action(
        store,
        LogRecord::new(
            "BAN",
            &target.name,
            format!("Banned by {}: {reason}", inv.message.author_tag()),
            inv.message.author_tag(),
        ),
    )
    .await;
    inv.say(&format!(
        "{} is gone forever. Good riddance. 🔨",
        target.name
    ))
    .await?;
    Ok(())
}

pub async fn kick(inv: &Invocation<'_>, store: &dyn Store) -> Result<()> {
    let guild = inv.guild()?;
    let target = target(inv)?;
    let reason = reason(inv);

    inv.gateway.kick_member(guild, target.id, &reason).await?;
    log_action(
        store,
        LogRecord::new(
            "KICK",
            &target.name,
            format!("Kicked by {}: {reason}", inv.message.author_tag()),
            inv.message.author_tag(),
        ),
    )
    .await;
    inv.say(&format!(
        "{} has been removed. The vibe has improved immediately. ✨",
        target.name
    ))
    .await?;
    Ok(())
}

pub async fn mute(inv: &Invocation<'_>, store: &dyn Store, duration: Duration) -> Result<()> {
    let guild = inv.guild()?;
    let target = target(inv)?;
    let reason = reason(inv);
    let minutes = duration.as_secs() / 60;

    inv.gateway
        .timeout_member(guild, target.id, duration, &reason)
        .await?;
    log_action(
        store,
        LogRecord::new(
            "MUTE",
            &target.name,
            format!(
                "Timed out for {minutes} minutes by {}: {reason}",
                inv.message.author_tag()
            ),
            inv.message.author_tag(),
        ),
    )
    .await;
    inv.say(&format!(
        "{} has been muted for {minutes} minutes. Silence is golden. 🤐",
        target.name
    ))
    .await?;
    Ok(())
}

/// Ban that wipes a week of messages, immediately lifted.
pub async fn softban(inv: &Invocation<'_>, store: &dyn Store) -> Result<()> {
    let guild = inv.guild()?;
    let target = target(inv)?;
    let reason = reason(inv);

    inv.gateway
        .ban_member(guild, target.id, SOFTBAN_DELETE_DAYS, &reason)
        .await?;
    inv.gateway.unban_member(guild, target.id).await?;
    log_action(
        store,
        LogRecord::new(
            "SOFTBAN",
            &target.name,
            format!("Softbanned by {}: {reason}", inv.message.author_tag()),
            inv.message.author_tag(),
        ),
    )
    .await;
    inv.say(&format!(
        "{} got softbanned. Their messages are gone, and so is their dignity. 🧹",
        target.name
    ))
    .await?;
    Ok(())
}

pub async fn warn(inv: &Invocation<'_>, store: &dyn Store) -> Result<()> {
    inv.guild()?;
    let target = target(inv)?;
    let reason = reason(inv);

    inv.say(&format!(
        "⚠️ <@{}>, consider this your warning: {reason}. Don't make me say it twice. 🐍",
        target.id
    ))
    .await?;
    log_action(
        store,
        LogRecord::new(
            "WARN",
            &target.name,
            format!("Warned by {}: {reason}", inv.message.author_tag()),
            inv.message.author_tag(),
        ),
    )
    .await;
    Ok(())
}

/// The amount is validated before anything is deleted.
pub async fn clear(inv: &Invocation<'_>, store: &dyn Store) -> Result<()> {
    let amount = parse_clear_amount(&inv.command.args)?;
    inv.guild()?;

    let deleted = inv
        .gateway
        .delete_recent_messages(inv.message.channel_id, amount)
        .await?;
    debug!(
        "Deleted {deleted} of {amount} requested messages in channel {}",
        inv.message.channel_id
    );
    log_action(
        store,
        LogRecord::new(
            "CLEARED",
            format!("<#{}>", inv.message.channel_id),
            format!(
                "{deleted} messages deleted by {}",
                inv.message.author_tag()
            ),
            inv.message.author_tag(),
        ),
    )
    .await;
    inv.say(&format!(
        "Cleaned up {deleted} messages. They were mid anyway. 🗑️"
    ))
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude::Permissions;

    use super::*;
    use crate::commands::ParsedCommand;
    use crate::store::MemoryStore;
    use crate::testing::{AUTHOR, Call, RecordingGateway, TARGET, moderator_message};
    use crate::types::IncomingMessage;

    fn invocation<'a>(
        gateway: &'a RecordingGateway,
        message: &'a IncomingMessage,
        command: &'a ParsedCommand,
    ) -> Invocation<'a> {
        Invocation {
            gateway,
            message,
            command,
        }
    }

    fn parse(content: &str) -> std::result::Result<ParsedCommand, &'static str> {
        ParsedCommand::parse(content).ok_or("expected a command")
    }

    #[tokio::test]
    async fn ban_bans_logs_and_confirms() -> std::result::Result<(), &'static str> {
        let gateway = RecordingGateway::new();
        let store = MemoryStore::new();
        let msg = moderator_message(".ban <@500> spamming", Permissions::BAN_MEMBERS);
        let command = parse(&msg.content)?;

        ban(&invocation(&gateway, &msg, &command), &store)
            .await
            .map_err(|_| "ban failed")?;

        assert_eq!(
            gateway.calls()[0],
            Call::Ban {
                user: TARGET,
                delete_message_days: 0
            }
        );
        assert!(gateway.texts()[0].contains("gone forever"));
        let logs = store.logs().await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].action, "BAN");
        assert_eq!(logs[0].subject, "Target");
        assert!(logs[0].context.contains("spamming"));
        Ok(())
    }

    #[tokio::test]
    async fn kick_without_mention_is_target_not_found() -> std::result::Result<(), &'static str> {
        let gateway = RecordingGateway::new();
        let store = MemoryStore::new();
        let mut msg = moderator_message(".kick", Permissions::KICK_MEMBERS);
        msg.mentions.clear();
        let command = parse(&msg.content)?;

        let result = kick(&invocation(&gateway, &msg, &command), &store).await;

        assert!(matches!(result, Err(BotError::TargetNotFound { .. })));
        assert!(gateway.calls().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn self_target_is_refused() -> std::result::Result<(), &'static str> {
        let gateway = RecordingGateway::new();
        let store = MemoryStore::new();
        let mut msg = moderator_message(".mute <@400>", Permissions::MODERATE_MEMBERS);
        msg.mentions[0].id = AUTHOR;
        let command = parse(&msg.content)?;

        let result = mute(
            &invocation(&gateway, &msg, &command),
            &store,
            Duration::from_secs(600),
        )
        .await;

        assert!(matches!(result, Err(BotError::Validation(_))));
        assert!(gateway.calls().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn mute_uses_configured_duration() -> std::result::Result<(), &'static str> {
        let gateway = RecordingGateway::new();
        let store = MemoryStore::new();
        let msg = moderator_message(".timeout <@500>", Permissions::MODERATE_MEMBERS);
        let command = parse(&msg.content)?;

        mute(
            &invocation(&gateway, &msg, &command),
            &store,
            Duration::from_secs(600),
        )
        .await
        .map_err(|_| "mute failed")?;

        assert_eq!(
            gateway.calls()[0],
            Call::Timeout {
                user: TARGET,
                duration: Duration::from_secs(600)
            }
        );
        assert!(gateway.texts()[0].contains("10 minutes"));
        Ok(())
    }

    #[tokio::test]
    async fn softban_bans_with_history_then_unbans() -> std::result::Result<(), &'static str> {
        let gateway = RecordingGateway::new();
        let store = MemoryStore::new();
        let msg = moderator_message(".softban <@500>", Permissions::BAN_MEMBERS);
        let command = parse(&msg.content)?;

        softban(&invocation(&gateway, &msg, &command), &store)
            .await
            .map_err(|_| "softban failed")?;

        let calls = gateway.calls();
        assert_eq!(
            calls[..2],
            [
                Call::Ban {
                    user: TARGET,
                    delete_message_days: 7
                },
                Call::Unban { user: TARGET }
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn warn_mentions_target_and_logs() -> std::result::Result<(), &'static str> {
        let gateway = RecordingGateway::new();
        let store = MemoryStore::new();
        let msg = moderator_message(".warn <@500> be nice", Permissions::MODERATE_MEMBERS);
        let command = parse(&msg.content)?;

        warn(&invocation(&gateway, &msg, &command), &store)
            .await
            .map_err(|_| "warn failed")?;

        assert!(gateway.texts()[0].contains("<@500>"));
        assert!(gateway.texts()[0].contains("be nice"));
        assert_eq!(store.logs().await[0].action, "WARN");
        Ok(())
    }

    #[tokio::test]
    async fn clear_defaults_to_ten() -> std::result::Result<(), &'static str> {
        let gateway = RecordingGateway::new();
        let store = MemoryStore::new();
        let msg = moderator_message(".clear", Permissions::MANAGE_MESSAGES);
        let command = parse(&msg.content)?;

        clear(&invocation(&gateway, &msg, &command), &store)
            .await
            .map_err(|_| "clear failed")?;

        assert_eq!(gateway.calls()[0], Call::Delete { count: 10 });
        assert_eq!(store.logs().await[0].action, "CLEARED");
        Ok(())
    }

    #[tokio::test]
    async fn clear_rejects_out_of_range_before_deleting() -> std::result::Result<(), &'static str> {
        let gateway = RecordingGateway::new();
        let store = MemoryStore::new();
        let msg = moderator_message(".clear 101", Permissions::MANAGE_MESSAGES);
        let command = parse(&msg.content)?;

        let result = clear(&invocation(&gateway, &msg, &command), &store).await;

        assert!(matches!(result, Err(BotError::Validation(_))));
        assert!(gateway.calls().is_empty());
        Ok(())
    }
}
