//! Reaction-role administration: create, list and delete bindings.

use std::fmt::Write;

use log::warn;
use poise::serenity_prelude::MessageId;

use crate::error::{BotError, Result};
use crate::reaction_roles::{emoji_display, emoji_key};
use crate::store::{Store, log_action};
use crate::types::{LogRecord, ReactionRoleBinding};

use super::dispatch::Invocation;

/// `.role @role emoji`: posts the role message, reacts to it and persists
/// the binding. The posted message is removed again if either step fails.
pub async fn create(inv: &Invocation<'_>, store: &dyn Store) -> Result<()> {
    let guild = inv.guild()?;
    let role = inv
        .message
        .role_mentions
        .first()
        .ok_or(BotError::TargetNotFound {
            command: inv.command.name,
        })?;
    let emoji = inv
        .command
        .args
        .split_whitespace()
        .find(|token| !token.starts_with("<@"))
        .ok_or_else(|| {
            BotError::Validation("Which emoji? Try `.role @role 💖`.".to_string())
        })?;

    let posted = inv
        .say(&format!(
            "React with {emoji} to get the **{}** role. Choose wisely. 🥂",
            role.name
        ))
        .await?;

    let binding = ReactionRoleBinding {
        guild_id: guild,
        channel_id: inv.message.channel_id,
        message_id: posted,
        emoji: emoji_key(emoji),
        role_id: role.id,
        role_name: role.name.clone(),
    };
    if let Err(e) = bind(inv, store, &binding, emoji).await {
        if let Err(cleanup) = inv
            .gateway
            .delete_message(inv.message.channel_id, posted)
            .await
        {
            warn!("Failed to remove orphaned role message {posted}: {cleanup}");
        }
        return Err(e);
    }

    log_action(
        store,
        LogRecord::new(
            "ROLE_CREATED",
            &role.name,
            format!("Reaction role {emoji} on message {posted}"),
            inv.message.author_tag(),
        ),
    )
    .await;
    Ok(())
}

async fn bind(
    inv: &Invocation<'_>,
    store: &dyn Store,
    binding: &ReactionRoleBinding,
    emoji: &str,
) -> Result<()> {
    inv.gateway
        .react(binding.channel_id, binding.message_id, emoji)
        .await?;
    store.insert_reaction_role(binding).await
}

/// `.roles`: every binding in this server.
pub async fn list(inv: &Invocation<'_>, store: &dyn Store) -> Result<()> {
    let guild = inv.guild()?;
    let bindings: Vec<ReactionRoleBinding> = store
        .list_reaction_roles()
        .await?
        .into_iter()
        .filter(|b| b.guild_id == guild)
        .collect();

    if bindings.is_empty() {
        inv.reply("No reaction roles yet. Start with `.role @role emoji`. 🕯️")
            .await?;
        return Ok(());
    }

    let mut text = String::from("**Reaction Roles** 🥂");
    for binding in &bindings {
        let _ = write!(
            text,
            "\n- {} → **{}** (message `{}` in <#{}>)",
            emoji_display(&binding.emoji),
            binding.role_name,
            binding.message_id,
            binding.channel_id
        );
    }
    inv.reply(&text).await?;
    Ok(())
}

/// `.delrole <messageId>`: drops every binding on that message. Messages
/// bound in another server count as unknown.
pub async fn delete(inv: &Invocation<'_>, store: &dyn Store) -> Result<()> {
    let guild = inv.guild()?;
    let message_id = parse_message_id(&inv.command.args)?;
    let not_found = || BotError::TargetNotFound {
        command: inv.command.name,
    };

    let owned = store
        .list_reaction_roles()
        .await?
        .iter()
        .any(|b| b.message_id == message_id && b.guild_id == guild);
    if !owned {
        return Err(not_found());
    }

    let removed = store.delete_reaction_role(message_id).await?;
    if removed == 0 {
        return Err(not_found());
    }
    log_action(
        store,
        LogRecord::new(
            "ROLE_DELETED",
            message_id.to_string(),
            format!("{removed} reaction role binding(s) removed"),
            inv.message.author_tag(),
        ),
    )
    .await;
    inv.reply("Reaction role removed. That role is off the menu. 🗑️")
        .await?;
    Ok(())
}

fn parse_message_id(args: &str) -> Result<MessageId> {
    let usage = || {
        BotError::Validation("Give me a message ID, like `.delrole 1234567890`.".to_string())
    };
    let raw = args.split_whitespace().next().ok_or_else(usage)?;
    match raw.parse::<u64>() {
        Ok(id) if id > 0 => Ok(MessageId::new(id)),
        _ => Err(usage()),
    }
}
