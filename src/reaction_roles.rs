//! Reaction-role listener: grants and revokes roles bound to (message, emoji).

use log::{debug, info};

use crate::error::Result;
use crate::gateway::Gateway;
use crate::store::Store;
use crate::types::{ReactionEvent, ReactionRoleBinding};

/// Which way a reaction changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionChange {
    Added,
    Removed,
}

/// Storage key for an emoji: the id for custom emoji written as
/// `<:name:id>` or `<a:name:id>`, the trimmed text otherwise.
#[must_use]
pub fn emoji_key(raw: &str) -> String {
    let raw = raw.trim();
    raw.strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .and_then(|inner| inner.rsplit(':').next())
        .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
        .map_or_else(|| raw.to_string(), str::to_string)
}

/// Renders a storage key back into something Discord displays.
#[must_use]
pub fn emoji_display(key: &str) -> String {
    if !key.is_empty() && key.chars().all(|c| c.is_ascii_digit()) {
        format!("<:emoji:{key}>")
    } else {
        key.to_string()
    }
}

/// Looks up the binding for the reaction and grants or revokes its role.
///
/// Bot reactions and reactions without a binding are silent no-ops.
/// Returns the binding that was applied, if any.
///
/// # Errors
///
/// Returns an error if the store lookup or the role change fails.
pub async fn handle_reaction(
    gateway: &dyn Gateway,
    store: &dyn Store,
    event: &ReactionEvent,
    change: ReactionChange,
) -> Result<Option<ReactionRoleBinding>> {
    if event.user_is_bot {
        return Ok(None);
    }

    let binding = store
        .list_reaction_roles()
        .await?
        .into_iter()
        .find(|b| b.message_id == event.message_id && b.emoji == event.emoji);
    let Some(binding) = binding else {
        debug!(
            "No reaction role for {} on message {}",
            event.emoji, event.message_id
        );
        return Ok(None);
    };

    match change {
        ReactionChange::Added => {
            gateway
                .grant_role(binding.guild_id, event.user_id, binding.role_id)
                .await?;
            info!(
                "Granted role {} to user {}",
                binding.role_name, event.user_id
            );
        }
        ReactionChange::Removed => {
            gateway
                .revoke_role(binding.guild_id, event.user_id, binding.role_id)
                .await?;
            info!(
                "Revoked role {} from user {}",
                binding.role_name, event.user_id
            );
        }
    }
    Ok(Some(binding))
}
