//! Response delivery to the chat platform.

use log::{info, warn};
use poise::serenity_prelude::MessageId;

use crate::error::Result;
use crate::gateway::Gateway;
use crate::types::IncomingMessage;

/// Discord's hard limit on message content, in characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Cuts `text` to the message limit on a character boundary.
#[must_use]
pub fn truncate_for_discord(text: &str) -> &str {
    match text.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Delivers the final text: edits the "thinking" placeholder when one was
/// sent, otherwise replies. A failed edit falls back to a fresh reply.
pub async fn send_response(
    gateway: &dyn Gateway,
    message: &IncomingMessage,
    placeholder: Option<MessageId>,
    text: &str,
) -> Result<()> {
    let text = truncate_for_discord(text);

    if let Some(placeholder) = placeholder {
        match gateway
            .edit_message(message.channel_id, placeholder, text)
            .await
        {
            Ok(()) => {
                info!(
                    "Replied to {} in channel {}: {}",
                    message.author_tag(),
                    message.channel_id,
                    text
                );
                return Ok(());
            }
            Err(e) => warn!("Failed to edit placeholder {placeholder}, replying instead: {e}"),
        }
    }

    gateway.reply(message, text).await?;
    info!(
        "Replied to {} in channel {}: {}",
        message.author_tag(),
        message.channel_id,
        text
    );
    Ok(())
}
