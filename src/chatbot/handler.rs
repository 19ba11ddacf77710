//! Main handler for messages routed to the AI responder.

use log::{debug, error, info, warn};
use poise::serenity_prelude::MessageId;

use crate::gateway::Gateway;
use crate::intent::{IntentSignals, SASS_REACTION};
use crate::types::{ImageInput, IncomingMessage};

use super::responder::AiResponder;
use super::response::send_response;

/// Sent first for direct calls and roasts, then edited with the answer.
pub const THINKING_REPLY: &str = "🔮 Consulting the universe...";

/// Last-resort reply when delivery itself breaks down.
pub const FAILURE_REPLY: &str =
    "The universe is blocking this connection. Probably because your frequency is too low. 🔮";

/// Reacts, shows progress, asks the responder and delivers its text.
///
/// Nothing escapes: any failure ends in one [`FAILURE_REPLY`] attempt.
pub async fn handle_ai_route(
    gateway: &dyn Gateway,
    responder: &AiResponder,
    message: &IncomingMessage,
    signals: &IntentSignals,
) {
    info!(
        "Responding to {} in channel {}: {}",
        message.author_tag(),
        message.channel_id,
        message.content
    );

    if signals.is_keyword_trigger {
        add_sass_reactions(gateway, message, signals).await;
    }

    let placeholder = show_progress(gateway, message, signals).await;

    let avatar = if signals.is_roast_request {
        fetch_avatar(gateway, message).await
    } else {
        None
    };

    let response = responder.respond(message, signals, avatar.as_ref()).await;
    debug!("Response for message {} from {}", message.id, response.provider);

    if let Err(e) = send_response(gateway, message, placeholder, &response.text).await {
        error!(
            "Error delivering response to {}: {e}",
            message.author_tag()
        );
        if let Err(e) = gateway.reply(message, FAILURE_REPLY).await {
            error!("Failed to send failure reply: {e}");
        }
    }
}

async fn add_sass_reactions(
    gateway: &dyn Gateway,
    message: &IncomingMessage,
    signals: &IntentSignals,
) {
    let mut emojis = vec![SASS_REACTION];
    for emoji in signals.topics.iter().filter_map(|topic| topic.reaction()) {
        if !emojis.contains(&emoji) {
            emojis.push(emoji);
        }
    }
    for emoji in emojis {
        if let Err(e) = gateway.react(message.channel_id, message.id, emoji).await {
            debug!("Failed to react with {emoji}: {e}");
        }
    }
}

async fn show_progress(
    gateway: &dyn Gateway,
    message: &IncomingMessage,
    signals: &IntentSignals,
) -> Option<MessageId> {
    if signals.is_direct_call || signals.is_roast_request {
        match gateway.reply(message, THINKING_REPLY).await {
            Ok(id) => return Some(id),
            Err(e) => warn!("Failed to send thinking placeholder: {e}"),
        }
    } else if let Err(e) = gateway.broadcast_typing(message.channel_id).await {
        debug!("Failed to broadcast typing indicator: {e}");
    }
    None
}

async fn fetch_avatar(gateway: &dyn Gateway, message: &IncomingMessage) -> Option<ImageInput> {
    match gateway.fetch_image(&message.avatar_url).await {
        Ok(image) => Some(image),
        Err(e) => {
            warn!("Failed to fetch avatar for {}: {e}", message.author_tag());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::chatbot::memory::ConversationMemory;
    use crate::chatbot::responder::PLACEHOLDER_REPLY;
    use crate::intent::Topic;
    use crate::providers::{ProviderChain, Seeding};
    use crate::testing::{Call, RecordingGateway, ScriptedProvider, ScriptedVision, message};

    fn responder(text: &str) -> AiResponder {
        let chain = ProviderChain::new(Duration::from_secs(5))
            .with(ScriptedProvider::replying("nvidia", text), Seeding::Stateless);
        AiResponder::new(
            "PERSONA",
            Arc::new(chain),
            Some(ScriptedVision::replying("gemini", "that pfp is a cry for help")),
            Arc::new(ConversationMemory::new(10)),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn keyword_trigger_reacts_and_replies_without_placeholder() {
        let gateway = RecordingGateway::new();
        let signals = IntentSignals {
            is_keyword_trigger: true,
            topics: vec![Topic::Romance, Topic::Money],
            ..IntentSignals::default()
        };

        handle_ai_route(&gateway, &responder("period."), &message("love money"), &signals).await;

        assert_eq!(gateway.reactions(), vec!["💅", "💔", "💸"]);
        assert_eq!(gateway.count(|c| matches!(c, Call::Typing)), 1);
        assert_eq!(gateway.texts(), vec!["period.".to_string()]);
    }

    #[tokio::test]
    async fn direct_call_edits_the_thinking_placeholder() {
        let gateway = RecordingGateway::new();
        let signals = IntentSignals {
            is_direct_call: true,
            ..IntentSignals::default()
        };

        handle_ai_route(&gateway, &responder("hello peasant"), &message("mepa hi"), &signals)
            .await;

        assert_eq!(
            gateway.texts(),
            vec![THINKING_REPLY.to_string(), "hello peasant".to_string()]
        );
        assert_eq!(gateway.count(|c| matches!(c, Call::Edit { .. })), 1);
        assert!(gateway.reactions().is_empty());
    }

    #[tokio::test]
    async fn roast_fetches_the_avatar() {
        let gateway = RecordingGateway::new();
        let signals = IntentSignals {
            is_roast_request: true,
            ..IntentSignals::default()
        };
        let msg = message("roast me");

        handle_ai_route(&gateway, &responder("unused"), &msg, &signals).await;

        assert!(gateway.calls().contains(&Call::FetchImage {
            url: msg.avatar_url.clone()
        }));
        assert_eq!(
            gateway.texts().last().map(String::as_str),
            Some("that pfp is a cry for help")
        );
    }

    #[tokio::test]
    async fn empty_chain_delivers_placeholder_text() {
        let gateway = RecordingGateway::new();
        let signals = IntentSignals {
            is_proactive_match: true,
            ..IntentSignals::default()
        };
        handle_ai_route(&gateway, &responder(""), &message("anyway"), &signals).await;
        assert_eq!(gateway.texts(), vec![PLACEHOLDER_REPLY.to_string()]);
    }

    #[tokio::test]
    async fn failed_delivery_sends_failure_reply() {
        let gateway = RecordingGateway::new().failing_first_reply();
        let signals = IntentSignals {
            is_keyword_trigger: true,
            topics: vec![Topic::Appearance],
            ..IntentSignals::default()
        };
        handle_ai_route(&gateway, &responder("cute"), &message("nice outfit"), &signals).await;
        assert_eq!(gateway.texts(), vec![FAILURE_REPLY.to_string()]);
    }
}
