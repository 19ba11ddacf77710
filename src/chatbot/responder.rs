//! AI responder: prompt decoration, provider fallback and memory upkeep.

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio::time::timeout;

use crate::intent::IntentSignals;
use crate::providers::{ProviderChain, VisionProvider};
use crate::types::{ImageInput, IncomingMessage, ProviderResponse};

use super::memory::ConversationMemory;
use super::prompt::build_prompt;

/// Reply used when every provider came back empty.
pub const PLACEHOLDER_REPLY: &str = "I'm protecting my peace right now. Try again later. 🥀";

/// Provenance tag for the placeholder reply.
pub const PLACEHOLDER_PROVIDER: &str = "placeholder";

pub struct AiResponder {
    persona: String,
    chain: Arc<ProviderChain>,
    vision: Option<Arc<dyn VisionProvider>>,
    memory: Arc<ConversationMemory>,
    vision_timeout: Duration,
}

impl AiResponder {
    #[must_use]
    pub fn new(
        persona: impl Into<String>,
        chain: Arc<ProviderChain>,
        vision: Option<Arc<dyn VisionProvider>>,
        memory: Arc<ConversationMemory>,
        vision_timeout: Duration,
    ) -> Self {
        Self {
            persona: persona.into(),
            chain,
            vision,
            memory,
            vision_timeout,
        }
    }

    #[must_use]
    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Produces reply text for `message`. Never fails: provider trouble ends
    /// in the placeholder reply. The exchange is always remembered.
    ///
    /// A roast request with an avatar goes to the vision provider alone;
    /// without a vision provider it is answered by the text chain instead.
    pub async fn respond(
        &self,
        message: &IncomingMessage,
        signals: &IntentSignals,
        avatar: Option<&ImageInput>,
    ) -> ProviderResponse {
        let prompt = build_prompt(&self.persona, message, signals);

        let answer = match (signals.is_roast_request, avatar, &self.vision) {
            (true, Some(image), Some(vision)) => {
                self.roast(vision.as_ref(), &prompt.system, &prompt.user, image)
                    .await
            }
            _ => {
                let history = self.memory.history(message.channel_id).await;
                self.chain
                    .complete(&prompt.system, &prompt.user, &history)
                    .await
            }
        };

        let response = answer.unwrap_or_else(|| {
            warn!(
                "No provider produced text for message {}, using placeholder",
                message.id
            );
            ProviderResponse {
                text: PLACEHOLDER_REPLY.to_string(),
                provider: PLACEHOLDER_PROVIDER,
            }
        });

        self.memory
            .record_exchange(message.channel_id, &message.content, &response.text)
            .await;
        response
    }

    async fn roast(
        &self,
        vision: &dyn VisionProvider,
        system: &str,
        prompt: &str,
        image: &ImageInput,
    ) -> Option<ProviderResponse> {
        let name = vision.name();
        match timeout(
            self.vision_timeout,
            vision.complete_with_image(system, prompt, image),
        )
        .await
        {
            Ok(Ok(text)) if !text.trim().is_empty() => {
                info!("Roast served by {name}");
                Some(ProviderResponse {
                    text: text.trim().to_string(),
                    provider: name,
                })
            }
            Ok(Ok(_)) => {
                warn!("{name} returned an empty roast");
                None
            }
            Ok(Err(e)) => {
                warn!("{name} vision call failed: {e}");
                None
            }
            Err(_) => {
                warn!("{name} vision call timed out");
                None
            }
        }
    }
}
