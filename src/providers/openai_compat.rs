//! Chat-completions client for OpenAI-compatible APIs (NVIDIA, Groq).

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;
use crate::error::{BotError, Result};
use crate::types::MessageRole;

use super::{CompletionProvider, CompletionRequest};

pub const NVIDIA_API_URL: &str = "https://integrate.api.nvidia.com/v1/chat/completions";
pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

// Discord's message limit is 2000 characters; ~4 characters per token.
const MAX_TOKENS: u32 = 512;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct OpenAiCompatProvider {
    name: &'static str,
    endpoint: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    pub fn new(
        name: &'static str,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn nvidia(config: &ProviderConfig) -> Self {
        Self::new("nvidia", NVIDIA_API_URL, &config.api_key, &config.model)
    }

    #[must_use]
    pub fn groq(config: &ProviderConfig) -> Self {
        Self::new("groq", GROQ_API_URL, &config.api_key, &config.model)
    }

    fn build_messages<'a>(request: &'a CompletionRequest) -> Vec<ChatMessage<'a>> {
        let mut messages = Vec::with_capacity(request.history.len() + 2);
        messages.push(ChatMessage {
            role: "system",
            content: &request.system,
        });
        messages.extend(request.history.iter().map(|turn| ChatMessage {
            role: match turn.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
            },
            content: &turn.text,
        }));
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });
        messages
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: Self::build_messages(request),
            max_tokens: MAX_TOKENS,
            temperature: request.temperature,
        };
        debug!(
            "Sending request to {} with {} messages",
            self.name,
            body.messages.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response: {e}"));
            return Err(BotError::ProviderApi {
                provider: self.name,
                status,
                message,
            });
        }

        let api_response: ChatResponse = response.json().await?;
        let reply = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| BotError::ProviderResponse {
                provider: self.name,
                message: "No choices in response".to_string(),
            })?
            .message
            .content
            .unwrap_or_default();

        debug!("Received {} characters from {}", reply.len(), self.name);
        Ok(reply)
    }
}
