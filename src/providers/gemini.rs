//! Google Gemini `generateContent` client, text and vision.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::GeminiConfig;
use crate::error::{BotError, Result};
use crate::types::{ImageInput, MessageRole};

use super::{CompletionProvider, CompletionRequest, VisionProvider};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const PROVIDER_NAME: &str = "gemini";
const MAX_OUTPUT_TOKENS: u32 = 512;
const VISION_TEMPERATURE: f32 = 1.0;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn image(image: &ImageInput) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: image.mime_type.clone(),
                data: STANDARD.encode(&image.data),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

pub struct GeminiProvider {
    api_key: String,
    model: String,
    vision_model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    #[must_use]
    pub fn new(config: &GeminiConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            vision_model: config.vision_model.clone(),
            client: reqwest::Client::new(),
        }
    }

    async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<String> {
        let url = format!("{GEMINI_API_BASE}/{model}:generateContent");
        debug!(
            "Sending request to Gemini model {model} with {} contents",
            request.contents.len()
        );

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response: {e}"));
            return Err(BotError::ProviderApi {
                provider: PROVIDER_NAME,
                status,
                message,
            });
        }

        let api_response: GenerateResponse = response.json().await?;
        let candidate = api_response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| BotError::ProviderResponse {
                provider: PROVIDER_NAME,
                message: "No candidates in response".to_string(),
            })?;

        Ok(extract_text(candidate.content))
    }
}

fn extract_text(content: Option<CandidateContent>) -> String {
    content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

fn system_instruction(system: &str) -> Content {
    Content {
        role: None,
        parts: vec![Part::text(system)],
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let mut contents: Vec<Content> = request
            .history
            .iter()
            .map(|turn| Content {
                role: Some(match turn.role {
                    MessageRole::User => "user",
                    MessageRole::Assistant => "model",
                }),
                parts: vec![Part::text(turn.text.clone())],
            })
            .collect();
        contents.push(Content {
            role: Some("user"),
            parts: vec![Part::text(request.prompt.clone())],
        });

        let body = GenerateRequest {
            system_instruction: system_instruction(&request.system),
            contents,
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };
        self.generate(&self.model, &body).await
    }
}

#[async_trait]
impl VisionProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn complete_with_image(
        &self,
        system: &str,
        prompt: &str,
        image: &ImageInput,
    ) -> Result<String> {
        debug!(
            "Sending {} byte {} image to Gemini",
            image.data.len(),
            image.mime_type
        );
        let body = GenerateRequest {
            system_instruction: system_instruction(system),
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part::text(prompt), Part::image(image)],
            }],
            generation_config: GenerationConfig {
                temperature: VISION_TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };
        self.generate(&self.vision_model, &body).await
    }
}
