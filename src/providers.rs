//! AI completion providers and the ordered fallback chain.

mod chain;
mod gemini;
mod openai_compat;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ImageInput, Turn};

pub use chain::{ProviderChain, Seeding};
pub use gemini::GeminiProvider;
pub use openai_compat::OpenAiCompatProvider;

const DEFAULT_TEMPERATURE: f32 = 0.9;

/// Input for a single text completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    /// Prior turns, oldest first. Empty for stateless attempts.
    pub history: Vec<Turn>,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            history: Vec::new(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    #[must_use]
    pub fn with_history(mut self, history: Vec<Turn>) -> Self {
        self.history = history;
        self
    }
}

/// Text completion capability.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Vision capability: a prompt plus one image.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn complete_with_image(
        &self,
        system: &str,
        prompt: &str,
        image: &ImageInput,
    ) -> Result<String>;
}
