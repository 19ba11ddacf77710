//! Ordered provider fallback: first non-empty completion wins.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::time::timeout;

use crate::error::{BotError, Result};
use crate::types::{ProviderResponse, Turn};

use super::{CompletionProvider, CompletionRequest};

/// Whether a strategy sees the channel's conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seeding {
    /// Prompt only.
    Stateless,
    /// Prompt seeded with the bounded channel history.
    Session,
}

struct Strategy {
    provider: Arc<dyn CompletionProvider>,
    seeding: Seeding,
}

/// Providers tried in insertion order, one attempt each, no backoff.
pub struct ProviderChain {
    strategies: Vec<Strategy>,
    attempt_timeout: Duration,
}

impl ProviderChain {
    #[must_use]
    pub fn new(attempt_timeout: Duration) -> Self {
        Self {
            strategies: Vec::new(),
            attempt_timeout,
        }
    }

    #[must_use]
    pub fn with(mut self, provider: Arc<dyn CompletionProvider>, seeding: Seeding) -> Self {
        self.strategies.push(Strategy { provider, seeding });
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    #[must_use]
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.provider.name()).collect()
    }

    /// Walks the chain until a provider returns non-blank text. Errors,
    /// timeouts and blank answers are logged and skipped. `None` means the
    /// whole chain came up empty.
    pub async fn complete(
        &self,
        system: &str,
        prompt: &str,
        history: &[Turn],
    ) -> Option<ProviderResponse> {
        for strategy in &self.strategies {
            let name = strategy.provider.name();
            let request = match strategy.seeding {
                Seeding::Stateless => CompletionRequest::new(system, prompt),
                Seeding::Session => {
                    CompletionRequest::new(system, prompt).with_history(history.to_vec())
                }
            };

            match self.attempt(strategy.provider.as_ref(), &request).await {
                Ok(text) if !text.trim().is_empty() => {
                    info!("Completion served by {name}");
                    return Some(ProviderResponse {
                        text: text.trim().to_string(),
                        provider: name,
                    });
                }
                Ok(_) => warn!("{name} returned an empty completion, falling through"),
                Err(e) => warn!("{name} failed, falling through: {e}"),
            }
        }
        debug!("Provider chain exhausted");
        None
    }

    async fn attempt(
        &self,
        provider: &dyn CompletionProvider,
        request: &CompletionRequest,
    ) -> Result<String> {
        timeout(self.attempt_timeout, provider.complete(request))
            .await
            .map_err(|_| BotError::ProviderTimeout {
                provider: provider.name(),
                seconds: self.attempt_timeout.as_secs(),
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn first_success_short_circuits() {
        let a = ScriptedProvider::replying("a", "from a");
        let b = ScriptedProvider::replying("b", "from b");
        let chain = ProviderChain::new(TIMEOUT)
            .with(a.clone(), Seeding::Stateless)
            .with(b.clone(), Seeding::Stateless);

        let response = chain.complete("sys", "hi", &[]).await;
        assert_eq!(
            response,
            Some(ProviderResponse {
                text: "from a".to_string(),
                provider: "a",
            })
        );
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 0);
    }

    #[tokio::test]
    async fn errors_and_blank_answers_fall_through() {
        let a = ScriptedProvider::failing("a");
        let b = ScriptedProvider::replying("b", "   ");
        let c = ScriptedProvider::replying("c", "  from c\n");
        let chain = ProviderChain::new(TIMEOUT)
            .with(a.clone(), Seeding::Stateless)
            .with(b.clone(), Seeding::Stateless)
            .with(c.clone(), Seeding::Session);

        let response = chain.complete("sys", "hi", &[]).await;
        assert_eq!(response.map(|r| (r.provider, r.text)), Some(("c", "from c".to_string())));
        assert_eq!((a.calls(), b.calls(), c.calls()), (1, 1, 1));
    }

    #[tokio::test]
    async fn only_session_strategies_see_history() {
        let stateless = ScriptedProvider::replying("a", "");
        let session = ScriptedProvider::replying("c", "ok");
        let chain = ProviderChain::new(TIMEOUT)
            .with(stateless.clone(), Seeding::Stateless)
            .with(session.clone(), Seeding::Session);

        let history = vec![Turn::user("earlier"), Turn::assistant("answer")];
        chain.complete("sys", "hi", &history).await;

        assert_eq!(stateless.last_history_len(), Some(0));
        assert_eq!(session.last_history_len(), Some(2));
    }

    #[tokio::test]
    async fn exhausted_chain_returns_none() {
        let chain = ProviderChain::new(TIMEOUT)
            .with(ScriptedProvider::failing("a"), Seeding::Stateless)
            .with(ScriptedProvider::failing("b"), Seeding::Session);
        assert!(chain.complete("sys", "hi", &[]).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out_and_falls_through() {
        let slow = ScriptedProvider::hanging("slow");
        let fast = ScriptedProvider::replying("fast", "done");
        let chain = ProviderChain::new(Duration::from_millis(50))
            .with(slow, Seeding::Stateless)
            .with(fast, Seeding::Stateless);

        let response = chain.complete("sys", "hi", &[]).await;
        assert_eq!(response.map(|r| r.provider), Some("fast"));
    }
}
