//! The single call site for the external AI service.

use std::sync::Arc;
use tracing::debug;

use crate::providers::{ChatMessage, CompletionConfig, LlmProvider, ProviderError, TokenUsage};

/// Text and token usage from one AI call. The text is untrusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
}

/// Sends one prompt as a single user message to the configured model.
///
/// No retries. Each call waits at most `config.timeout`.
#[derive(Clone)]
pub struct AiGateway {
    provider: Arc<dyn LlmProvider>,
    config: CompletionConfig,
}

impl AiGateway {
    pub fn new(provider: Arc<dyn LlmProvider>, config: CompletionConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn complete(&self, prompt: &str) -> Result<Completion, ProviderError> {
        let messages = vec![ChatMessage::user(prompt)];

        let response = tokio::time::timeout(
            self.config.timeout,
            self.provider.complete(messages, &self.config),
        )
        .await
        .map_err(|_| ProviderError::Timeout(self.config.timeout))??;

        debug!(
            provider = self.provider.name(),
            model = %response.model,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "AI call completed"
        );

        Ok(Completion {
            text: response.content,
            usage: response.usage,
        })
    }
}

impl std::fmt::Debug for AiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiGateway")
            .field("provider", &self.provider_name())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::CompletionResponse;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::time::Duration;

    struct RecordingProvider {
        seen: Mutex<Vec<(Vec<ChatMessage>, String)>>,
        delay: Duration,
    }

    #[async_trait]
    impl LlmProvider for RecordingProvider {
        async fn complete(
            &self,
            messages: Vec<ChatMessage>,
            config: &CompletionConfig,
        ) -> Result<CompletionResponse, ProviderError> {
            self.seen.lock().push((messages, config.model.clone()));
            tokio::time::sleep(self.delay).await;
            Ok(CompletionResponse {
                content: "{}".to_string(),
                usage: TokenUsage {
                    prompt_tokens: 3,
                    completion_tokens: 1,
                },
                model: config.model.clone(),
            })
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn provider(delay: Duration) -> Arc<RecordingProvider> {
        Arc::new(RecordingProvider {
            seen: Mutex::new(Vec::new()),
            delay,
        })
    }

    #[tokio::test]
    async fn test_single_user_message_with_configured_model() {
        let p = provider(Duration::ZERO);
        let config = CompletionConfig {
            model: "test/model".into(),
            ..CompletionConfig::default()
        };
        let gateway = AiGateway::new(p.clone(), config);
        assert_eq!(gateway.provider_name(), "recording");
        assert_eq!(gateway.config().model, "test/model");

        let completion = gateway.complete("Grade this").await.unwrap();
        assert_eq!(completion.text, "{}");
        assert_eq!(completion.usage.total(), 4);

        let seen = p.seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, vec![ChatMessage::user("Grade this")]);
        assert_eq!(seen[0].1, "test/model");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_times_out() {
        let gateway = AiGateway::new(
            provider(Duration::from_secs(60)),
            CompletionConfig {
                timeout: Duration::from_secs(45),
                ..CompletionConfig::default()
            },
        );

        let err = gateway.complete("Grade this").await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(d) if d == Duration::from_secs(45)));
    }
}
