//! Scripted provider for unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError, TokenUsage,
};

/// Replies with queued results in order and remembers every prompt.
pub(crate) struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<CompletionResponse, ProviderError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub(crate) fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn reply(self, content: &str, prompt_tokens: u32, completion_tokens: u32) -> Self {
        self.replies.lock().push_back(Ok(CompletionResponse {
            content: content.to_string(),
            usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
            },
            model: "scripted".to_string(),
        }));
        self
    }

    pub(crate) fn fail(self, error: ProviderError) -> Self {
        self.replies.lock().push_back(Err(error));
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.prompts.lock().len()
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        _config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let prompt = messages
            .into_iter()
            .map(|m| m.content)
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().push(prompt);

        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::HttpError("no scripted reply left".to_string())))
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
