//! Question and rubric extraction from document text.

use rubricate_core::{QuestionSet, QuestionSetError, ReviewSession};
use thiserror::Error;
use tracing::{info, warn};

use crate::gateway::AiGateway;
use crate::prompts::extraction_prompt;
use crate::providers::TokenUsage;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("AI reply is not a valid question set: {0}")]
    InvalidReply(#[from] QuestionSetError),
}

/// Drafts pulled from one document, plus what the call cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub drafts: QuestionSet,
    pub usage: TokenUsage,
}

impl Extraction {
    /// Open a review session over these drafts.
    pub fn into_session(self, filename: impl Into<String>) -> ReviewSession {
        ReviewSession::new(filename, self.drafts)
    }
}

pub struct QuestionExtractor {
    gateway: AiGateway,
}

impl QuestionExtractor {
    pub fn new(gateway: AiGateway) -> Self {
        Self { gateway }
    }

    /// Ask the AI for the questions and rubrics in `document_text`.
    ///
    /// A failed AI call yields an empty set. A reply that is not a
    /// schema-valid question set is an error.
    pub async fn extract(&self, document_text: &str) -> Result<Extraction, ExtractionError> {
        let prompt = extraction_prompt(document_text);

        let (reply, usage) = match self.gateway.complete(&prompt).await {
            Ok(completion) => {
                info!(
                    provider = self.gateway.provider_name(),
                    model = %self.gateway.config().model,
                    prompt_tokens = completion.usage.prompt_tokens,
                    completion_tokens = completion.usage.completion_tokens,
                    total_tokens = completion.usage.total(),
                    "extraction token usage"
                );
                (completion.text, completion.usage)
            }
            Err(e) => {
                warn!(error = %e, "AI extraction call failed, treating reply as empty");
                ("[]".to_string(), TokenUsage::default())
            }
        };

        let drafts = QuestionSet::from_ai_reply(&reply)?;
        info!(questions = drafts.len(), "extracted questions");

        Ok(Extraction { drafts, usage })
    }
}
