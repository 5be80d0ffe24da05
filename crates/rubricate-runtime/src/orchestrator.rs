//! Grading orchestration.
//!
//! Answers are graded one at a time, in order, against the questions saved
//! under the request's filename. Each answer gets one AI call, one
//! validation pass, and one committed store write.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use rubricate_core::{
    validate_response, GradedRecord, GradedResult, GradingOutcome, GradingReport, GradingRequest,
    Question,
};

use crate::cache::RubricCache;
use crate::config::{ConfigError, RuntimeConfig};
use crate::fallback::TransportFallback;
use crate::gateway::AiGateway;
use crate::prompts::grading_prompt;
use crate::providers::LlmProvider;
use crate::storage::{GradeStore, StoreError};
use crate::usage::UsageTotals;

/// Errors that cross the grading-call boundary.
///
/// AI failures never appear here; they become recorded outcomes.
#[derive(Error, Debug)]
pub enum GradingError {
    #[error("Questions not found for this filename: {filename}")]
    NotFound { filename: String },

    #[error("Failed to persist grading data: {0}")]
    Store(#[from] StoreError),
}

/// Grades answer batches against stored questions.
pub struct GradingOrchestrator {
    gateway: AiGateway,
    store: Arc<dyn GradeStore>,
    rubrics: RubricCache,
    default_out_of: i64,
    on_transport_failure: TransportFallback,
}

impl GradingOrchestrator {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        store: Arc<dyn GradeStore>,
        config: &RuntimeConfig,
    ) -> Self {
        Self {
            gateway: AiGateway::new(provider, config.completion_config()),
            store,
            rubrics: config.rubric_cache(),
            default_out_of: config.default_out_of,
            on_transport_failure: config.on_transport_failure,
        }
    }

    pub fn builder() -> GradingOrchestratorBuilder {
        GradingOrchestratorBuilder::new()
    }

    /// Stored questions for `filename`, or `NotFound` when there are none.
    pub fn questions(&self, filename: &str) -> Result<Vec<Question>, GradingError> {
        let questions = self.store.questions_for(filename)?;
        if questions.is_empty() {
            return Err(GradingError::NotFound {
                filename: filename.to_string(),
            });
        }
        Ok(questions)
    }

    pub async fn grade_request(
        &self,
        request: &GradingRequest,
    ) -> Result<GradingReport, GradingError> {
        self.grade(&request.filename, &request.answers).await
    }

    /// Grade `answers[i]` against the `i`-th stored question for `filename`.
    ///
    /// Stops when either list runs out. Fails before any AI call when no
    /// questions are stored. A store failure aborts the batch; records
    /// already written stay written.
    pub async fn grade(
        &self,
        filename: &str,
        answers: &[String],
    ) -> Result<GradingReport, GradingError> {
        let questions = self.questions(filename)?;

        if questions.len() != answers.len() {
            debug!(
                filename,
                questions = questions.len(),
                answers = answers.len(),
                "question and answer counts differ, grading the overlap"
            );
        }

        let mut usage = UsageTotals::default();
        let mut results = Vec::with_capacity(questions.len().min(answers.len()));

        for (index, (question, answer)) in questions.iter().zip(answers).enumerate() {
            let scheme = self.rubrics.get_or_parse(&question.rubric).await;
            let out_of = scheme.out_of_or(self.default_out_of);
            let prompt =
                grading_prompt(&question.question_text, &question.rubric, answer, out_of);

            let outcome = match self.gateway.complete(&prompt).await {
                Ok(completion) => {
                    usage.add(&completion.usage);
                    validate_response(&completion.text, out_of)
                }
                Err(e) => match self.on_transport_failure {
                    TransportFallback::Record => {
                        warn!(filename, index, error = %e, "AI call failed, recording zero score");
                        GradingOutcome::unreachable(out_of, &e)
                    }
                    TransportFallback::Skip => {
                        warn!(filename, index, error = %e, "AI call failed, skipping answer");
                        continue;
                    }
                },
            };

            if !outcome.is_graded() {
                info!(filename, index, kind = ?outcome.kind, "recorded default outcome");
            }

            let result = GradedResult::new(&question.question_text, answer.as_str(), &outcome);
            self.store
                .record_graded(&GradedRecord::from_result(filename, &result))?;
            results.push(result);
        }

        info!(
            filename,
            provider = self.gateway.provider_name(),
            model = %self.gateway.config().model,
            graded = results.len(),
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens(),
            "grading complete"
        );

        Ok(GradingReport {
            results,
            total_prompt_tokens: usage.prompt_tokens,
            total_completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens(),
        })
    }
}

/// Builder for [`GradingOrchestrator`].
pub struct GradingOrchestratorBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    store: Option<Arc<dyn GradeStore>>,
    config: RuntimeConfig,
    rubrics: Option<RubricCache>,
}

impl GradingOrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            store: None,
            config: RuntimeConfig::default(),
            rubrics: None,
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn store(mut self, store: Arc<dyn GradeStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Share a rubric cache across orchestrators.
    pub fn rubric_cache(mut self, cache: RubricCache) -> Self {
        self.rubrics = Some(cache);
        self
    }

    pub fn build(self) -> Result<GradingOrchestrator, ConfigError> {
        let provider = self
            .provider
            .ok_or_else(|| ConfigError::Invalid("no AI provider set".to_string()))?;
        let store = self
            .store
            .ok_or_else(|| ConfigError::Invalid("no grade store set".to_string()))?;
        self.config.validate()?;

        let mut orchestrator = GradingOrchestrator::new(provider, store, &self.config);
        if let Some(cache) = self.rubrics {
            orchestrator.rubrics = cache;
        }
        Ok(orchestrator)
    }
}

impl Default for GradingOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GradingOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GradingOrchestrator")
            .field("gateway", &self.gateway)
            .field("default_out_of", &self.default_out_of)
            .field("on_transport_failure", &self.on_transport_failure)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderError;
    use crate::storage::MemoryStore;
    use crate::testing::ScriptedProvider;
    use rubricate_core::validator::UNEXPECTED_RESPONSE_FEEDBACK;

    const GOOD: &str = r#"{"score": 7, "out_of": 10, "feedback": "Solid but missing depth"}"#;

    fn store(n: usize) -> Arc<MemoryStore> {
        let questions = (0..n)
            .map(|i| {
                Question::new(
                    "exam.pdf",
                    format!("Question {}", i + 1),
                    "Accuracy (5 pts) Depth (5 pts)",
                )
            })
            .collect();
        Arc::new(MemoryStore::with_questions(questions))
    }

    fn answers(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Answer {}", i + 1)).collect()
    }

    fn orchestrator(
        provider: &Arc<ScriptedProvider>,
        store: &Arc<MemoryStore>,
        config: RuntimeConfig,
    ) -> GradingOrchestrator {
        GradingOrchestrator::builder()
            .provider(provider.clone())
            .store(store.clone())
            .config(config)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_more_questions_than_answers() {
        let provider = Arc::new(ScriptedProvider::new().reply(GOOD, 1, 1).reply(GOOD, 1, 1));
        let store = store(3);
        let o = orchestrator(&provider, &store, RuntimeConfig::default());

        let report = o.grade("exam.pdf", &answers(2)).await.unwrap();

        assert_eq!(report.results.len(), 2);
        assert_eq!(provider.calls(), 2);
        assert_eq!(store.graded().len(), 2);
        assert_eq!(report.results[1].question, "Question 2");
        assert_eq!(report.results[1].student_answer, "Answer 2");
    }

    #[tokio::test]
    async fn test_more_answers_than_questions() {
        let provider = Arc::new(ScriptedProvider::new().reply(GOOD, 1, 1).reply(GOOD, 1, 1));
        let store = store(2);
        let o = orchestrator(&provider, &store, RuntimeConfig::default());

        let report = o.grade("exam.pdf", &answers(4)).await.unwrap();

        assert_eq!(report.results.len(), 2);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_filename_touches_nothing() {
        let provider = Arc::new(ScriptedProvider::new().reply(GOOD, 1, 1));
        let store = store(2);
        let o = orchestrator(&provider, &store, RuntimeConfig::default());

        let err = o.grade("missing.pdf", &answers(2)).await.unwrap_err();

        assert!(matches!(
            err,
            GradingError::NotFound { ref filename } if filename == "missing.pdf"
        ));
        assert_eq!(provider.calls(), 0);
        assert!(store.graded().is_empty());
    }

    #[tokio::test]
    async fn test_token_totals() {
        let provider = Arc::new(ScriptedProvider::new().reply(GOOD, 10, 5).reply(GOOD, 8, 4));
        let store = store(2);
        let o = orchestrator(&provider, &store, RuntimeConfig::default());

        let report = o.grade("exam.pdf", &answers(2)).await.unwrap();

        assert_eq!(report.total_prompt_tokens, 18);
        assert_eq!(report.total_completion_tokens, 9);
        assert_eq!(report.total_tokens, 27);
    }

    #[tokio::test]
    async fn test_prompt_carries_rubric_total() {
        let provider = Arc::new(ScriptedProvider::new().reply(GOOD, 1, 1));
        let store = Arc::new(MemoryStore::with_questions(vec![Question::new(
            "exam.pdf",
            "Explain X",
            "Accuracy (3 pts) Clarity (4 pts)",
        )]));
        let o = orchestrator(&provider, &store, RuntimeConfig::default());

        o.grade("exam.pdf", &answers(1)).await.unwrap();

        let prompt = &provider.prompts()[0];
        assert!(prompt.contains("Question: Explain X"));
        assert!(prompt.contains("Rubric: Accuracy (3 pts) Clarity (4 pts)"));
        assert!(prompt.contains("Student Answer: Answer 1"));
        assert!(prompt.contains("\"out_of\": 7"));
    }

    #[tokio::test]
    async fn test_unstructured_rubric_uses_default_out_of() {
        let provider = Arc::new(ScriptedProvider::new().reply(r#"{"score": 3}"#, 1, 1));
        let store = Arc::new(MemoryStore::with_questions(vec![Question::new(
            "exam.pdf",
            "Explain X",
            "be thorough",
        )]));
        let config = RuntimeConfig {
            default_out_of: 20,
            ..RuntimeConfig::default()
        };
        let o = orchestrator(&provider, &store, config);

        let report = o.grade("exam.pdf", &answers(1)).await.unwrap();

        assert_eq!(report.results[0].score, 0);
        assert_eq!(report.results[0].out_of, 20);
        assert_eq!(report.results[0].feedback, UNEXPECTED_RESPONSE_FEEDBACK);
        assert!(provider.prompts()[0].contains("\"out_of\": 20"));
    }

    #[tokio::test]
    async fn test_non_json_reply_recorded() {
        let provider = Arc::new(ScriptedProvider::new().reply("I think this deserves a 7.", 4, 2));
        let store = store(1);
        let o = orchestrator(&provider, &store, RuntimeConfig::default());

        let report = o.grade("exam.pdf", &answers(1)).await.unwrap();

        assert!(report.results[0].feedback.starts_with("Error parsing AI response: "));
        assert_eq!(store.graded()[0].feedback, report.results[0].feedback);
        assert_eq!(report.total_tokens, 6);
    }

    #[tokio::test]
    async fn test_transport_failure_recorded_by_default() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .fail(ProviderError::ApiError {
                    status: 503,
                    message: "upstream overloaded".into(),
                })
                .reply(GOOD, 10, 5),
        );
        let store = store(2);
        let o = orchestrator(&provider, &store, RuntimeConfig::default());

        let report = o.grade("exam.pdf", &answers(2)).await.unwrap();

        assert_eq!(report.results.len(), 2);
        let first = &report.results[0];
        assert_eq!(first.score, 0);
        assert_eq!(first.out_of, 10);
        assert!(first.feedback.starts_with("AI service unreachable: "));
        assert!(first.feedback.contains("upstream overloaded"));
        assert_eq!(report.results[1].score, 7);
        assert_eq!(store.graded().len(), 2);
        assert_eq!(report.total_tokens, 15);
    }

    #[tokio::test]
    async fn test_transport_failure_skipped_when_configured() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .fail(ProviderError::HttpError("connection reset".into()))
                .reply(GOOD, 1, 1),
        );
        let store = store(2);
        let config = RuntimeConfig {
            on_transport_failure: TransportFallback::Skip,
            ..RuntimeConfig::default()
        };
        let o = orchestrator(&provider, &store, config);

        let report = o.grade("exam.pdf", &answers(2)).await.unwrap();

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].question, "Question 2");
        assert_eq!(store.graded().len(), 1);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_store_failure_aborts_after_earlier_writes() {
        struct FailSecondWrite {
            inner: MemoryStore,
        }

        impl GradeStore for FailSecondWrite {
            fn questions_for(&self, filename: &str) -> Result<Vec<Question>, StoreError> {
                self.inner.questions_for(filename)
            }
            fn insert_questions(&self, questions: &[Question]) -> Result<usize, StoreError> {
                self.inner.insert_questions(questions)
            }
            fn record_graded(&self, record: &GradedRecord) -> Result<(), StoreError> {
                if !self.inner.graded().is_empty() {
                    return Err(StoreError::Unavailable("disk full".into()));
                }
                self.inner.record_graded(record)
            }
            fn graded_for(&self, filename: &str) -> Result<Vec<GradedRecord>, StoreError> {
                self.inner.graded_for(filename)
            }
        }

        let provider = Arc::new(
            ScriptedProvider::new()
                .reply(GOOD, 1, 1)
                .reply(GOOD, 1, 1)
                .reply(GOOD, 1, 1),
        );
        let store = Arc::new(FailSecondWrite {
            inner: MemoryStore::with_questions(vec![
                Question::new("exam.pdf", "Q1", ""),
                Question::new("exam.pdf", "Q2", ""),
                Question::new("exam.pdf", "Q3", ""),
            ]),
        });
        let o = GradingOrchestrator::builder()
            .provider(provider.clone())
            .store(store.clone())
            .build()
            .unwrap();

        let err = o.grade("exam.pdf", &answers(3)).await.unwrap_err();

        assert!(matches!(err, GradingError::Store(StoreError::Unavailable(_))));
        assert_eq!(store.inner.graded().len(), 1);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_questions_lookup() {
        let provider = Arc::new(ScriptedProvider::new());
        let store = store(2);
        let o = orchestrator(&provider, &store, RuntimeConfig::default());

        assert_eq!(o.questions("exam.pdf").unwrap().len(), 2);
        assert!(matches!(o.questions("nope.pdf"), Err(GradingError::NotFound { .. })));
    }

    #[test]
    fn test_builder_requires_provider_and_store() {
        assert!(GradingOrchestrator::builder().build().is_err());
        assert!(GradingOrchestrator::builder()
            .provider(Arc::new(ScriptedProvider::new()))
            .build()
            .is_err());
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let config = RuntimeConfig {
            default_out_of: 0,
            ..RuntimeConfig::default()
        };
        let result = GradingOrchestrator::builder()
            .provider(Arc::new(ScriptedProvider::new()))
            .store(Arc::new(MemoryStore::new()))
            .config(config)
            .build();
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
