//! # rubricate-runtime
//!
//! AI-assisted question extraction and rubric-aware grading.
//!
//! `rubricate-core` decides what a rubric is worth and whether an AI reply is
//! a usable grade. This crate does everything that needs the outside world:
//! calling the AI service, persisting questions and grades, and walking an
//! answer batch through the pipeline.
//!
//! ## Failure model
//!
//! Only two things stop a grading call: an unknown filename
//! ([`GradingError::NotFound`]) and a failing store
//! ([`GradingError::Store`]). An unreachable AI service or a nonsense reply
//! becomes a recorded zero-score outcome instead.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rubricate_runtime::{
//!     GradingOrchestrator, ProviderRegistry, RuntimeConfig, SqliteStore,
//! };
//!
//! let config = RuntimeConfig::from_yaml_file("rubricate.yaml")?;
//! let provider = config.create_provider(&ProviderRegistry::with_defaults())?;
//! let store = Arc::new(SqliteStore::open("grades.db".as_ref())?);
//!
//! let orchestrator = GradingOrchestrator::builder()
//!     .provider(provider)
//!     .store(store)
//!     .config(config)
//!     .build()?;
//!
//! let report = orchestrator
//!     .grade("exam.pdf", &["Entropy measures disorder.".to_string()])
//!     .await?;
//! ```

pub mod cache;
pub mod config;
pub mod extractor;
pub mod fallback;
pub mod gateway;
pub mod orchestrator;
pub mod prompts;
pub mod providers;
pub mod storage;
pub mod usage;

#[cfg(test)]
mod testing;

pub use cache::RubricCache;
pub use config::{ConfigError, RubricCacheConfig, RuntimeConfig};
pub use extractor::{Extraction, ExtractionError, QuestionExtractor};
pub use fallback::TransportFallback;
pub use gateway::{AiGateway, Completion};
pub use orchestrator::{GradingError, GradingOrchestrator, GradingOrchestratorBuilder};
pub use providers::{
    CompletionConfig, LlmProvider, ProviderError, ProviderRegistry, TokenUsage,
};
pub use storage::{GradeStore, MemoryStore, SqliteStore, StoreError};
pub use usage::UsageTotals;
