//! Persistence for saved questions and graded answers.
//!
//! Two record families: question batches keyed by source filename, and an
//! append-only audit trail of graded answers. Both are returned in insertion
//! order, which is the order answers are matched against questions.

mod memory;
mod schema;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use rubricate_core::{GradedRecord, Question};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt stored row: {0}")]
    Corrupt(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Storage backend for questions and grading history.
///
/// Calls are synchronous and short. Each `record_graded` is committed before
/// it returns.
pub trait GradeStore: Send + Sync {
    /// Questions saved under `filename`, in insertion order. Empty when none.
    fn questions_for(&self, filename: &str) -> Result<Vec<Question>, StoreError>;

    /// Save a batch atomically, returning how many rows were written.
    fn insert_questions(&self, questions: &[Question]) -> Result<usize, StoreError>;

    /// Append one graded answer.
    fn record_graded(&self, record: &GradedRecord) -> Result<(), StoreError>;

    /// Grading history for `filename`, oldest first.
    fn graded_for(&self, filename: &str) -> Result<Vec<GradedRecord>, StoreError>;
}
