use parking_lot::Mutex;
use rubricate_core::{GradedRecord, Question};

use super::{GradeStore, StoreError};

/// In-process store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    questions: Mutex<Vec<Question>>,
    graded: Mutex<Vec<GradedRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_questions(questions: Vec<Question>) -> Self {
        Self {
            questions: Mutex::new(questions),
            graded: Mutex::new(Vec::new()),
        }
    }

    /// Every graded record across all filenames.
    pub fn graded(&self) -> Vec<GradedRecord> {
        self.graded.lock().clone()
    }
}

impl GradeStore for MemoryStore {
    fn questions_for(&self, filename: &str) -> Result<Vec<Question>, StoreError> {
        Ok(self
            .questions
            .lock()
            .iter()
            .filter(|q| q.filename == filename)
            .cloned()
            .collect())
    }

    fn insert_questions(&self, questions: &[Question]) -> Result<usize, StoreError> {
        self.questions.lock().extend_from_slice(questions);
        Ok(questions.len())
    }

    fn record_graded(&self, record: &GradedRecord) -> Result<(), StoreError> {
        self.graded.lock().push(record.clone());
        Ok(())
    }

    fn graded_for(&self, filename: &str) -> Result<Vec<GradedRecord>, StoreError> {
        Ok(self
            .graded
            .lock()
            .iter()
            .filter(|r| r.filename == filename)
            .cloned()
            .collect())
    }
}
