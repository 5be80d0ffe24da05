//! Reviewer edit sessions.
//!
//! Between extraction and save, a reviewer corrects question text and
//! rubrics. The in-progress buffer is an explicit value the caller owns and
//! passes between steps (the CLI keeps it in a JSON file), never ambient
//! global state.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::question::{Question, QuestionDraft, QuestionSet};

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("No draft at index {index} (session has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Failed to read or write session: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid session file: {0}")]
    Json(#[from] serde_json::Error),
}

/// The reviewer's working copy of one document's extracted questions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewSession {
    /// Source document name; becomes the lookup key on save
    pub filename: String,

    drafts: Vec<QuestionDraft>,
}

impl ReviewSession {
    pub fn new(filename: impl Into<String>, set: QuestionSet) -> Self {
        Self {
            filename: filename.into(),
            drafts: set.drafts,
        }
    }

    pub fn drafts(&self) -> &[QuestionDraft] {
        &self.drafts
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    pub fn edit_question(
        &mut self,
        index: usize,
        text: impl Into<String>,
    ) -> Result<(), ReviewError> {
        self.draft_mut(index)?.question = text.into();
        Ok(())
    }

    pub fn edit_rubric(
        &mut self,
        index: usize,
        text: impl Into<String>,
    ) -> Result<(), ReviewError> {
        self.draft_mut(index)?.rubric = Some(text.into());
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<QuestionDraft, ReviewError> {
        self.check(index)?;
        Ok(self.drafts.remove(index))
    }

    pub fn push(&mut self, draft: QuestionDraft) {
        self.drafts.push(draft);
    }

    /// Finish the review, producing the questions to persist.
    pub fn into_questions(self) -> Vec<Question> {
        QuestionSet::new(self.drafts).into_questions(&self.filename)
    }

    /// Load a session previously written with [`ReviewSession::save_to`].
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ReviewError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ReviewError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn check(&self, index: usize) -> Result<(), ReviewError> {
        if index >= self.drafts.len() {
            return Err(ReviewError::IndexOutOfRange {
                index,
                len: self.drafts.len(),
            });
        }
        Ok(())
    }

    fn draft_mut(&mut self, index: usize) -> Result<&mut QuestionDraft, ReviewError> {
        self.check(index)?;
        Ok(&mut self.drafts[index])
    }
}
