//! Question-set parsing from JSON/YAML.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::schema::validate_question_set_schema;
use super::Question;
use crate::validator::strip_code_fence;

/// Errors that can occur when parsing question sets.
#[derive(Error, Debug)]
pub enum QuestionSetError {
    #[error("Failed to read question set: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Question set failed schema validation: {}", .0.join("; "))]
    SchemaViolation(Vec<String>),
}

/// An extracted question awaiting review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionDraft {
    pub question: String,

    /// Extraction may find no rubric for a question
    #[serde(default)]
    pub rubric: Option<String>,
}

impl QuestionDraft {
    pub fn new(question: impl Into<String>, rubric: Option<String>) -> Self {
        Self {
            question: question.into(),
            rubric,
        }
    }

    /// Promote to a saved question; a missing rubric becomes empty text.
    pub fn into_question(self, filename: impl Into<String>) -> Question {
        Question::new(filename, self.question, self.rubric.unwrap_or_default())
    }
}

/// An ordered list of question drafts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct QuestionSet {
    pub drafts: Vec<QuestionDraft>,
}

impl QuestionSet {
    pub fn new(drafts: Vec<QuestionDraft>) -> Self {
        Self { drafts }
    }

    /// Parse a question set from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, QuestionSetError> {
        let value: JsonValue = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse a question set from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, QuestionSetError> {
        let value: JsonValue = serde_yaml::from_str(yaml)?;
        Self::from_value(value)
    }

    /// Parse a question set from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, QuestionSetError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a question set from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, QuestionSetError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse a file, choosing YAML for `.yaml`/`.yml` and JSON otherwise.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, QuestionSetError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            _ => Self::from_json_file(path),
        }
    }

    /// Parse an AI extraction reply, tolerating a markdown code fence.
    pub fn from_ai_reply(reply: &str) -> Result<Self, QuestionSetError> {
        Self::from_json(strip_code_fence(reply))
    }

    fn from_value(value: JsonValue) -> Result<Self, QuestionSetError> {
        validate_question_set_schema(&value).map_err(QuestionSetError::SchemaViolation)?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// Promote every draft to a saved question under `filename`.
    pub fn into_questions(self, filename: &str) -> Vec<Question> {
        self.drafts
            .into_iter()
            .map(|d| d.into_question(filename))
            .collect()
    }
}
