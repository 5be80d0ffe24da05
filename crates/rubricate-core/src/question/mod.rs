//! Questions, drafts, and question-set documents.
//!
//! A question set is what the extractor produces and what a reviewer saves:
//! a list of `{question, rubric}` items validated against
//! `schema/question_set.schema.json`.

mod parser;
mod schema;

pub use parser::{QuestionDraft, QuestionSet, QuestionSetError};
pub use schema::validate_question_set_schema;

use serde::{Deserialize, Serialize};

use crate::rubric::{parse_rubric, RubricScheme};

/// A saved question with its rubric.
///
/// `filename` ties the question to the batch extracted from one source
/// document. It is a lookup key, not an identity: two uploads with the same
/// name share one batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    pub filename: String,
    pub question_text: String,
    pub rubric: String,

    /// Derived from `rubric`; never persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_rubric: Option<RubricScheme>,
}

impl Question {
    /// Create a question with an unparsed rubric.
    pub fn new(
        filename: impl Into<String>,
        question_text: impl Into<String>,
        rubric: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            question_text: question_text.into(),
            rubric: rubric.into(),
            parsed_rubric: None,
        }
    }

    /// Attach the parsed rubric so later reads skip the regex pass.
    pub fn with_parsed_rubric(mut self) -> Self {
        self.parsed_rubric = Some(parse_rubric(&self.rubric));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attached_rubric_matches_parser() {
        let q = Question::new("exam.pdf", "Explain X", "Accuracy (5 pts) Depth (5 pts)");
        let attached = q.clone().with_parsed_rubric();

        assert!(q.parsed_rubric.is_none());
        let scheme = attached.parsed_rubric.unwrap();
        assert_eq!(scheme, parse_rubric(&q.rubric));
        assert_eq!(scheme.total_points, 10);
    }

    #[test]
    fn test_parsed_rubric_not_serialized_when_absent() {
        let q = Question::new("exam.pdf", "Explain X", "");
        let json = serde_json::to_value(&q).unwrap();
        assert!(json.get("parsed_rubric").is_none());
    }
}
