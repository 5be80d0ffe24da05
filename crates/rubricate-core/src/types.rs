//! Request, result, and record types shared by the grading pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validator::GradingOutcome;

/// A batch of student answers for one source document.
///
/// Answer `i` is graded against the `i`-th stored question for `filename`,
/// by position. Surplus answers or surplus questions are skipped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GradingRequest {
    /// Lookup key for the stored question batch
    pub filename: String,

    /// Answers in question order
    pub answers: Vec<String>,
}

/// One graded answer as returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GradedResult {
    pub question: String,
    pub student_answer: String,
    pub score: i64,
    pub out_of: i64,
    pub feedback: String,
}

impl GradedResult {
    /// Combine a question/answer pair with its outcome.
    pub fn new(
        question: impl Into<String>,
        student_answer: impl Into<String>,
        outcome: &GradingOutcome,
    ) -> Self {
        Self {
            question: question.into(),
            student_answer: student_answer.into(),
            score: outcome.score,
            out_of: outcome.out_of,
            feedback: outcome.feedback.clone(),
        }
    }
}

/// A persisted graded answer. Append-only.
///
/// `filename` and `question_text` form a weak back-reference to the stored
/// question, not a foreign key: reusing a filename for a different document
/// makes its history indistinguishable from the earlier batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GradedRecord {
    pub filename: String,
    pub question_text: String,
    pub student_answer: String,
    pub score: i64,
    pub out_of: i64,
    pub feedback: String,
    pub graded_at: DateTime<Utc>,
}

impl GradedRecord {
    /// Build the stored form of a result, stamped with the current time.
    pub fn from_result(filename: impl Into<String>, result: &GradedResult) -> Self {
        Self {
            filename: filename.into(),
            question_text: result.question.clone(),
            student_answer: result.student_answer.clone(),
            score: result.score,
            out_of: result.out_of,
            feedback: result.feedback.clone(),
            graded_at: Utc::now(),
        }
    }

    /// The caller-facing view of this record.
    pub fn to_result(&self) -> GradedResult {
        GradedResult {
            question: self.question_text.clone(),
            student_answer: self.student_answer.clone(),
            score: self.score,
            out_of: self.out_of,
            feedback: self.feedback.clone(),
        }
    }
}

/// Response body of a grading call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GradingReport {
    pub results: Vec<GradedResult>,
    pub total_prompt_tokens: u64,
    pub total_completion_tokens: u64,
    pub total_tokens: u64,
}

impl GradingReport {
    /// Sum of scores across all results.
    pub fn total_score(&self) -> i64 {
        self.results.iter().map(|r| r.score).sum()
    }

    /// Sum of denominators across all results.
    pub fn total_out_of(&self) -> i64 {
        self.results.iter().map(|r| r.out_of).sum()
    }
}

/// Error body returned in place of a report, e.g. for an unknown filename.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl std::fmt::Display) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::validate_response;

    #[test]
    fn test_report_totals() {
        let report = GradingReport {
            results: vec![
                GradedResult {
                    question: "Q1".into(),
                    student_answer: "A1".into(),
                    score: 7,
                    out_of: 10,
                    feedback: "ok".into(),
                },
                GradedResult {
                    question: "Q2".into(),
                    student_answer: "A2".into(),
                    score: 3,
                    out_of: 5,
                    feedback: "meh".into(),
                },
            ],
            ..Default::default()
        };
        assert_eq!(report.total_score(), 10);
        assert_eq!(report.total_out_of(), 15);
    }

    #[test]
    fn test_record_round_trips_result() {
        let outcome = validate_response(r#"{"score":7,"out_of":10,"feedback":"Solid"}"#, 10);
        let result = GradedResult::new("Explain X", "X is...", &outcome);
        let record = GradedRecord::from_result("exam.pdf", &result);

        assert_eq!(record.filename, "exam.pdf");
        assert_eq!(record.to_result(), result);
    }

    #[test]
    fn test_report_wire_shape() {
        let json = serde_json::to_value(GradingReport::default()).unwrap();
        assert!(json["results"].is_array());
        assert_eq!(json["total_prompt_tokens"], 0);
        assert_eq!(json["total_completion_tokens"], 0);
        assert_eq!(json["total_tokens"], 0);
    }

    #[test]
    fn test_request_from_json() {
        let req: GradingRequest =
            serde_json::from_str(r#"{"filename":"exam.pdf","answers":["a","b"]}"#).unwrap();
        assert_eq!(req.answers.len(), 2);
    }
}
