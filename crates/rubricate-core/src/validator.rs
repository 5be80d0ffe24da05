//! Grading-response validation.
//!
//! AI replies are untrusted. A reply either carries a well-typed
//! `{score, out_of, feedback}` object, or it is downgraded to a recorded
//! zero-score outcome with a diagnostic. We never "best-effort" repair a
//! malformed reply.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Feedback recorded when a reply parses but lacks the required fields.
pub const UNEXPECTED_RESPONSE_FEEDBACK: &str =
    "Unable to grade answer due to unexpected AI response.";

/// Prefix of the feedback recorded when a reply is not valid JSON.
pub const PARSE_ERROR_PREFIX: &str = "Error parsing AI response: ";

/// Prefix of the feedback recorded when the AI service could not be reached.
pub const UNREACHABLE_PREFIX: &str = "AI service unreachable: ";

/// How a grading outcome was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// The AI returned a complete, well-typed grade
    Graded,

    /// The reply parsed but required fields were missing or mistyped
    UnexpectedResponse,

    /// The reply was not valid JSON
    UnparseableResponse,

    /// The AI call itself failed
    ServiceUnreachable,
}

/// Score, denominator, and feedback for one graded answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingOutcome {
    pub score: i64,
    pub out_of: i64,
    pub feedback: String,

    /// Not part of the caller-facing result
    #[serde(skip, default = "default_kind")]
    pub kind: OutcomeKind,
}

fn default_kind() -> OutcomeKind {
    OutcomeKind::Graded
}

impl GradingOutcome {
    /// Default outcome for a reply missing required fields.
    pub fn unexpected(fallback_out_of: i64) -> Self {
        Self {
            score: 0,
            out_of: fallback_out_of,
            feedback: UNEXPECTED_RESPONSE_FEEDBACK.to_string(),
            kind: OutcomeKind::UnexpectedResponse,
        }
    }

    /// Default outcome for a reply that is not valid JSON.
    pub fn unparseable(fallback_out_of: i64, detail: impl std::fmt::Display) -> Self {
        Self {
            score: 0,
            out_of: fallback_out_of,
            feedback: format!("{}{}", PARSE_ERROR_PREFIX, detail),
            kind: OutcomeKind::UnparseableResponse,
        }
    }

    /// Default outcome when the AI service could not be reached.
    pub fn unreachable(fallback_out_of: i64, detail: impl std::fmt::Display) -> Self {
        Self {
            score: 0,
            out_of: fallback_out_of,
            feedback: format!("{}{}", UNREACHABLE_PREFIX, detail),
            kind: OutcomeKind::ServiceUnreachable,
        }
    }

    /// True when the score came from the AI rather than a fallback.
    pub fn is_graded(&self) -> bool {
        self.kind == OutcomeKind::Graded
    }
}

/// Remove a surrounding markdown code fence, if any.
///
/// Handles ```` ``` ```` and ```` ```json ```` (any info string on the
/// opening line). Text without a fence is returned trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();

    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };

    // Drop the info string ("json", "JSON", ...) up to the first newline
    let body = match rest.find('\n') {
        Some(idx) if rest[..idx].chars().all(|c| c.is_ascii_alphanumeric()) => &rest[idx + 1..],
        _ => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Validate raw AI text as a grading outcome.
///
/// Never fails: malformed or incomplete replies produce a zero score over
/// `fallback_out_of` with a diagnostic feedback string.
pub fn validate_response(raw: &str, fallback_out_of: i64) -> GradingOutcome {
    let body = strip_code_fence(raw);

    let value: JsonValue = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(error = %e, "AI reply is not valid JSON");
            return GradingOutcome::unparseable(fallback_out_of, e);
        }
    };

    let score = value.get("score").and_then(JsonValue::as_i64);
    let out_of = value.get("out_of").and_then(JsonValue::as_i64);
    let feedback = value.get("feedback").and_then(JsonValue::as_str);

    match (score, out_of, feedback) {
        (Some(score), Some(out_of), Some(feedback)) => GradingOutcome {
            score,
            out_of,
            feedback: feedback.to_string(),
            kind: OutcomeKind::Graded,
        },
        _ => {
            tracing::debug!(
                has_score = score.is_some(),
                has_out_of = out_of.is_some(),
                has_feedback = feedback.is_some(),
                "AI reply missing required grading fields"
            );
            GradingOutcome::unexpected(fallback_out_of)
        }
    }
}
