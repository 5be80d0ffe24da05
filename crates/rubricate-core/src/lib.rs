//! # rubricate-core
//!
//! Deterministic building blocks for rubric-aware grading.
//!
//! This crate never talks to the network. It answers:
//! - What point scheme does this rubric text describe?
//! - Is this AI reply a usable grade, and if not, what do we record instead?
//! - What does a reviewer's edited question set look like once saved?
//!
//! ## Key Guarantees
//!
//! 1. **Total**: [`parse_rubric`] and [`validate_response`] never fail
//! 2. **Deterministic**: same input always produces same output
//! 3. **No LLM calls**: the AI service lives in `rubricate-runtime`
//!
//! ## Example
//!
//! ```rust
//! use rubricate_core::{parse_rubric, validate_response};
//!
//! let scheme = parse_rubric("Accuracy (5 pts) Depth (5 pts)");
//! assert_eq!(scheme.total_points, 10);
//!
//! let outcome = validate_response(
//!     r#"{"score": 7, "out_of": 10, "feedback": "Solid"}"#,
//!     scheme.total_points,
//! );
//! assert_eq!(outcome.score, 7);
//! ```

pub mod question;
pub mod review;
pub mod rubric;
pub mod types;
pub mod validator;

// Re-export main types at crate root
pub use question::{Question, QuestionDraft, QuestionSet, QuestionSetError};
pub use review::{ReviewError, ReviewSession};
pub use rubric::{parse_rubric, RubricLevel, RubricScheme};
pub use types::{ErrorBody, GradedRecord, GradedResult, GradingReport, GradingRequest};
pub use validator::{strip_code_fence, validate_response, GradingOutcome, OutcomeKind};

/// Point total used when a rubric carries no `(N pts)` markers.
pub const DEFAULT_OUT_OF: i64 = 10;
