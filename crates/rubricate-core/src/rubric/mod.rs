//! Rubric point schemes.
//!
//! Rubrics arrive as free text written by whoever authored the source
//! document. The only structure we rely on is the `<word> (<N> pts)`
//! convention; everything else in the text is carried to the grader verbatim.

mod parser;

pub use parser::{parse_rubric, RUBRIC_LEVEL_PATTERN};

use serde::{Deserialize, Serialize};

/// One scored level of a rubric, e.g. `Accuracy (3 pts)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RubricLevel {
    /// The word token preceding the point marker
    pub level: String,

    /// Points awarded for this level
    pub points: i64,
}

/// Structured view of a rubric's point markers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RubricScheme {
    /// Levels in the order they appear in the text
    pub levels: Vec<RubricLevel>,

    /// Sum of all level points (0 when nothing matched)
    pub total_points: i64,
}

impl RubricScheme {
    /// Build a scheme from levels, deriving the total.
    pub fn from_levels(levels: Vec<RubricLevel>) -> Self {
        let total_points = levels
            .iter()
            .fold(0i64, |acc, l| acc.saturating_add(l.points));
        Self {
            levels,
            total_points,
        }
    }

    /// True when the rubric text carried no point markers.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The grading denominator: the rubric total, or `default` when the
    /// rubric has no points.
    pub fn out_of_or(&self, default: i64) -> i64 {
        if self.total_points == 0 {
            default
        } else {
            self.total_points
        }
    }
}
