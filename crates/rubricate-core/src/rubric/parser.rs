//! Rubric text parsing.

use lazy_static::lazy_static;
use regex::Regex;

use super::{RubricLevel, RubricScheme};

/// A word, then `(N pts)` with optional spacing inside the parentheses.
/// Points are ASCII digits only.
pub const RUBRIC_LEVEL_PATTERN: &str = r"(\w+)\s*\(([0-9]+)\s*pts\)";

lazy_static! {
    /// Matches `Accuracy (3 pts)`, `Clarity(4pts)`, `Depth (10 pts)`.
    static ref RUBRIC_LEVEL: Regex = Regex::new(RUBRIC_LEVEL_PATTERN).unwrap();
}

/// Parse rubric text into a point scheme.
///
/// Every `<word> (<N> pts)` occurrence becomes one level, in order of
/// appearance. Text without markers yields an empty scheme with a total of
/// zero; that is a valid "no rubric" state, not an error.
///
/// # Example
///
/// ```rust
/// use rubricate_core::parse_rubric;
///
/// let scheme = parse_rubric("Accuracy (3 pts) Clarity (4 pts)");
/// assert_eq!(scheme.levels.len(), 2);
/// assert_eq!(scheme.total_points, 7);
/// ```
pub fn parse_rubric(text: &str) -> RubricScheme {
    let levels = RUBRIC_LEVEL
        .captures_iter(text)
        .filter_map(|caps| {
            // Oversized point values are dropped rather than failing the rubric
            let points = caps[2].parse::<i64>().ok()?;
            Some(RubricLevel {
                level: caps[1].to_string(),
                points,
            })
        })
        .collect();

    RubricScheme::from_levels(levels)
}
