//! What grading does when the AI service cannot be reached.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Policy for an answer whose AI call failed at the transport level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportFallback {
    /// Persist and return a zero-score outcome whose feedback says the
    /// service was unreachable
    Record,

    /// Drop the answer: no record, no result, only a warning in the log
    Skip,
}

impl Default for TransportFallback {
    fn default() -> Self {
        Self::Record
    }
}

impl fmt::Display for TransportFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportFallback::Record => write!(f, "record"),
            TransportFallback::Skip => write!(f, "skip"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_records() {
        assert_eq!(TransportFallback::default(), TransportFallback::Record);
    }

    #[test]
    fn test_yaml_names() {
        let skip: TransportFallback = serde_yaml::from_str("skip").unwrap();
        assert_eq!(skip, TransportFallback::Skip);
        assert_eq!(serde_json::to_string(&TransportFallback::Record).unwrap(), "\"record\"");
        assert!(serde_yaml::from_str::<TransportFallback>("retry").is_err());
    }
}
