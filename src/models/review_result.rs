//! Review outcome vocabulary. Raw labels are parsed here and nowhere else.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three outcomes a learner can report for a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewResult {
    Correct,
    /// Unsure; review again soon without counting as a miss.
    Hold,
    Wrong,
}

/// Returned when a label is not one of `correct`, `hold`, `wrong`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid review result '{0}', expected correct|hold|wrong")]
pub struct InvalidResult(pub String);

impl ReviewResult {
    /// Stored column value.
    pub fn as_db_str(self) -> &'static str {
        match self {
            ReviewResult::Correct => "CORRECT",
            ReviewResult::Hold => "HOLD",
            ReviewResult::Wrong => "WRONG",
        }
    }

    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "CORRECT" => Some(ReviewResult::Correct),
            "HOLD" => Some(ReviewResult::Hold),
            "WRONG" => Some(ReviewResult::Wrong),
            _ => None,
        }
    }

    /// HOLD and WRONG both put a card into the retry queue.
    pub fn needs_retry(self) -> bool {
        matches!(self, ReviewResult::Hold | ReviewResult::Wrong)
    }
}

impl FromStr for ReviewResult {
    type Err = InvalidResult;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "correct" => Ok(ReviewResult::Correct),
            "hold" => Ok(ReviewResult::Hold),
            "wrong" => Ok(ReviewResult::Wrong),
            _ => Err(InvalidResult(s.to_string())),
        }
    }
}

impl fmt::Display for ReviewResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReviewResult::Correct => "correct",
            ReviewResult::Hold => "hold",
            ReviewResult::Wrong => "wrong",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels() {
        assert_eq!("correct".parse::<ReviewResult>(), Ok(ReviewResult::Correct));
        assert_eq!(" HOLD ".parse::<ReviewResult>(), Ok(ReviewResult::Hold));
        assert_eq!("Wrong".parse::<ReviewResult>(), Ok(ReviewResult::Wrong));
    }

    #[test]
    fn test_parse_rejects_unknown_label() {
        let err = "maybe".parse::<ReviewResult>().unwrap_err();
        assert_eq!(err, InvalidResult("maybe".to_string()));
        assert!("".parse::<ReviewResult>().is_err());
    }

    #[test]
    fn test_db_str_mapping() {
        for result in [ReviewResult::Correct, ReviewResult::Hold, ReviewResult::Wrong] {
            assert_eq!(ReviewResult::from_db_str(result.as_db_str()), Some(result));
        }
        assert_eq!(ReviewResult::from_db_str("correct"), None);
    }

    #[test]
    fn test_needs_retry() {
        assert!(!ReviewResult::Correct.needs_retry());
        assert!(ReviewResult::Hold.needs_retry());
        assert!(ReviewResult::Wrong.needs_retry());
    }
}
