//! Defaults and bounds for user-supplied sizes.
//!
//! Raw values from the command line are clamped here before they reach the
//! store or the queue builder.

/// Database file used when neither `--db` nor `VOCAB_DB` is given.
pub const DEFAULT_DB_PATH: &str = "db.sqlite3";

/// Rows fetched at most when summarizing review history.
pub const SUMMARY_REVIEW_CAP: usize = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueLimits {
    pub limit: usize,
    pub new_limit: usize,
}

impl Default for QueueLimits {
    fn default() -> Self {
        Self::today(None, None)
    }
}

impl QueueLimits {
    /// Today session: 20 cards (1..=100), of which at most 10 new (0..=100).
    pub fn today(limit: Option<i64>, new_limit: Option<i64>) -> Self {
        Self {
            limit: clamp_or(limit, 20, 1, 100),
            new_limit: clamp_or(new_limit, 10, 0, 100),
        }
    }
}

/// Retry session size: 50 by default, 1..=100.
pub fn retry_limit(limit: Option<i64>) -> usize {
    clamp_or(limit, 50, 1, 100)
}

/// Card listing size: 50 by default, 1..=100.
pub fn list_limit(limit: Option<i64>) -> usize {
    clamp_or(limit, 50, 1, 100)
}

/// History window in days: 7 by default, 1..=30.
pub fn summary_days(days: Option<i64>) -> usize {
    clamp_or(days, 7, 1, 30)
}

fn clamp_or(value: Option<i64>, default: i64, min: i64, max: i64) -> usize {
    let clamped = value.unwrap_or(default).clamp(min, max);
    usize::try_from(clamped).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(
            QueueLimits::default(),
            QueueLimits {
                limit: 20,
                new_limit: 10
            }
        );
        assert_eq!(retry_limit(None), 50);
        assert_eq!(list_limit(None), 50);
        assert_eq!(summary_days(None), 7);
    }

    #[test]
    fn test_values_are_clamped() {
        let limits = QueueLimits::today(Some(0), Some(-5));
        assert_eq!(limits.limit, 1);
        assert_eq!(limits.new_limit, 0);

        let limits = QueueLimits::today(Some(500), Some(500));
        assert_eq!(limits.limit, 100);
        assert_eq!(limits.new_limit, 100);

        assert_eq!(retry_limit(Some(-1)), 1);
        assert_eq!(summary_days(Some(90)), 30);
        assert_eq!(summary_days(Some(0)), 1);
        assert_eq!(list_limit(Some(42)), 42);
    }
}
