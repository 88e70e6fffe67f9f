//! Fixed-table spaced repetition schedule.
//!
//! Each review outcome maps to a new streak and the time until the card is due again:
//! - WRONG: streak resets to 0, card returns in 10 minutes
//! - HOLD: streak resets to 0, card returns in 12 hours
//! - CORRECT: streak grows by one and the interval follows a lookup table
//!   (1 → 3 → 7 → 14 days), plateauing at 30 days from the fifth success on

use super::ReviewResult;
use chrono::{DateTime, Duration, Utc};

/// Scheduling state produced by one review.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NextState {
    pub streak: u32,
    pub next_due_at: DateTime<Utc>,
}

/// Interval after a CORRECT answer that brought the streak to `streak`.
pub fn correct_interval(streak: u32) -> Duration {
    match streak {
        0 | 1 => Duration::days(1),
        2 => Duration::days(3),
        3 => Duration::days(7),
        4 => Duration::days(14),
        _ => Duration::days(30),
    }
}

/// Computes the streak and due time that follow `result`.
pub fn next_state(current_streak: u32, result: ReviewResult, now: DateTime<Utc>) -> NextState {
    let (streak, interval) = match result {
        ReviewResult::Wrong => (0, Duration::minutes(10)),
        ReviewResult::Hold => (0, Duration::hours(12)),
        ReviewResult::Correct => {
            let streak = current_streak.saturating_add(1);
            (streak, correct_interval(streak))
        }
    };

    NextState {
        streak,
        next_due_at: now + interval,
    }
}
