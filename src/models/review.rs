use super::{NextState, ReviewResult};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Append-only record of one study event. `next_due_at` and `streak` are a
/// snapshot of what the event produced, not a live reference to the card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Review {
    pub id: String,
    pub card_id: String,
    pub result: ReviewResult,
    pub reviewed_at: DateTime<Utc>,
    pub next_due_at: DateTime<Utc>,
    pub streak: u32,
}

impl Review {
    pub fn new(
        id: String,
        card_id: String,
        result: ReviewResult,
        reviewed_at: DateTime<Utc>,
        state: NextState,
    ) -> Self {
        Self {
            id,
            card_id,
            result,
            reviewed_at,
            next_due_at: state.next_due_at,
            streak: state.streak,
        }
    }
}
