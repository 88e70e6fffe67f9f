//! Applies a review outcome to a card: the only write path for scheduling state.
use crate::database::CardStore;
use crate::error::ReviewError;
use crate::models::{NextState, Review, ReviewResult, next_state};
use chrono::{DateTime, SubsecRound, Utc};
use tracing::info;

pub struct ReviewRecorder<S> {
    store: S,
}

impl<S: CardStore> ReviewRecorder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Schedules the card's next review and stores the event.
    ///
    /// The review row and the card update are committed together; on
    /// `Persistence` failure neither is visible and the call may be retried.
    /// `now` is truncated to milliseconds, the precision the store keeps, so
    /// the returned state is exactly what a later read sees.
    pub fn record(
        &self,
        card_id: &str,
        result: ReviewResult,
        now: DateTime<Utc>,
    ) -> Result<NextState, ReviewError> {
        let now = now.trunc_subsecs(3);
        let card = self
            .store
            .find_card(card_id)
            .map_err(ReviewError::Persistence)?
            .ok_or_else(|| ReviewError::NotFound(card_id.to_string()))?;

        let state = next_state(card.streak, result, now);
        let review = Review::new(
            uuid::Uuid::new_v4().to_string(),
            card.id,
            result,
            now,
            state,
        );
        self.store.commit_review(&review)?;

        info!(
            "Recorded {} for card {}: streak {}, next due {}",
            result, review.card_id, state.streak, state.next_due_at
        );
        Ok(state)
    }

    /// Same as `record` for a raw `correct|hold|wrong` label. Unknown labels
    /// are rejected before the card is looked up.
    pub fn record_label(
        &self,
        card_id: &str,
        label: &str,
        now: DateTime<Utc>,
    ) -> Result<NextState, ReviewError> {
        let result: ReviewResult = label.parse()?;
        self.record(card_id, result, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{DueFilter, SqliteStore};
    use crate::error::StoreError;
    use crate::models::{Card, CardContent};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn store_with_card() -> (SqliteStore, Card) {
        let store = SqliteStore::open_in_memory().unwrap();
        let card = store
            .create_card(CardContent::new("borrow", "Can I borrow your pen today?"), t0())
            .unwrap();
        (store, card)
    }

    #[test]
    fn test_record_scenario() {
        let (store, card) = store_with_card();
        let recorder = ReviewRecorder::new(&store);

        let first = recorder.record(&card.id, ReviewResult::Correct, t0()).unwrap();
        assert_eq!(first.streak, 1);
        assert_eq!(first.next_due_at, t0() + Duration::days(1));

        let t1 = t0() + Duration::days(1);
        let second = recorder.record(&card.id, ReviewResult::Correct, t1).unwrap();
        assert_eq!(second.streak, 2);
        assert_eq!(second.next_due_at, t1 + Duration::days(3));

        let t2 = second.next_due_at;
        let third = recorder.record(&card.id, ReviewResult::Wrong, t2).unwrap();
        assert_eq!(third.streak, 0);
        assert_eq!(third.next_due_at, t2 + Duration::minutes(10));

        let stored = store.find_card(&card.id).unwrap().unwrap();
        assert_eq!(stored.streak, 0);
        assert_eq!(stored.next_due_at, third.next_due_at);
        assert_eq!(stored.last_result, Some(ReviewResult::Wrong));
        assert_eq!(stored.updated_at, t2);
        assert_eq!(store.reviews_for_card(&card.id).unwrap().len(), 3);
    }

    #[test]
    fn test_returned_state_matches_stored_card() {
        let (store, card) = store_with_card();
        let recorder = ReviewRecorder::new(&store);
        let at = t0() + Duration::nanoseconds(123_456_789);

        let state = recorder.record(&card.id, ReviewResult::Correct, at).unwrap();
        assert_eq!(
            state.next_due_at,
            t0() + Duration::milliseconds(123) + Duration::days(1)
        );

        let stored = store.find_card(&card.id).unwrap().unwrap();
        assert_eq!(stored.next_due_at, state.next_due_at);
        assert_eq!(stored.updated_at, t0() + Duration::milliseconds(123));

        let review = store.reviews_for_card(&card.id).unwrap().remove(0);
        assert_eq!(review.next_due_at, state.next_due_at);
    }

    #[test]
    fn test_card_matches_latest_review() {
        let (store, card) = store_with_card();
        let recorder = ReviewRecorder::new(&store);

        let outcomes = [
            ReviewResult::Hold,
            ReviewResult::Correct,
            ReviewResult::Correct,
            ReviewResult::Wrong,
            ReviewResult::Correct,
        ];
        for (i, result) in outcomes.into_iter().enumerate() {
            let at = t0() + Duration::hours(i as i64);
            recorder.record(&card.id, result, at).unwrap();

            let stored = store.find_card(&card.id).unwrap().unwrap();
            let latest = store.reviews_for_card(&card.id).unwrap().remove(0);
            assert_eq!(latest.result, result);
            assert_eq!(stored.last_result, Some(latest.result));
            assert_eq!(stored.streak, latest.streak);
            assert_eq!(stored.next_due_at, latest.next_due_at);
        }
    }

    #[test]
    fn test_record_missing_card() {
        let (store, _) = store_with_card();
        let recorder = ReviewRecorder::new(&store);

        let err = recorder.record("ghost", ReviewResult::Correct, t0()).unwrap_err();
        assert!(matches!(err, ReviewError::NotFound(ref id) if id == "ghost"));
        assert!(store.reviews_since(t0() - Duration::days(1), 10).unwrap().is_empty());
    }

    #[test]
    fn test_record_label() {
        let (store, card) = store_with_card();
        let recorder = ReviewRecorder::new(&store);

        let state = recorder.record_label(&card.id, "hold", t0()).unwrap();
        assert_eq!(state.streak, 0);
        assert_eq!(state.next_due_at, t0() + Duration::hours(12));

        let err = recorder.record_label(&card.id, "skip", t0()).unwrap_err();
        assert!(matches!(err, ReviewError::InvalidResult(_)));
        assert_eq!(store.reviews_for_card(&card.id).unwrap().len(), 1);
    }

    #[test]
    fn test_failed_write_leaves_nothing_behind() {
        let (store, card) = store_with_card();
        store
            .with_conn(|conn| {
                conn.execute_batch(
                    "CREATE TRIGGER fail_card_update BEFORE UPDATE ON cards
                     BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
                )?;
                Ok(())
            })
            .unwrap();

        let recorder = ReviewRecorder::new(&store);
        let err = recorder.record(&card.id, ReviewResult::Correct, t0()).unwrap_err();
        assert!(matches!(err, ReviewError::Persistence(_)));

        assert!(store.reviews_for_card(&card.id).unwrap().is_empty());
        assert_eq!(store.find_card(&card.id).unwrap().unwrap(), card);
    }

    /// Store double: every call fails, and touching it at all is recorded.
    struct BrokenStore {
        touched: std::cell::Cell<bool>,
    }

    impl CardStore for BrokenStore {
        fn find_card(&self, _id: &str) -> Result<Option<Card>, StoreError> {
            self.touched.set(true);
            Err(StoreError::LockPoisoned)
        }

        fn find_cards(&self, _ids: &[String]) -> Result<Vec<Card>, StoreError> {
            self.touched.set(true);
            Err(StoreError::LockPoisoned)
        }

        fn due_cards(
            &self,
            _now: DateTime<Utc>,
            _filter: DueFilter,
            _limit: usize,
        ) -> Result<Vec<Card>, StoreError> {
            self.touched.set(true);
            Err(StoreError::LockPoisoned)
        }

        fn retry_cards(&self, _limit: usize) -> Result<Vec<Card>, StoreError> {
            self.touched.set(true);
            Err(StoreError::LockPoisoned)
        }

        fn commit_review(&self, _review: &Review) -> Result<(), StoreError> {
            self.touched.set(true);
            Err(StoreError::LockPoisoned)
        }
    }

    #[test]
    fn test_invalid_label_is_rejected_before_lookup() {
        let store = BrokenStore {
            touched: std::cell::Cell::new(false),
        };
        let recorder = ReviewRecorder::new(&store);

        let err = recorder.record_label("any", "perfect", t0()).unwrap_err();
        assert!(matches!(err, ReviewError::InvalidResult(_)));
        assert!(!store.touched.get());
    }

    #[test]
    fn test_lookup_failure_is_persistence_error() {
        let store = BrokenStore {
            touched: std::cell::Cell::new(false),
        };
        let recorder = ReviewRecorder::new(&store);

        let err = recorder.record("any", ReviewResult::Wrong, t0()).unwrap_err();
        assert!(matches!(err, ReviewError::Persistence(StoreError::LockPoisoned)));
    }
}
