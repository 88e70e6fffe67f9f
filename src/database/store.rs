//! Query shapes the study core needs from persistence.
//!
//! `StudyQueueBuilder` and `ReviewRecorder` only talk to this trait, so they
//! can run against the SQLite store or any test double.

use crate::error::StoreError;
use crate::models::{Card, Review};
use chrono::{DateTime, Utc};

/// Which due cards to fetch, split on whether a review row exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DueFilter {
    /// At least one review. Ordered by `next_due_at`, then `created_at`.
    Reviewed,
    /// Never reviewed. Ordered by `created_at`.
    New,
}

pub trait CardStore {
    fn find_card(&self, id: &str) -> Result<Option<Card>, StoreError>;

    /// Bulk lookup. Order of the returned cards is unspecified; unknown ids are skipped.
    fn find_cards(&self, ids: &[String]) -> Result<Vec<Card>, StoreError>;

    /// Cards with `next_due_at <= now` matching `filter`, at most `limit` of them.
    fn due_cards(
        &self,
        now: DateTime<Utc>,
        filter: DueFilter,
        limit: usize,
    ) -> Result<Vec<Card>, StoreError>;

    /// Cards whose last result was HOLD or WRONG, most recently updated first.
    fn retry_cards(&self, limit: usize) -> Result<Vec<Card>, StoreError>;

    /// Appends `review` and copies its snapshot onto the card as one unit.
    /// On error neither write is visible.
    fn commit_review(&self, review: &Review) -> Result<(), StoreError>;
}

impl<S: CardStore + ?Sized> CardStore for &S {
    fn find_card(&self, id: &str) -> Result<Option<Card>, StoreError> {
        (**self).find_card(id)
    }

    fn find_cards(&self, ids: &[String]) -> Result<Vec<Card>, StoreError> {
        (**self).find_cards(ids)
    }

    fn due_cards(
        &self,
        now: DateTime<Utc>,
        filter: DueFilter,
        limit: usize,
    ) -> Result<Vec<Card>, StoreError> {
        (**self).due_cards(now, filter, limit)
    }

    fn retry_cards(&self, limit: usize) -> Result<Vec<Card>, StoreError> {
        (**self).retry_cards(limit)
    }

    fn commit_review(&self, review: &Review) -> Result<(), StoreError> {
        (**self).commit_review(review)
    }
}
