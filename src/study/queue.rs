//! Study queue composition.
//!
//! Three read-only modes build the ordered card list for a session:
//! - today: due cards that were reviewed before, then never-reviewed cards
//!   filling whatever capacity is left (bounded by `new_limit`)
//! - retry: cards last answered HOLD or WRONG, regardless of due time
//! - selected: an explicit list of ids, in the caller's order

use super::StudyMode;
use crate::config::{self, QueueLimits};
use crate::database::{CardStore, DueFilter};
use crate::error::StoreError;
use crate::models::Card;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Upper bound on ids accepted by `selected`.
pub const MAX_SELECTED_IDS: usize = 100;

/// Raw session request; limits are clamped and ids normalized by `build`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueueRequest {
    Today {
        limit: Option<i64>,
        new_limit: Option<i64>,
    },
    Retry {
        limit: Option<i64>,
    },
    Selected {
        ids: Vec<String>,
    },
}

pub struct StudyQueueBuilder<S> {
    store: S,
}

impl<S: CardStore> StudyQueueBuilder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Resolves a request into a queue. A selection with no usable ids
    /// falls back to the default today session.
    pub fn build(
        &self,
        request: QueueRequest,
        now: DateTime<Utc>,
    ) -> Result<(StudyMode, Vec<Card>), StoreError> {
        match request {
            QueueRequest::Selected { ids } => {
                let ids = normalize_ids(&ids);
                if ids.is_empty() {
                    return self.build(
                        QueueRequest::Today {
                            limit: None,
                            new_limit: None,
                        },
                        now,
                    );
                }
                Ok((StudyMode::Selected, self.selected(&ids)?))
            }
            QueueRequest::Retry { limit } => {
                Ok((StudyMode::Retry, self.retry(config::retry_limit(limit))?))
            }
            QueueRequest::Today { limit, new_limit } => {
                let limits = QueueLimits::today(limit, new_limit);
                Ok((
                    StudyMode::Today,
                    self.today(limits.limit, limits.new_limit, now)?,
                ))
            }
        }
    }

    /// Default session. New cards never displace due reviews; they only fill
    /// the room left under `limit`.
    pub fn today(
        &self,
        limit: usize,
        new_limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<Card>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut queue = self.store.due_cards(now, DueFilter::Reviewed, limit)?;
        queue.truncate(limit);

        let remaining = limit.saturating_sub(queue.len());
        let allowed_new = new_limit.min(remaining);
        debug!(
            "Today queue: {} reviewed due, {} new allowed",
            queue.len(),
            allowed_new
        );

        if allowed_new > 0 {
            let mut fresh = self.store.due_cards(now, DueFilter::New, allowed_new)?;
            fresh.truncate(allowed_new);
            queue.extend(fresh);
        }

        Ok(queue)
    }

    /// Cards most recently answered HOLD or WRONG, ignoring their cooldown.
    pub fn retry(&self, limit: usize) -> Result<Vec<Card>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut queue = self.store.retry_cards(limit)?;
        queue.retain(|card| card.last_result.is_some_and(|r| r.needs_retry()));
        queue.truncate(limit);
        Ok(queue)
    }

    /// Cards for the given ids in input order. Blank and repeated ids are
    /// ignored, only the first `MAX_SELECTED_IDS` are used, and ids without a
    /// card are dropped silently.
    pub fn selected<T: AsRef<str>>(&self, ids: &[T]) -> Result<Vec<Card>, StoreError> {
        let ids = normalize_ids(ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_id: HashMap<String, Card> = self
            .store
            .find_cards(&ids)?
            .into_iter()
            .map(|card| (card.id.clone(), card))
            .collect();

        let queue: Vec<Card> = ids.iter().filter_map(|id| by_id.remove(id)).collect();
        debug!("Selected queue: {} of {} ids found", queue.len(), ids.len());
        Ok(queue)
    }
}

/// Trims ids, drops blanks and repeats, and keeps at most `MAX_SELECTED_IDS`.
pub fn normalize_ids<T: AsRef<str>>(ids: &[T]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .map(|id| id.as_ref().trim())
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.to_string()))
        .take(MAX_SELECTED_IDS)
        .map(str::to_string)
        .collect()
}
