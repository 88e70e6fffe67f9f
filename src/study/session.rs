//! Cursor over one study queue.
//! Walks the cards in order, reveals answers on demand and submits outcomes.

use super::ReviewRecorder;
use crate::database::CardStore;
use crate::error::ReviewError;
use crate::models::{Card, NextState, ReviewResult};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StudyMode {
    Today,
    Retry,
    Selected,
}

impl fmt::Display for StudyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StudyMode::Today => "today",
            StudyMode::Retry => "retry (hold/wrong)",
            StudyMode::Selected => "selected cards",
        };
        f.write_str(label)
    }
}

/// A session never re-fetches on its own; once the last card is answered it
/// is complete and the caller builds a fresh queue.
pub struct StudySession {
    pub mode: StudyMode,
    pub cards: Vec<Card>,
    pub current_index: usize,
    pub show_answer: bool,
}

impl StudySession {
    pub fn new(mode: StudyMode, cards: Vec<Card>) -> Self {
        Self {
            mode,
            cards,
            current_index: 0,
            show_answer: false,
        }
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.cards.get(self.current_index)
    }

    pub fn toggle_answer(&mut self) {
        self.show_answer = !self.show_answer;
    }

    /// Records `result` for the current card and moves to the next one.
    ///
    /// Returns `Ok(None)` when the session is already complete. On error the
    /// cursor does not move, so the same card can be submitted again.
    pub fn submit<S: CardStore>(
        &mut self,
        recorder: &ReviewRecorder<S>,
        result: ReviewResult,
        now: DateTime<Utc>,
    ) -> Result<Option<NextState>, ReviewError> {
        let Some(card) = self.current_card() else {
            return Ok(None);
        };

        let state = recorder.record(&card.id, result, now)?;
        self.current_index += 1;
        self.show_answer = false;
        Ok(Some(state))
    }

    /// Shuffles the cards not yet studied.
    pub fn reshuffle(&mut self) {
        let start = self.current_index.min(self.cards.len());
        self.cards[start..].shuffle(&mut rand::thread_rng());
        self.show_answer = false;
    }

    pub fn studied_count(&self) -> usize {
        self.current_index.min(self.cards.len())
    }

    pub fn total_count(&self) -> usize {
        self.cards.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.studied_count()
    }

    pub fn is_completed(&self) -> bool {
        self.current_index >= self.cards.len()
    }

    /// Position of the current card, e.g. "3/20".
    pub fn progress(&self) -> String {
        format!(
            "{}/{}",
            (self.current_index + 1).min(self.total_count()),
            self.total_count()
        )
    }
}
