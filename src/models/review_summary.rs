//! Per-day tallies of review outcomes for the recent-history view.
use super::{Review, ReviewResult};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total: u32,
    pub correct: u32,
    pub hold: u32,
    pub wrong: u32,
}

impl DailySummary {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total: 0,
            correct: 0,
            hold: 0,
            wrong: 0,
        }
    }
}

/// Groups reviews by UTC calendar date, newest date first.
pub fn summarize_by_day(reviews: &[Review]) -> Vec<DailySummary> {
    let mut by_date: BTreeMap<NaiveDate, DailySummary> = BTreeMap::new();

    for review in reviews {
        let date = review.reviewed_at.date_naive();
        let summary = by_date
            .entry(date)
            .or_insert_with(|| DailySummary::empty(date));
        summary.total += 1;
        match review.result {
            ReviewResult::Correct => summary.correct += 1,
            ReviewResult::Hold => summary.hold += 1,
            ReviewResult::Wrong => summary.wrong += 1,
        }
    }

    by_date.into_values().rev().collect()
}
