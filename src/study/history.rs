use crate::config::SUMMARY_REVIEW_CAP;
use crate::database::SqliteStore;
use crate::error::StoreError;
use crate::models::{DailySummary, summarize_by_day};
use chrono::{DateTime, Duration, NaiveTime, Utc};

/// Daily outcome counts for the last `days` UTC calendar days (today
/// included), newest first.
pub fn recent_summaries(
    store: &SqliteStore,
    days: usize,
    now: DateTime<Utc>,
) -> Result<Vec<DailySummary>, StoreError> {
    let span = i64::try_from(days.max(1) - 1).unwrap_or(0);
    let first_day = now.date_naive() - Duration::days(span);
    let from = first_day.and_time(NaiveTime::MIN).and_utc();
    let reviews = store.reviews_since(from, SUMMARY_REVIEW_CAP)?;
    Ok(summarize_by_day(&reviews))
}
