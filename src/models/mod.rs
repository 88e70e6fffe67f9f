pub mod card;
pub mod review;
pub mod review_result;
pub mod review_summary;
pub mod scheduler;

pub use card::{Card, CardContent, CardInputError};
pub use review::Review;
pub use review_result::{InvalidResult, ReviewResult};
pub use review_summary::{DailySummary, summarize_by_day};
pub use scheduler::{NextState, next_state};
