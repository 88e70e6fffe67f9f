//! Study core: queue composition, review recording, sessions and history.
pub mod history;
pub mod queue;
pub mod recorder;
pub mod session;

pub use history::recent_summaries;
pub use queue::{MAX_SELECTED_IDS, QueueRequest, StudyQueueBuilder, normalize_ids};
pub use recorder::ReviewRecorder;
pub use session::{StudyMode, StudySession};
