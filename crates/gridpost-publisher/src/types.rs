use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result of one delivery attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// The backend accepted the post; `remote_id` is the platform's id.
    Delivered { remote_id: String },
    /// The backend rejected the post or the call failed; the claim was
    /// released so a later run retries.
    Failed { error: String },
}

/// Per-post record in a run report.
#[derive(Debug, Clone, Serialize)]
pub struct PostOutcome {
    pub post_id: String,
    pub owner: String,
    pub outcome: Outcome,
}

/// Aggregated result of one matcher run, so callers can assert counts
/// instead of scraping logs.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Start of the minute window this run was anchored to.
    pub window_start: DateTime<Utc>,
    /// Exclusive end of the window.
    pub window_end: DateTime<Utc>,
    /// Posts found due in this run.
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
    /// Due posts whose claim was already taken by a concurrent run.
    pub skipped: usize,
    pub outcomes: Vec<PostOutcome>,
}

impl RunReport {
    pub fn new(window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> Self {
        Self {
            window_start,
            window_end,
            attempted: 0,
            delivered: 0,
            failed: 0,
            skipped: 0,
            outcomes: Vec::new(),
        }
    }
}
