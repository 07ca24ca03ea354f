use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors from grid/date resolution.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// A grid coordinate is outside its valid range.
    #[error("Invalid grid slot: {0}")]
    InvalidSlot(String),

    /// The timezone string is not a known IANA identifier.
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// The resolved instant is strictly before "now".
    #[error("Scheduled time {at} is in the past")]
    PastSchedule { at: DateTime<Utc> },

    /// The local wall-clock time does not exist in the target timezone
    /// (spring-forward gap).
    #[error("Local time {local} does not exist in {tz}")]
    NonexistentLocalTime { local: String, tz: String },
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
