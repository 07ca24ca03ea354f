use thiserror::Error;

/// Errors that abort a whole publisher run. Per-post delivery failures are
/// not errors at this level — they are recorded in the run report.
#[derive(Debug, Error)]
pub enum PublisherError {
    /// The pending-post query failed; without data the run cannot proceed.
    #[error("Store error: {0}")]
    Store(#[from] gridpost_store::StoreError),

    /// The minute window could not be computed.
    #[error("Window error: {0}")]
    Window(String),
}

pub type Result<T> = std::result::Result<T, PublisherError>;
