use async_trait::async_trait;
use thiserror::Error;

use crate::types::Account;

/// Errors a delivery backend can report for a single post.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The platform rejected the request with a non-success status.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure, including per-request timeouts.
    #[error("Network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// No backend is configured (e.g. missing platform credentials).
    #[error("Delivery unavailable: {0}")]
    Unavailable(String),
}

/// Seam between the publisher engine and the social platform.
///
/// The production implementation lives in `gridpost-twitter`; tests inject
/// counting fakes. One call per post per claim — the engine guarantees a
/// post is claimed before `deliver` is invoked.
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Backend name used in logs.
    fn name(&self) -> &str;

    /// Attempt to publish `content` on behalf of `account`.
    ///
    /// Returns the platform-assigned id of the created post.
    async fn deliver(&self, account: &Account, content: &str)
        -> Result<String, DeliveryError>;
}
