use thiserror::Error;

#[derive(Debug, Error)]
pub enum TwitterError {
    /// Transport-level failure, including the per-request timeout.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the API, with the response payload.
    #[error("Twitter API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The token exchange response carried no access token.
    #[error("OAuth exchange failed: {0}")]
    OAuth(String),
}

pub type Result<T> = std::result::Result<T, TwitterError>;
