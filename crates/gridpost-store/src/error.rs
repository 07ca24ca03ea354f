use thiserror::Error;

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The record being written fails validation (e.g. empty content).
    #[error("Validation error: {0}")]
    Validation(String),

    /// No account with the given username exists.
    #[error("Account not found: {username}")]
    AccountNotFound { username: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;
