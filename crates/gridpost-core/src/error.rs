use thiserror::Error;

/// Top-level error type. The daemon's HTTP layer derives its response
/// payload codes from [`GridpostError::code`].
#[derive(Debug, Error)]
pub enum GridpostError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Account not found: {username}")]
    AccountNotFound { username: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),
}

impl GridpostError {
    /// Short error code string included in HTTP error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            GridpostError::Config(_) => "CONFIG_ERROR",
            GridpostError::Validation(_) => "VALIDATION_ERROR",
            GridpostError::AccountNotFound { .. } => "ACCOUNT_NOT_FOUND",
            GridpostError::Database(_) => "DATABASE_ERROR",
            GridpostError::AuthFailed(_) => "AUTH_FAILED",
        }
    }
}

pub type Result<T> = std::result::Result<T, GridpostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(GridpostError::Config("x".into()).code(), "CONFIG_ERROR");
        assert_eq!(GridpostError::Validation("x".into()).code(), "VALIDATION_ERROR");
        assert_eq!(
            GridpostError::AccountNotFound {
                username: "alice".into()
            }
            .code(),
            "ACCOUNT_NOT_FOUND"
        );
        assert_eq!(GridpostError::Database("x".into()).code(), "DATABASE_ERROR");
        assert_eq!(GridpostError::AuthFailed("x".into()).code(), "AUTH_FAILED");
    }
}
