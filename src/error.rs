use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Encoding failure: {0}")]
    Encoding(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::header::InvalidHeaderValue> for AuthError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        AuthError::Encoding(format!("Invalid header value: {}", err))
    }
}

impl From<toml::de::Error> for AuthError {
    fn from(err: toml::de::Error) -> Self {
        AuthError::Configuration(format!("Failed to parse config file: {}", err))
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Error handling utilities
pub struct ErrorHandler;

impl ErrorHandler {
    /// Log error and return a user-friendly message
    pub fn handle_error(error: &AuthError) -> String {
        match error {
            AuthError::InvalidInput(msg) => {
                tracing::warn!("Invalid input: {}", msg);
                format!("Request could not be signed: {}", msg)
            }
            AuthError::Encoding(msg) => {
                tracing::error!("Encoding failure: {}", msg);
                format!("Internal encoding failure: {}", msg)
            }
            AuthError::Configuration(msg) => {
                tracing::error!("Configuration error: {}", msg);
                format!("Configuration error: {}", msg)
            }
        }
    }
}
