//! Backend error type shared by every LLM client

use thiserror::Error;

/// Errors that can occur while talking to an LLM backend
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BackendError {
    /// API request failed with the given message
    #[error("API error: {message}")]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// Authentication failed or credentials are invalid
    #[error("Authentication failed: {message}")]
    AuthenticationError { message: String },

    /// Request timed out after the specified duration (in milliseconds)
    #[error("Request timed out after {}", format_elapsed(.millis))]
    TimeoutError { millis: u64 },

    /// Invalid or malformed response from the LLM
    #[error("Invalid response from LLM: {message}")]
    InvalidResponse { message: String },

    /// Configuration error (missing API keys, invalid settings, etc.)
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Network-related error
    #[error("Network error: {message}")]
    NetworkError { message: String },

    /// Generic error for other cases
    #[error("Error: {message}")]
    Other { message: String },
}

fn format_elapsed(millis: &u64) -> String {
    if *millis >= 1000 && millis % 1000 == 0 {
        format!("{} seconds", millis / 1000)
    } else {
        format!("{} ms", millis)
    }
}

impl BackendError {
    pub fn other(message: impl Into<String>) -> Self {
        BackendError::Other {
            message: message.into(),
        }
    }
}
