// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("API rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Request timed out. Please try again.")]
    UpstreamTimeout,

    #[error("Upstream API error: {0}")]
    Upstream(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Message safe to surface to API clients. Internal details stay in logs.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::RateLimited | AppError::UpstreamTimeout => self.to_string(),
            AppError::Upstream(_) => {
                "Error communicating with recommendation service. Please try again later."
                    .to_string()
            }
            _ => "An unexpected error occurred. Please try again later.".to_string(),
        }
    }
}
