//! UptimeRobot client error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UptimeRobotError {
    /// The API answered `stat: fail` with error type `not_found`
    #[error("not found: {0}")]
    NotFound(String),

    #[error("API error ({error_type}): {message}")]
    Api { error_type: String, message: String },

    #[error("unexpected HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl UptimeRobotError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, UptimeRobotError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, UptimeRobotError>;
