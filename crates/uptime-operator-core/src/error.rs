//! Operator error types

use thiserror::Error;

/// Errors surfaced by a reconcile pass.
///
/// `NotFound`, `Conflict`, `Remote` and `Validation` form the taxonomy the
/// driver acts on. The remaining variants come from the store and state
/// persistence layers.
#[derive(Error, Debug)]
pub enum OperatorError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0} was modified concurrently")]
    Conflict(String),

    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Remote API error: {0}")]
    Remote(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("State file error: {0}")]
    State(String),

    #[error("Lock acquisition failed: {0}")]
    Lock(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// How the driver should treat a failed pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Transient; re-read fresh state and try again.
    Retryable,
    /// Retrying with the same input cannot succeed.
    Fatal,
}

impl OperatorError {
    pub fn remote<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        OperatorError::Remote(Box::new(err))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, OperatorError::NotFound(_))
    }

    pub fn classify(&self) -> ErrorClass {
        match self {
            OperatorError::Validation(_) | OperatorError::AlreadyExists(_) => ErrorClass::Fatal,
            _ => ErrorClass::Retryable,
        }
    }
}

pub type Result<T> = std::result::Result<T, OperatorError>;
