//! What a controller asks the driver to do after a pass

use crate::error::{ErrorClass, OperatorError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of handling one notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Converged (or progressed); check again after the given delay
    RequeueAfter(Duration),
    /// Transient failure; run again as soon as possible
    Retry,
    /// The pass cannot succeed with the current input; check again after the
    /// given delay in case the declaration changes
    Fatal(Duration),
    /// The object no longer exists; nothing to schedule
    Done,
}

impl Action {
    /// Map a failed pass onto the schedule for the next one.
    pub fn from_error(err: &OperatorError, interval: Duration) -> Self {
        match err.classify() {
            ErrorClass::Retryable => Action::Retry,
            ErrorClass::Fatal => Action::Fatal(interval),
        }
    }

    /// Delay before the next pass, if one should happen at all
    pub fn delay(&self, retry_delay: Duration) -> Option<Duration> {
        match self {
            Action::RequeueAfter(d) | Action::Fatal(d) => Some(*d),
            Action::Retry => Some(retry_delay),
            Action::Done => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::RequeueAfter(d) => write!(f, "requeue after {}s", d.as_secs()),
            Action::Retry => write!(f, "retry"),
            Action::Fatal(d) => write!(f, "fatal, recheck after {}s", d.as_secs()),
            Action::Done => write!(f, "done"),
        }
    }
}
