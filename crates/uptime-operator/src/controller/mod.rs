//! Per-kind controllers
//!
//! A controller handles one notification for one object key: it loads the
//! declared object, runs the finalizer protocol, reconciles through the
//! kind's adapter, writes back observed status and tells the runner when to
//! look again.

pub mod account;
pub mod alert_contact;
pub mod monitor;
pub mod runner;

pub use account::AccountController;
pub use alert_contact::AlertContactController;
pub use monitor::MonitorController;
pub use runner::ControllerRunner;

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::broadcast;
use uptime_operator_core::{
    Action, LabelSelector, ObjectKey, ObjectSpec, ObjectStore, OperatorError, Result,
};

const STATUS_WRITE_ATTEMPTS: usize = 3;

/// Entry point the runner drives for one kind
#[async_trait]
pub trait Controller: Send + Sync {
    fn kind(&self) -> &'static str;

    /// Every key currently in the store, used for the initial pass and to
    /// resync after missed notifications.
    async fn list_keys(&self) -> Result<Vec<ObjectKey>>;

    fn watch(&self) -> broadcast::Receiver<ObjectKey>;

    /// Handle one notification. Never fails; errors become an [`Action`].
    async fn on_notify(&self, key: &ObjectKey) -> Action;
}

pub(crate) async fn store_keys<S, St>(store: &St) -> Result<Vec<ObjectKey>>
where
    S: ObjectSpec,
    St: ObjectStore<S> + ?Sized,
{
    Ok(store
        .list(None, &LabelSelector::new())
        .await?
        .iter()
        .map(|o| o.key())
        .collect())
}

/// Turn the result of a pass into the next schedule, logging failures.
pub(crate) fn into_action(
    kind: &'static str,
    key: &ObjectKey,
    result: Result<Action>,
    interval: Duration,
) -> Action {
    match result {
        Ok(action) => action,
        Err(e) => {
            let action = Action::from_error(&e, interval);
            match action {
                Action::Fatal(_) => {
                    tracing::error!(kind, key = %key, error = %e, "reconcile failed");
                }
                _ => tracing::warn!(kind, key = %key, error = %e, "reconcile failed, retrying"),
            }
            action
        }
    }
}

/// Write observed status onto the latest stored copy.
///
/// Status belongs to the controller alone, so a version conflict (a spec or
/// finalizer write in between) is resolved by re-reading and writing again.
pub(crate) async fn persist_status<S, St>(
    store: &St,
    key: &ObjectKey,
    status: S::Status,
) -> Result<()>
where
    S: ObjectSpec,
    St: ObjectStore<S> + ?Sized,
{
    for _ in 0..STATUS_WRITE_ATTEMPTS {
        let mut latest = store.get(key).await?;
        if latest.status == status {
            return Ok(());
        }
        latest.status = status.clone();
        match store.update_status(&latest).await {
            Ok(_) => return Ok(()),
            Err(OperatorError::Conflict(_)) => {
                tracing::debug!(kind = S::KIND, key = %key, "status write conflict, re-reading");
            }
            Err(e) => return Err(e),
        }
    }
    Err(OperatorError::Conflict(format!(
        "{} {}: status write kept conflicting",
        S::KIND,
        key
    )))
}
