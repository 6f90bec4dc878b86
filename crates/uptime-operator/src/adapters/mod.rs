//! Per-kind adapters between declared objects and the UptimeRobot API
//!
//! Each adapter builds an intent value from a declared object, binds the
//! generic reconciler to one gateway trait and maps remote snapshots back
//! into observed status.

pub mod account;
pub mod alert_contact;
pub mod monitor;

pub use account::{account_status, fetch_account_status};
pub use alert_contact::{AlertContactAdapter, AlertContactIntent};
pub use monitor::{MonitorAdapter, MonitorIntent};

use uptime_operator_core::{OperatorError, Result};
use uptimerobot_client::UptimeRobotError;

/// Map a gateway failure into the reconcile error taxonomy.
pub fn remote_error(err: UptimeRobotError) -> OperatorError {
    match err {
        UptimeRobotError::NotFound(message) => OperatorError::NotFound(message),
        other => OperatorError::remote(other),
    }
}

/// Finalizer cleanup: an object that never got a remote id, or whose remote
/// side is already gone, counts as cleaned up.
pub(crate) async fn delete_remote<F, Fut>(id: &str, delete: F) -> Result<()>
where
    F: FnOnce(String) -> Fut,
    Fut: std::future::Future<Output = std::result::Result<(), UptimeRobotError>>,
{
    if id.is_empty() {
        return Ok(());
    }
    match delete(id.to_string()).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_not_found() => {
            tracing::debug!(remote_id = id, "remote object already gone");
            Ok(())
        }
        Err(e) => Err(remote_error(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_survives_mapping() {
        let err = remote_error(UptimeRobotError::NotFound("monitor".into()));
        assert!(err.is_not_found());

        let err = remote_error(UptimeRobotError::Api {
            error_type: "internal".into(),
            message: "oops".into(),
        });
        assert!(matches!(err, OperatorError::Remote(_)));
    }

    #[tokio::test]
    async fn test_delete_remote_tolerates_missing() {
        assert!(
            delete_remote("", |_| async { unavailable() })
                .await
                .is_ok()
        );
        assert!(
            delete_remote("12", |_| async {
                Err(UptimeRobotError::NotFound("gone".into()))
            })
            .await
            .is_ok()
        );
        assert!(delete_remote("12", |_| async { unavailable() }).await.is_err());
    }

    fn unavailable() -> std::result::Result<(), UptimeRobotError> {
        Err(UptimeRobotError::InvalidResponse("unexpected".into()))
    }
}
