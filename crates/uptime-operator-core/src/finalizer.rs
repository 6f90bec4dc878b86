//! Finalizer-based deletion protocol
//!
//! The operator owns one token on every object it reconciles. While the token
//! is present the store will not physically remove the object, so the remote
//! resource can always be cleaned up before the declaration disappears.

use crate::error::Result;
use crate::object::{Object, ObjectMeta, ObjectSpec};
use crate::store::ObjectStore;
use std::future::Future;

/// Token the operator places on every reconciled object
pub const FINALIZER_TOKEN: &str = "uptimerobot.com/finalizer";

/// Where an object stands with respect to one finalizer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizerState {
    /// Token not yet added
    NoToken,
    /// Token present, deletion not requested
    TokenPresent,
    /// Deletion requested, cleanup still owed
    DeletionPending,
    /// Deletion requested and the token is gone
    Deleted,
}

impl FinalizerState {
    pub fn of(meta: &ObjectMeta, token: &str) -> Self {
        match (meta.is_deletion_requested(), meta.has_finalizer(token)) {
            (false, false) => FinalizerState::NoToken,
            (false, true) => FinalizerState::TokenPresent,
            (true, true) => FinalizerState::DeletionPending,
            (true, false) => FinalizerState::Deleted,
        }
    }
}

/// What [`finalize`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizerOutcome {
    /// Nothing to do; the caller may reconcile the object
    Unchanged,
    /// Token added and persisted
    Added,
    /// Cleanup ran and the token was removed
    Finalized,
    /// Deletion requested and our token is already gone; nothing left to do
    Released,
}

impl FinalizerOutcome {
    /// Whether the caller should go on to reconcile the object in this pass
    pub fn should_reconcile(&self) -> bool {
        matches!(self, FinalizerOutcome::Unchanged)
    }
}

/// Advance the finalizer state machine for `object` by one step.
///
/// `cleanup` runs only when deletion was requested and the token is still
/// present. The token is removed only after `cleanup` succeeds, so a failing
/// cleanup keeps the object alive and is retried on the next pass. On
/// success `object` is replaced with the persisted copy.
pub async fn finalize<S, St, F, Fut>(
    store: &St,
    object: &mut Object<S>,
    token: &str,
    cleanup: F,
) -> Result<FinalizerOutcome>
where
    S: ObjectSpec,
    St: ObjectStore<S> + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    match FinalizerState::of(&object.metadata, token) {
        FinalizerState::NoToken => {
            object.metadata.add_finalizer(token);
            *object = store.update(object).await?;
            tracing::debug!(kind = S::KIND, key = %object.key(), "finalizer added");
            Ok(FinalizerOutcome::Added)
        }
        FinalizerState::TokenPresent => Ok(FinalizerOutcome::Unchanged),
        FinalizerState::DeletionPending => {
            tracing::info!(kind = S::KIND, key = %object.key(), "running finalizer cleanup");
            cleanup().await?;

            object.metadata.remove_finalizer(token);
            *object = store.update(object).await?;
            tracing::info!(kind = S::KIND, key = %object.key(), "finalizer removed");
            Ok(FinalizerOutcome::Finalized)
        }
        FinalizerState::Deleted => Ok(FinalizerOutcome::Released),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OperatorError;
    use crate::object::{ObjectKey, ObjectMeta};
    use crate::resource::{AlertContactSpec, AlertContactType};
    use crate::store::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn seeded_store() -> (MemoryStore<AlertContactSpec>, ObjectKey) {
        let store = MemoryStore::new();
        let obj = Object::new(
            ObjectMeta::new("default", "ops"),
            AlertContactSpec {
                name: "ops".to_string(),
                contact_type: AlertContactType::Email,
                value: "ops@example.com".to_string(),
            },
        );
        let key = obj.key();
        store.create(obj).await.unwrap();
        (store, key)
    }

    #[tokio::test]
    async fn test_adds_token_once() {
        let (store, key) = seeded_store().await;
        let mut obj = store.get(&key).await.unwrap();

        let outcome = finalize(&store, &mut obj, FINALIZER_TOKEN, || async { Ok(()) })
            .await
            .unwrap();
        assert_eq!(outcome, FinalizerOutcome::Added);
        assert!(store.get(&key).await.unwrap().metadata.has_finalizer(FINALIZER_TOKEN));

        let outcome = finalize(&store, &mut obj, FINALIZER_TOKEN, || async { Ok(()) })
            .await
            .unwrap();
        assert_eq!(outcome, FinalizerOutcome::Unchanged);
        assert!(outcome.should_reconcile());
    }

    #[tokio::test]
    async fn test_failed_cleanup_keeps_token() {
        let (store, key) = seeded_store().await;
        let mut obj = store.get(&key).await.unwrap();
        finalize(&store, &mut obj, FINALIZER_TOKEN, || async { Ok(()) })
            .await
            .unwrap();
        store.request_deletion(&key).await.unwrap();

        let mut obj = store.get(&key).await.unwrap();
        let err = finalize(&store, &mut obj, FINALIZER_TOKEN, || async {
            Err(OperatorError::remote(std::io::Error::other("503")))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, OperatorError::Remote(_)));
        let stored = store.get(&key).await.unwrap();
        assert_eq!(
            FinalizerState::of(&stored.metadata, FINALIZER_TOKEN),
            FinalizerState::DeletionPending
        );
    }

    #[tokio::test]
    async fn test_cleanup_runs_before_removal_and_only_once() {
        let (store, key) = seeded_store().await;
        let deletes = AtomicUsize::new(0);
        let removals = AtomicUsize::new(0);
        let deletes_ref = &deletes;

        let mut obj = store.get(&key).await.unwrap();
        finalize(&store, &mut obj, FINALIZER_TOKEN, || async { Ok(()) })
            .await
            .unwrap();
        store.request_deletion(&key).await.unwrap();

        // two failures, then success
        for attempt in 0..3 {
            let mut obj = store.get(&key).await.unwrap();
            let result = finalize(&store, &mut obj, FINALIZER_TOKEN, move || async move {
                deletes_ref.fetch_add(1, Ordering::SeqCst);
                if attempt < 2 {
                    Err(OperatorError::remote(std::io::Error::other("flaky")))
                } else {
                    Ok(())
                }
            })
            .await;
            if let Ok(FinalizerOutcome::Finalized) = result {
                assert!(deletes.load(Ordering::SeqCst) >= 1);
                removals.fetch_add(1, Ordering::SeqCst);
            }
        }

        assert_eq!(deletes.load(Ordering::SeqCst), 3);
        assert_eq!(removals.load(Ordering::SeqCst), 1);
        assert!(store.get(&key).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_released_does_not_run_cleanup() {
        let mut meta = ObjectMeta::new("default", "gone");
        meta.deletion_requested_at = Some(chrono::Utc::now());
        assert_eq!(
            FinalizerState::of(&meta, FINALIZER_TOKEN),
            FinalizerState::Deleted
        );

        let store: MemoryStore<AlertContactSpec> = MemoryStore::new();
        let mut obj = Object::new(
            meta,
            AlertContactSpec {
                name: "gone".to_string(),
                contact_type: AlertContactType::Slack,
                value: "https://hooks.slack.com/x".to_string(),
            },
        );
        let cleanups = AtomicUsize::new(0);
        let cleanups_ref = &cleanups;
        let outcome = finalize(&store, &mut obj, FINALIZER_TOKEN, move || async move {
            cleanups_ref.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await
        .unwrap();
        assert_eq!(outcome, FinalizerOutcome::Released);
        assert_eq!(cleanups.load(Ordering::SeqCst), 0);
    }
}
