//! Apply a parsed manifest to the object stores
//!
//! New declarations are created, changed specs and labels are written with
//! status and finalizers left alone, and objects that disappeared from the
//! manifest get a deletion request so their finalizer can clean up remotely.

use crate::manifest::Manifest;
use crate::stores::Stores;
use std::collections::BTreeMap;
use uptime_operator_core::{LabelSelector, Object, ObjectSpec, ObjectStore, OperatorError, Result};

/// What one sync changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub deletion_requested: usize,
    pub unchanged: usize,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.updated == 0 && self.deletion_requested == 0
    }

    fn merge(&mut self, other: SyncReport) {
        self.created += other.created;
        self.updated += other.updated;
        self.deletion_requested += other.deletion_requested;
        self.unchanged += other.unchanged;
    }
}

impl std::fmt::Display for SyncReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} deleting, {} unchanged",
            self.created, self.updated, self.deletion_requested, self.unchanged
        )
    }
}

/// Bring every store in line with `manifest`.
pub async fn sync_manifest(stores: &Stores, manifest: &Manifest) -> Result<SyncReport> {
    let mut report = SyncReport::default();
    report.merge(sync_kind(stores.alert_contacts.as_ref(), &manifest.alert_contacts).await?);
    report.merge(sync_kind(stores.monitors.as_ref(), &manifest.monitors).await?);
    report.merge(sync_kind(stores.accounts.as_ref(), &manifest.accounts).await?);
    Ok(report)
}

/// Sync one kind. A write that loses a race with a controller is skipped and
/// picked up by the next sync.
pub async fn sync_kind<S, St>(store: &St, declared: &[Object<S>]) -> Result<SyncReport>
where
    S: ObjectSpec,
    St: ObjectStore<S> + ?Sized,
{
    let mut report = SyncReport::default();
    let mut existing: BTreeMap<_, _> = store
        .list(None, &LabelSelector::new())
        .await?
        .into_iter()
        .map(|o| (o.key(), o))
        .collect();

    for object in declared {
        let key = object.key();
        match existing.remove(&key) {
            None => match store.create(object.clone()).await {
                Ok(_) => {
                    tracing::info!(kind = S::KIND, key = %key, "declared");
                    report.created += 1;
                }
                Err(OperatorError::AlreadyExists(_)) => report.unchanged += 1,
                Err(e) => return Err(e),
            },
            Some(current) if current.metadata.is_deletion_requested() => {
                // Recreated once the pending deletion has finished
                tracing::debug!(kind = S::KIND, key = %key, "waiting for pending deletion");
                report.unchanged += 1;
            }
            Some(mut current) => {
                if current.spec == object.spec && current.metadata.labels == object.metadata.labels
                {
                    report.unchanged += 1;
                    continue;
                }
                current.spec = object.spec.clone();
                current.metadata.labels = object.metadata.labels.clone();
                match store.update(&current).await {
                    Ok(_) => {
                        tracing::info!(kind = S::KIND, key = %key, "declaration changed");
                        report.updated += 1;
                    }
                    Err(OperatorError::Conflict(_)) => {
                        tracing::debug!(kind = S::KIND, key = %key, "conflict, retrying on next sync");
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }

    for (key, current) in existing {
        if current.metadata.is_deletion_requested() {
            continue;
        }
        match store.request_deletion(&key).await {
            Ok(()) => {
                tracing::info!(kind = S::KIND, key = %key, "no longer declared, deleting");
                report.deletion_requested += 1;
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
    }

    Ok(report)
}
