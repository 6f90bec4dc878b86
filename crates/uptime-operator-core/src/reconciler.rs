//! Generic create-or-update reconciler
//!
//! [`reconcile_api_object`] decides, for one intent object, whether the
//! remote side needs a create, an edit, or nothing at all, and performs at
//! most one mutating call. Kinds plug in through [`ApiObjectReconciler`].

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Outcome of one reconcile pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationResult {
    /// Remote object already matched; no mutating call was made
    None,
    /// Remote object was created
    Created,
    /// Remote object was edited
    Updated,
}

impl std::fmt::Display for OperationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationResult::None => write!(f, "unchanged"),
            OperationResult::Created => write!(f, "created"),
            OperationResult::Updated => write!(f, "updated"),
        }
    }
}

/// Working value of one reconcile pass: remote identity plus desired fields.
///
/// Equality is the diff: two values that compare equal need no edit.
pub trait ApiObject: Clone + PartialEq + Debug + Send + Sync {
    /// Remote identity, empty when nothing has been created yet
    fn remote_id(&self) -> &str;

    /// Copy the identity and service-side status fields from a remote snapshot.
    fn adopt_remote_state(&mut self, remote: &Self);
}

/// Remote operations for one object kind
#[async_trait]
pub trait ApiObjectReconciler<T: ApiObject>: Send + Sync {
    /// Whether the remote object exists. "Not found" is `Ok(false)`.
    async fn exists(&self, object: &T) -> Result<bool>;

    /// Current remote snapshot of the object.
    async fn fetch(&self, object: &T) -> Result<T>;

    /// Create the remote object and write the assigned identity and status back.
    async fn create(&self, object: &mut T) -> Result<()>;

    /// Push the desired fields of `object` to the remote side.
    async fn edit(&self, object: &T) -> Result<()>;
}

/// Converge the remote object towards `object`.
///
/// `mutate` fills the desired fields and runs before any remote call, so a
/// mutation error leaves the remote side untouched. Errors other than
/// "not found" from `exists` abort the pass unchanged.
pub async fn reconcile_api_object<T, R, F>(
    reconciler: &R,
    object: &mut T,
    mutate: F,
) -> Result<OperationResult>
where
    T: ApiObject,
    R: ApiObjectReconciler<T> + ?Sized,
    F: FnOnce(&mut T) -> Result<()>,
{
    mutate(object)?;

    let exists = if object.remote_id().is_empty() {
        false
    } else {
        reconciler.exists(object).await?
    };

    if !exists {
        tracing::info!(object = ?object, "no api resource exists, creating");
        reconciler.create(object).await?;
        tracing::debug!(remote_id = object.remote_id(), "api resource created");
        return Ok(OperationResult::Created);
    }

    let remote = reconciler.fetch(object).await?;
    if remote == *object {
        tracing::debug!(remote_id = object.remote_id(), "api resource is in sync");
        return Ok(OperationResult::None);
    }

    tracing::info!(
        from = ?remote,
        to = ?object,
        "api resource out of sync, updating"
    );
    reconciler.edit(object).await?;
    object.adopt_remote_state(&remote);

    Ok(OperationResult::Updated)
}
