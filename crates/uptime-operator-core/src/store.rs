//! Object store with watch notifications
//!
//! Controllers only see the [`ObjectStore`] trait. [`MemoryStore`] is the
//! implementation the operator runs with; its contents are snapshotted to
//! disk by [`crate::state::StateManager`].

use crate::error::{OperatorError, Result};
use crate::object::{LabelSelector, Object, ObjectKey, ObjectSpec};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::{RwLock, broadcast};

const WATCH_CAPACITY: usize = 256;

/// Storage and watch interface for declared objects of kind `S`
#[async_trait]
pub trait ObjectStore<S: ObjectSpec>: Send + Sync {
    /// Load one object. A missing object is [`OperatorError::NotFound`].
    async fn get(&self, key: &ObjectKey) -> Result<Object<S>>;

    /// List objects matching `selector`, optionally restricted to a namespace.
    async fn list(&self, namespace: Option<&str>, selector: &LabelSelector)
    -> Result<Vec<Object<S>>>;

    /// Insert a new object.
    async fn create(&self, object: Object<S>) -> Result<Object<S>>;

    /// Write labels, finalizers and spec. The resource version must match the
    /// stored one, otherwise the write is rejected with `Conflict`.
    async fn update(&self, object: &Object<S>) -> Result<Object<S>>;

    /// Write only the status. Same version check as [`ObjectStore::update`].
    async fn update_status(&self, object: &Object<S>) -> Result<Object<S>>;

    /// Mark the object for deletion. It is removed once no finalizer remains.
    async fn request_deletion(&self, key: &ObjectKey) -> Result<()>;

    /// Subscribe to change notifications.
    fn watch(&self) -> broadcast::Receiver<ObjectKey>;
}

/// In-memory object store
pub struct MemoryStore<S: ObjectSpec> {
    objects: RwLock<BTreeMap<ObjectKey, Object<S>>>,
    events: broadcast::Sender<ObjectKey>,
}

impl<S: ObjectSpec> Default for MemoryStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ObjectSpec> MemoryStore<S> {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(WATCH_CAPACITY);
        Self {
            objects: RwLock::new(BTreeMap::new()),
            events,
        }
    }

    /// Restore a store from persisted objects
    pub fn from_objects(objects: Vec<Object<S>>) -> Self {
        let (events, _) = broadcast::channel(WATCH_CAPACITY);
        Self {
            objects: RwLock::new(objects.into_iter().map(|o| (o.key(), o)).collect()),
            events,
        }
    }

    /// Copy of every stored object
    pub async fn snapshot(&self) -> Vec<Object<S>> {
        self.objects.read().await.values().cloned().collect()
    }

    fn notify(&self, key: ObjectKey) {
        // No receiver is not an error; nobody is watching yet.
        let _ = self.events.send(key);
    }

    fn check_version(stored: &Object<S>, incoming: &Object<S>) -> Result<()> {
        if stored.metadata.resource_version != incoming.metadata.resource_version {
            return Err(OperatorError::Conflict(format!(
                "{} {} (stored version {}, write version {})",
                S::KIND,
                stored.key(),
                stored.metadata.resource_version,
                incoming.metadata.resource_version
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: ObjectSpec> ObjectStore<S> for MemoryStore<S> {
    async fn get(&self, key: &ObjectKey) -> Result<Object<S>> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| OperatorError::NotFound(format!("{} {}", S::KIND, key)))
    }

    async fn list(
        &self,
        namespace: Option<&str>,
        selector: &LabelSelector,
    ) -> Result<Vec<Object<S>>> {
        Ok(self
            .objects
            .read()
            .await
            .values()
            .filter(|o| namespace.is_none_or(|ns| o.metadata.namespace == ns))
            .filter(|o| selector.matches(&o.metadata.labels))
            .cloned()
            .collect())
    }

    async fn create(&self, mut object: Object<S>) -> Result<Object<S>> {
        let key = object.key();
        {
            let mut objects = self.objects.write().await;
            if objects.contains_key(&key) {
                return Err(OperatorError::AlreadyExists(format!("{} {}", S::KIND, key)));
            }
            object.metadata.resource_version = 1;
            object.metadata.deletion_requested_at = None;
            objects.insert(key.clone(), object.clone());
        }
        tracing::debug!(kind = S::KIND, key = %key, "object created");
        self.notify(key);
        Ok(object)
    }

    async fn update(&self, object: &Object<S>) -> Result<Object<S>> {
        let key = object.key();
        let written = {
            let mut objects = self.objects.write().await;
            let stored = objects
                .get_mut(&key)
                .ok_or_else(|| OperatorError::NotFound(format!("{} {}", S::KIND, key)))?;
            Self::check_version(stored, object)?;

            stored.metadata.labels = object.metadata.labels.clone();
            stored.metadata.finalizers = object.metadata.finalizers.clone();
            stored.spec = object.spec.clone();
            stored.metadata.resource_version += 1;
            let written = stored.clone();

            if written.metadata.is_deletion_requested() && written.metadata.finalizers.is_empty() {
                objects.remove(&key);
                tracing::debug!(kind = S::KIND, key = %key, "object removed");
            }
            written
        };
        self.notify(key);
        Ok(written)
    }

    async fn update_status(&self, object: &Object<S>) -> Result<Object<S>> {
        let key = object.key();
        let written = {
            let mut objects = self.objects.write().await;
            let stored = objects
                .get_mut(&key)
                .ok_or_else(|| OperatorError::NotFound(format!("{} {}", S::KIND, key)))?;
            Self::check_version(stored, object)?;

            stored.status = object.status.clone();
            stored.metadata.resource_version += 1;
            stored.clone()
        };
        self.notify(key);
        Ok(written)
    }

    async fn request_deletion(&self, key: &ObjectKey) -> Result<()> {
        {
            let mut objects = self.objects.write().await;
            let stored = objects
                .get_mut(key)
                .ok_or_else(|| OperatorError::NotFound(format!("{} {}", S::KIND, key)))?;
            if stored.metadata.is_deletion_requested() {
                return Ok(());
            }
            stored.metadata.deletion_requested_at = Some(Utc::now());
            stored.metadata.resource_version += 1;

            if stored.metadata.finalizers.is_empty() {
                objects.remove(key);
                tracing::debug!(kind = S::KIND, key = %key, "object removed");
            }
        }
        self.notify(key.clone());
        Ok(())
    }

    fn watch(&self) -> broadcast::Receiver<ObjectKey> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectMeta;
    use crate::resource::{AlertContactSpec, AlertContactType};

    fn contact(name: &str, team: &str) -> Object<AlertContactSpec> {
        Object::new(
            ObjectMeta::new("default", name).with_label("team", team),
            AlertContactSpec {
                name: name.to_string(),
                contact_type: AlertContactType::Email,
                value: format!("{}@example.com", name),
            },
        )
    }

    #[tokio::test]
    async fn test_create_get_list() {
        let store = MemoryStore::new();
        store.create(contact("a", "ops")).await.unwrap();
        store.create(contact("b", "dev")).await.unwrap();

        let a = store.get(&ObjectKey::new("default", "a")).await.unwrap();
        assert_eq!(a.metadata.resource_version, 1);

        let ops = store
            .list(None, &LabelSelector::new().with_label("team", "ops"))
            .await
            .unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].metadata.name, "a");

        let other_ns = store
            .list(Some("monitoring"), &LabelSelector::new())
            .await
            .unwrap();
        assert!(other_ns.is_empty());
    }

    #[tokio::test]
    async fn test_stale_write_conflicts() {
        let store = MemoryStore::new();
        let created = store.create(contact("a", "ops")).await.unwrap();

        let mut first = created.clone();
        first.status.id = "1".to_string();
        store.update_status(&first).await.unwrap();

        let mut stale = created;
        stale.metadata.add_finalizer("uptimerobot.com/finalizer");
        let err = store.update(&stale).await.unwrap_err();
        assert!(matches!(err, OperatorError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_deletion_waits_for_finalizers() {
        let store = MemoryStore::new();
        let key = ObjectKey::new("default", "a");
        let mut obj = store.create(contact("a", "ops")).await.unwrap();
        obj.metadata.add_finalizer("uptimerobot.com/finalizer");
        store.update(&obj).await.unwrap();

        store.request_deletion(&key).await.unwrap();
        let mut pending = store.get(&key).await.unwrap();
        assert!(pending.metadata.is_deletion_requested());

        pending.metadata.remove_finalizer("uptimerobot.com/finalizer");
        let written = store.update(&pending).await.unwrap();
        assert!(written.metadata.finalizers.is_empty());
        assert!(store.get(&key).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_deletion_without_finalizers_removes_immediately() {
        let store = MemoryStore::new();
        let key = ObjectKey::new("default", "a");
        store.create(contact("a", "ops")).await.unwrap();

        store.request_deletion(&key).await.unwrap();
        assert!(store.get(&key).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_deletion_marker_is_never_cleared() {
        let store = MemoryStore::new();
        let key = ObjectKey::new("default", "a");
        let mut obj = store.create(contact("a", "ops")).await.unwrap();
        obj.metadata.add_finalizer("uptimerobot.com/finalizer");
        store.update(&obj).await.unwrap();
        store.request_deletion(&key).await.unwrap();

        let mut obj = store.get(&key).await.unwrap();
        obj.metadata.deletion_requested_at = None;
        let written = store.update(&obj).await.unwrap();
        assert!(written.metadata.is_deletion_requested());
    }

    #[tokio::test]
    async fn test_watch_receives_keys() {
        let store = MemoryStore::new();
        let mut events = store.watch();
        store.create(contact("a", "ops")).await.unwrap();

        let key = events.recv().await.unwrap();
        assert_eq!(key, ObjectKey::new("default", "a"));
    }

    #[tokio::test]
    async fn test_from_objects_snapshot() {
        let store = MemoryStore::from_objects(vec![contact("a", "ops"), contact("b", "ops")]);
        assert_eq!(store.snapshot().await.len(), 2);
    }
}
