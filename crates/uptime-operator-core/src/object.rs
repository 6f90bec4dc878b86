//! Declared object model
//!
//! A declared object is the user's desired state for one remote resource.
//! It carries identity and bookkeeping metadata, the desired `spec`, and the
//! `status` the operator last observed on the remote side.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

pub const DEFAULT_NAMESPACE: &str = "default";

/// Stable local identity of a declared object
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Bookkeeping shared by every declared object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,

    pub namespace: String,

    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    /// Tokens blocking physical removal
    #[serde(default)]
    pub finalizers: BTreeSet<String>,

    /// Set once deletion is requested, never cleared
    #[serde(default)]
    pub deletion_requested_at: Option<DateTime<Utc>>,

    /// Store-assigned version for optimistic concurrency
    #[serde(default)]
    pub resource_version: u64,

    pub created_at: DateTime<Utc>,
}

impl ObjectMeta {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            labels: BTreeMap::new(),
            finalizers: BTreeSet::new(),
            deletion_requested_at: None,
            resource_version: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(&self.namespace, &self.name)
    }

    pub fn is_deletion_requested(&self) -> bool {
        self.deletion_requested_at.is_some()
    }

    pub fn has_finalizer(&self, token: &str) -> bool {
        self.finalizers.contains(token)
    }

    /// Returns `true` if the token was not present before.
    pub fn add_finalizer(&mut self, token: &str) -> bool {
        self.finalizers.insert(token.to_string())
    }

    /// Returns `true` if the token was present.
    pub fn remove_finalizer(&mut self, token: &str) -> bool {
        self.finalizers.remove(token)
    }
}

/// Desired-state schema of one object kind
pub trait ObjectSpec:
    Clone + PartialEq + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Kind name used in logs and in the manifest (e.g. "alert-contact")
    const KIND: &'static str;

    /// Observed-state schema written back by the controller
    type Status: Clone + Default + PartialEq + Debug + Serialize + DeserializeOwned + Send + Sync;
}

/// A declared object of kind `S`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Object<S: ObjectSpec> {
    pub metadata: ObjectMeta,

    pub spec: S,

    #[serde(default)]
    pub status: S::Status,
}

impl<S: ObjectSpec> Object<S> {
    pub fn new(metadata: ObjectMeta, spec: S) -> Self {
        Self {
            metadata,
            spec,
            status: S::Status::default(),
        }
    }

    pub fn key(&self) -> ObjectKey {
        self.metadata.key()
    }

    pub fn kind(&self) -> &'static str {
        S::KIND
    }
}

/// Equality-based label selector
///
/// An empty selector matches every object, the same as an empty
/// `matchLabels` does in Kubernetes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSelector {
    #[serde(default)]
    pub match_labels: BTreeMap<String, String>,
}

impl LabelSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.match_labels.insert(key.into(), value.into());
        self
    }

    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.match_labels
            .iter()
            .all(|(k, v)| labels.get(k).is_some_and(|actual| actual == v))
    }
}

impl std::fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pairs: Vec<String> = self
            .match_labels
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        write!(f, "{}", pairs.join(","))
    }
}
