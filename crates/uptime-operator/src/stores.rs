//! Per-kind object stores and their persisted form

use std::sync::Arc;
use tokio::sync::broadcast;
use uptime_operator_core::{
    AccountSpec, AlertContactSpec, GlobalState, MemoryStore, MonitorSpec, ObjectKey, ObjectStore,
};

/// One store per kind, shared between the sync loop and the controllers
#[derive(Clone, Default)]
pub struct Stores {
    pub alert_contacts: Arc<MemoryStore<AlertContactSpec>>,
    pub monitors: Arc<MemoryStore<MonitorSpec>>,
    pub accounts: Arc<MemoryStore<AccountSpec>>,
}

impl Stores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the stores from a persisted state file
    pub fn from_state(state: GlobalState) -> Self {
        Self {
            alert_contacts: Arc::new(MemoryStore::from_objects(state.alert_contacts)),
            monitors: Arc::new(MemoryStore::from_objects(state.monitors)),
            accounts: Arc::new(MemoryStore::from_objects(state.accounts)),
        }
    }

    pub async fn snapshot(&self) -> GlobalState {
        let mut state = GlobalState::new();
        state.alert_contacts = self.alert_contacts.snapshot().await;
        state.monitors = self.monitors.snapshot().await;
        state.accounts = self.accounts.snapshot().await;
        state
    }

    /// Change notifications of every kind
    pub fn watch_all(&self) -> [broadcast::Receiver<ObjectKey>; 3] {
        [
            self.alert_contacts.watch(),
            self.monitors.watch(),
            self.accounts.watch(),
        ]
    }
}
