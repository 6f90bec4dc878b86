use super::{Controller, into_action, persist_status, store_keys};
use crate::adapters::fetch_account_status;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use uptime_operator_core::{Action, AccountSpec, ObjectKey, ObjectSpec, ObjectStore, Result};
use uptimerobot_client::AccountApi;

/// Refreshes account details into status; never writes to the API
pub struct AccountController<G: ?Sized> {
    store: Arc<dyn ObjectStore<AccountSpec>>,
    api: Arc<G>,
    interval: Duration,
}

impl<G: AccountApi + ?Sized + 'static> AccountController<G> {
    pub fn new(store: Arc<dyn ObjectStore<AccountSpec>>, api: Arc<G>, interval: Duration) -> Self {
        Self {
            store,
            api,
            interval,
        }
    }

    pub async fn reconcile(&self, key: &ObjectKey) -> Result<Action> {
        let object = match self.store.get(key).await {
            Ok(object) => object,
            Err(e) if e.is_not_found() => return Ok(Action::Done),
            Err(e) => return Err(e),
        };
        if object.metadata.is_deletion_requested() {
            return Ok(Action::Done);
        }

        let status = fetch_account_status(self.api.as_ref()).await?;
        if status != object.status {
            tracing::info!(
                kind = AccountSpec::KIND,
                key = %key,
                up = status.up_monitors,
                down = status.down_monitors,
                paused = status.paused_monitors,
                "account status changed"
            );
            persist_status::<AccountSpec, _>(self.store.as_ref(), key, status).await?;
        }

        Ok(Action::RequeueAfter(self.interval))
    }
}

#[async_trait]
impl<G: AccountApi + ?Sized + 'static> Controller for AccountController<G> {
    fn kind(&self) -> &'static str {
        AccountSpec::KIND
    }

    async fn list_keys(&self) -> Result<Vec<ObjectKey>> {
        store_keys::<AccountSpec, _>(self.store.as_ref()).await
    }

    fn watch(&self) -> broadcast::Receiver<ObjectKey> {
        self.store.watch()
    }

    async fn on_notify(&self, key: &ObjectKey) -> Action {
        let result = self.reconcile(key).await;
        into_action(AccountSpec::KIND, key, result, self.interval)
    }
}
