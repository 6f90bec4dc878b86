use super::{Controller, into_action, persist_status, store_keys};
use crate::adapters::{AlertContactAdapter, AlertContactIntent};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use uptime_operator_core::{
    Action, AlertContactSpec, FINALIZER_TOKEN, ObjectKey, ObjectSpec, ObjectStore,
    OperationResult, Result, finalize, reconcile_api_object,
};
use uptimerobot_client::AlertContactApi;

pub struct AlertContactController<G: ?Sized> {
    store: Arc<dyn ObjectStore<AlertContactSpec>>,
    api: Arc<G>,
    interval: Duration,
}

impl<G: AlertContactApi + ?Sized + 'static> AlertContactController<G> {
    pub fn new(
        store: Arc<dyn ObjectStore<AlertContactSpec>>,
        api: Arc<G>,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            api,
            interval,
        }
    }

    /// One pass for `key`
    pub async fn reconcile(&self, key: &ObjectKey) -> Result<Action> {
        let mut object = match self.store.get(key).await {
            Ok(object) => object,
            Err(e) if e.is_not_found() => return Ok(Action::Done),
            Err(e) => return Err(e),
        };

        let adapter = AlertContactAdapter::new(self.api.as_ref());
        let remote_id = object.status.id.clone();
        let outcome = finalize(self.store.as_ref(), &mut object, FINALIZER_TOKEN, || {
            adapter.delete(&remote_id)
        })
        .await?;
        if !outcome.should_reconcile() {
            tracing::debug!(kind = AlertContactSpec::KIND, key = %key, ?outcome, "finalizer step");
            return Ok(Action::RequeueAfter(self.interval));
        }

        let mut intent = AlertContactIntent::observed(&object.status);
        let spec = object.spec.clone();
        let result = reconcile_api_object(&adapter, &mut intent, |i| i.apply_spec(&spec)).await?;

        tracing::info!(
            kind = AlertContactSpec::KIND,
            key = %key,
            remote_id = %intent.id,
            result = %result,
            "reconciled"
        );

        if result != OperationResult::None {
            let status = intent.to_status()?;
            persist_status::<AlertContactSpec, _>(self.store.as_ref(), key, status).await?;
        }

        Ok(Action::RequeueAfter(self.interval))
    }
}

#[async_trait]
impl<G: AlertContactApi + ?Sized + 'static> Controller for AlertContactController<G> {
    fn kind(&self) -> &'static str {
        AlertContactSpec::KIND
    }

    async fn list_keys(&self) -> Result<Vec<ObjectKey>> {
        store_keys::<AlertContactSpec, _>(self.store.as_ref()).await
    }

    fn watch(&self) -> broadcast::Receiver<ObjectKey> {
        self.store.watch()
    }

    async fn on_notify(&self, key: &ObjectKey) -> Action {
        let result = self.reconcile(key).await;
        into_action(AlertContactSpec::KIND, key, result, self.interval)
    }
}
