use super::{Controller, into_action, persist_status, store_keys};
use crate::adapters::monitor::resolve_alert_contacts;
use crate::adapters::{MonitorAdapter, MonitorIntent};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use uptime_operator_core::{
    Action, AlertContactSpec, FINALIZER_TOKEN, MonitorSpec, ObjectKey, ObjectSpec, ObjectStore,
    OperationResult, Result, finalize, reconcile_api_object,
};
use uptimerobot_client::MonitorApi;

pub struct MonitorController<G: ?Sized> {
    store: Arc<dyn ObjectStore<MonitorSpec>>,
    alert_contacts: Arc<dyn ObjectStore<AlertContactSpec>>,
    api: Arc<G>,
    interval: Duration,
}

impl<G: MonitorApi + ?Sized + 'static> MonitorController<G> {
    pub fn new(
        store: Arc<dyn ObjectStore<MonitorSpec>>,
        alert_contacts: Arc<dyn ObjectStore<AlertContactSpec>>,
        api: Arc<G>,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            alert_contacts,
            api,
            interval,
        }
    }

    pub async fn reconcile(&self, key: &ObjectKey) -> Result<Action> {
        let mut object = match self.store.get(key).await {
            Ok(object) => object,
            Err(e) if e.is_not_found() => return Ok(Action::Done),
            Err(e) => return Err(e),
        };

        let adapter = MonitorAdapter::new(self.api.as_ref());
        let remote_id = object.status.id.clone();
        let outcome = finalize(self.store.as_ref(), &mut object, FINALIZER_TOKEN, || {
            adapter.delete(&remote_id)
        })
        .await?;
        if !outcome.should_reconcile() {
            tracing::debug!(kind = MonitorSpec::KIND, key = %key, ?outcome, "finalizer step");
            return Ok(Action::RequeueAfter(self.interval));
        }

        let contact_ids = resolve_alert_contacts(
            self.alert_contacts.as_ref(),
            &object.metadata.namespace,
            object.spec.alert_contacts.as_ref(),
        )
        .await?;

        let mut intent = MonitorIntent::observed(&object.status);
        let spec = object.spec.clone();
        let result =
            reconcile_api_object(&adapter, &mut intent, |i| i.apply_spec(&spec, contact_ids))
                .await?;

        tracing::info!(
            kind = MonitorSpec::KIND,
            key = %key,
            remote_id = %intent.id,
            alert_contacts = intent.alert_contacts.len(),
            result = %result,
            "reconciled"
        );

        if result != OperationResult::None {
            let status = intent.to_status()?;
            persist_status::<MonitorSpec, _>(self.store.as_ref(), key, status).await?;
        }

        Ok(Action::RequeueAfter(self.interval))
    }
}

#[async_trait]
impl<G: MonitorApi + ?Sized + 'static> Controller for MonitorController<G> {
    fn kind(&self) -> &'static str {
        MonitorSpec::KIND
    }

    async fn list_keys(&self) -> Result<Vec<ObjectKey>> {
        store_keys::<MonitorSpec, _>(self.store.as_ref()).await
    }

    fn watch(&self) -> broadcast::Receiver<ObjectKey> {
        self.store.watch()
    }

    async fn on_notify(&self, key: &ObjectKey) -> Action {
        let result = self.reconcile(key).await;
        into_action(MonitorSpec::KIND, key, result, self.interval)
    }
}
