//! Monitor adapter

use super::{delete_remote, remote_error};
use async_trait::async_trait;
use uptime_operator_core::{
    AlertContactSpec, ApiObject, ApiObjectReconciler, KeywordCheck, KeywordMatch, LabelSelector,
    MonitorSpec, MonitorStatus, MonitorType, ObjectStore, OperatorError, PortCheck, PortService,
    Result,
};
use uptimerobot_client::{MonitorApi, MonitorRequest, RemoteMonitor};

pub fn type_code(monitor_type: MonitorType) -> i32 {
    match monitor_type {
        MonitorType::Http => 1,
        MonitorType::Keyword => 2,
        MonitorType::Ping => 3,
        MonitorType::Port => 4,
        MonitorType::Heartbeat => 5,
    }
}

pub fn type_from_code(code: i32) -> Result<MonitorType> {
    MonitorType::ALL
        .into_iter()
        .find(|t| type_code(*t) == code)
        .ok_or_else(|| {
            OperatorError::Validation(format!("unrecognised monitor type code: {}", code))
        })
}

pub fn keyword_code(alert_when: KeywordMatch) -> i32 {
    match alert_when {
        KeywordMatch::Exists => 1,
        KeywordMatch::NotExists => 2,
    }
}

pub fn port_code(service: PortService) -> i32 {
    match service {
        PortService::Http => 1,
        PortService::Https => 2,
        PortService::Ftp => 3,
        PortService::Smtp => 4,
        PortService::Pop3 => 5,
        PortService::Imap => 6,
        PortService::Custom => 99,
    }
}

fn keyword_from_codes(code: i32, value: &str) -> Result<Option<KeywordCheck>> {
    if code == 0 {
        return Ok(None);
    }
    let alert_when = KeywordMatch::ALL
        .into_iter()
        .find(|k| keyword_code(*k) == code)
        .ok_or_else(|| {
            OperatorError::Validation(format!("unrecognised keyword type code: {}", code))
        })?;
    Ok(Some(KeywordCheck {
        alert_when,
        value: value.to_string(),
    }))
}

fn port_from_codes(sub_type: i32, port: i32) -> Result<Option<PortCheck>> {
    if sub_type == 0 {
        return Ok(None);
    }
    let service = PortService::ALL
        .into_iter()
        .find(|p| port_code(*p) == sub_type)
        .ok_or_else(|| {
            OperatorError::Validation(format!("unrecognised port sub type code: {}", sub_type))
        })?;
    let port = u16::try_from(port).ok().filter(|p| *p != 0);
    Ok(Some(PortCheck { service, port }))
}

/// Remote ids of the alert contacts a monitor selects.
///
/// Only contacts in the monitor's namespace that already have a remote id
/// are included; the rest are picked up on a later pass. The result is
/// sorted so it compares independently of listing order.
pub async fn resolve_alert_contacts<St>(
    store: &St,
    namespace: &str,
    selector: Option<&LabelSelector>,
) -> Result<Vec<String>>
where
    St: ObjectStore<AlertContactSpec> + ?Sized,
{
    let Some(selector) = selector else {
        return Ok(Vec::new());
    };

    let mut ids: Vec<String> = store
        .list(Some(namespace), selector)
        .await?
        .into_iter()
        .map(|c| c.status.id)
        .filter(|id| !id.is_empty())
        .collect();
    ids.sort();
    ids.dedup();
    Ok(ids)
}

/// Working value for one monitor pass
#[derive(Debug, Clone, Default)]
pub struct MonitorIntent {
    pub id: String,
    pub name: String,
    pub url: String,
    pub monitor_type: i32,
    pub interval: u32,
    pub alert_contacts: Vec<String>,
    pub sub_type: i32,
    pub port: i32,
    pub keyword_type: i32,
    pub keyword_value: String,
    pub status: i32,
}

impl PartialEq for MonitorIntent {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.url == other.url
            && self.monitor_type == other.monitor_type
            && self.interval == other.interval
            && self.alert_contacts == other.alert_contacts
            && self.sub_type == other.sub_type
            && self.port == other.port
            && self.keyword_type == other.keyword_type
            && self.keyword_value == other.keyword_value
    }
}

impl MonitorIntent {
    pub fn observed(status: &MonitorStatus) -> Self {
        Self {
            id: status.id.clone(),
            status: status.status,
            ..Self::default()
        }
    }

    pub fn apply_spec(&mut self, spec: &MonitorSpec, mut alert_contacts: Vec<String>) -> Result<()> {
        spec.validate()?;
        alert_contacts.sort();
        alert_contacts.dedup();

        self.name = spec.name.clone();
        self.url = spec.url.clone();
        self.monitor_type = type_code(spec.monitor_type);
        self.interval = spec.interval;
        self.alert_contacts = alert_contacts;

        (self.keyword_type, self.keyword_value) = match &spec.keyword {
            Some(k) => (keyword_code(k.alert_when), k.value.clone()),
            None => (0, String::new()),
        };
        (self.sub_type, self.port) = match &spec.port {
            Some(p) => (port_code(p.service), p.port.map(i32::from).unwrap_or(0)),
            None => (0, 0),
        };
        Ok(())
    }

    pub fn from_remote(remote: &RemoteMonitor) -> Self {
        let mut alert_contacts = remote.alert_contact_ids();
        alert_contacts.sort();
        Self {
            id: remote.id.clone(),
            name: remote.friendly_name.clone(),
            url: remote.url.clone(),
            monitor_type: remote.monitor_type,
            interval: remote.interval,
            alert_contacts,
            sub_type: remote.sub_type,
            port: remote.port,
            keyword_type: remote.keyword_type,
            keyword_value: remote.keyword_value.clone(),
            status: remote.status,
        }
    }

    pub fn to_request(&self) -> MonitorRequest {
        MonitorRequest {
            friendly_name: self.name.clone(),
            url: self.url.clone(),
            monitor_type: self.monitor_type,
            interval: self.interval,
            alert_contacts: self.alert_contacts.clone(),
            sub_type: self.sub_type,
            port: self.port,
            keyword_type: self.keyword_type,
            keyword_value: self.keyword_value.clone(),
        }
    }

    pub fn to_status(&self) -> Result<MonitorStatus> {
        Ok(MonitorStatus {
            id: self.id.clone(),
            name: self.name.clone(),
            url: self.url.clone(),
            monitor_type: Some(type_from_code(self.monitor_type)?),
            interval: self.interval,
            alert_contacts: self.alert_contacts.clone(),
            keyword: keyword_from_codes(self.keyword_type, &self.keyword_value)?,
            port: port_from_codes(self.sub_type, self.port)?,
            status: self.status,
        })
    }
}

impl ApiObject for MonitorIntent {
    fn remote_id(&self) -> &str {
        &self.id
    }

    fn adopt_remote_state(&mut self, remote: &Self) {
        self.id = remote.id.clone();
        self.status = remote.status;
    }
}

/// Binds the generic reconciler to a [`MonitorApi`]
pub struct MonitorAdapter<'a, G: ?Sized> {
    api: &'a G,
}

impl<'a, G: MonitorApi + ?Sized> MonitorAdapter<'a, G> {
    pub fn new(api: &'a G) -> Self {
        Self { api }
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        delete_remote(id, |id| async move { self.api.delete_monitor(&id).await }).await
    }

    async fn lookup(&self, id: &str) -> Result<Option<RemoteMonitor>> {
        match self.api.get_monitors(&[id.to_string()]).await {
            Ok(monitors) => Ok(monitors.into_iter().find(|m| m.id == id)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(remote_error(e)),
        }
    }
}

#[async_trait]
impl<'a, G: MonitorApi + ?Sized> ApiObjectReconciler<MonitorIntent> for MonitorAdapter<'a, G> {
    async fn exists(&self, object: &MonitorIntent) -> Result<bool> {
        Ok(self.lookup(&object.id).await?.is_some())
    }

    async fn fetch(&self, object: &MonitorIntent) -> Result<MonitorIntent> {
        let remote = self
            .lookup(&object.id)
            .await?
            .ok_or_else(|| OperatorError::NotFound(format!("monitor {}", object.id)))?;

        if remote.monitor_type != object.monitor_type {
            return Err(OperatorError::Validation(format!(
                "monitor {} has type code {} remotely; the type cannot be changed in place",
                object.id, remote.monitor_type
            )));
        }

        let mut snapshot = MonitorIntent::from_remote(&remote);
        // Values the service fills in itself: the push URL of a heartbeat
        // and the well-known port of a named port service.
        if object.monitor_type == type_code(MonitorType::Heartbeat) && object.url.is_empty() {
            snapshot.url.clear();
        }
        if object.sub_type != port_code(PortService::Custom) && object.port == 0 {
            snapshot.port = 0;
        }
        Ok(snapshot)
    }

    async fn create(&self, object: &mut MonitorIntent) -> Result<()> {
        let created = self
            .api
            .new_monitor(&object.to_request())
            .await
            .map_err(remote_error)?;
        object.id = created.id;
        object.status = created.status;
        Ok(())
    }

    async fn edit(&self, object: &MonitorIntent) -> Result<()> {
        self.api
            .edit_monitor(&object.id, &object.to_request())
            .await
            .map_err(remote_error)
    }
}
