//! In-memory UptimeRobot used by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;
use uptimerobot_client::{
    AccountApi, AccountDetails, AlertContactApi, CreatedAlertContact, CreatedMonitor,
    MonitorAlertContact, MonitorApi, MonitorRequest, RemoteAlertContact, RemoteMonitor, Result,
    UptimeRobotError,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    NewAlertContact { contact_type: i32, value: String, name: String },
    EditAlertContact { id: String, value: String, name: String },
    DeleteAlertContact(String),
    NewMonitor(MonitorRequest),
    EditMonitor(String, MonitorRequest),
    DeleteMonitor(String),
}

#[derive(Default)]
struct Remote {
    next_id: u64,
    contacts: BTreeMap<String, RemoteAlertContact>,
    monitors: BTreeMap<String, RemoteMonitor>,
    account: AccountDetails,
    calls: Vec<Call>,
    reads: usize,
    fail_deletes: bool,
}

impl Remote {
    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        (100 + self.next_id).to_string()
    }
}

#[derive(Default)]
pub struct FakeUptimeRobot {
    remote: Mutex<Remote>,
}

impl FakeUptimeRobot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutating calls in the order they were made
    pub fn calls(&self) -> Vec<Call> {
        self.remote.lock().unwrap().calls.clone()
    }

    pub fn reads(&self) -> usize {
        self.remote.lock().unwrap().reads
    }

    pub fn contact(&self, id: &str) -> Option<RemoteAlertContact> {
        self.remote.lock().unwrap().contacts.get(id).cloned()
    }

    pub fn monitor(&self, id: &str) -> Option<RemoteMonitor> {
        self.remote.lock().unwrap().monitors.get(id).cloned()
    }

    pub fn contact_count(&self) -> usize {
        self.remote.lock().unwrap().contacts.len()
    }

    pub fn monitor_count(&self) -> usize {
        self.remote.lock().unwrap().monitors.len()
    }

    /// Delete a contact behind the operator's back
    pub fn drop_contact(&self, id: &str) {
        self.remote.lock().unwrap().contacts.remove(id);
    }

    /// Rename a contact behind the operator's back
    pub fn rename_contact(&self, id: &str, name: &str) {
        if let Some(contact) = self.remote.lock().unwrap().contacts.get_mut(id) {
            contact.friendly_name = name.to_string();
        }
    }

    /// Point a monitor somewhere else behind the operator's back
    pub fn retarget_monitor(&self, id: &str, url: &str) {
        if let Some(monitor) = self.remote.lock().unwrap().monitors.get_mut(id) {
            monitor.url = url.to_string();
        }
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.remote.lock().unwrap().fail_deletes = fail;
    }

    pub fn set_account(&self, account: AccountDetails) {
        self.remote.lock().unwrap().account = account;
    }
}

/// Port the service assumes for a named port monitor
fn well_known_port(sub_type: i32) -> i32 {
    match sub_type {
        1 => 80,
        2 => 443,
        3 => 21,
        4 => 25,
        5 => 110,
        6 => 143,
        _ => 0,
    }
}

fn contact_refs(ids: &[String]) -> Vec<MonitorAlertContact> {
    ids.iter()
        .map(|id| MonitorAlertContact { id: id.clone() })
        .collect()
}

fn unavailable() -> UptimeRobotError {
    UptimeRobotError::HttpStatus {
        status: 503,
        body: "service unavailable".to_string(),
    }
}

#[async_trait]
impl AlertContactApi for FakeUptimeRobot {
    async fn new_alert_contact(
        &self,
        contact_type: i32,
        value: &str,
        friendly_name: &str,
    ) -> Result<CreatedAlertContact> {
        let mut remote = self.remote.lock().unwrap();
        remote.calls.push(Call::NewAlertContact {
            contact_type,
            value: value.to_string(),
            name: friendly_name.to_string(),
        });
        let id = remote.allocate_id();
        remote.contacts.insert(
            id.clone(),
            RemoteAlertContact {
                id: id.clone(),
                friendly_name: friendly_name.to_string(),
                contact_type,
                status: 2,
                value: value.to_string(),
            },
        );
        Ok(CreatedAlertContact { id, status: 2 })
    }

    async fn edit_alert_contact(&self, id: &str, value: &str, friendly_name: &str) -> Result<()> {
        let mut remote = self.remote.lock().unwrap();
        remote.calls.push(Call::EditAlertContact {
            id: id.to_string(),
            value: value.to_string(),
            name: friendly_name.to_string(),
        });
        let contact = remote
            .contacts
            .get_mut(id)
            .ok_or_else(|| UptimeRobotError::NotFound(format!("alert contact {id}")))?;
        contact.value = value.to_string();
        contact.friendly_name = friendly_name.to_string();
        Ok(())
    }

    async fn get_alert_contacts(&self, ids: &[String]) -> Result<Vec<RemoteAlertContact>> {
        let mut remote = self.remote.lock().unwrap();
        remote.reads += 1;
        Ok(ids
            .iter()
            .filter_map(|id| remote.contacts.get(id).cloned())
            .collect())
    }

    async fn delete_alert_contact(&self, id: &str) -> Result<()> {
        let mut remote = self.remote.lock().unwrap();
        remote.calls.push(Call::DeleteAlertContact(id.to_string()));
        if remote.fail_deletes {
            return Err(unavailable());
        }
        remote
            .contacts
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| UptimeRobotError::NotFound(format!("alert contact {id}")))
    }
}

#[async_trait]
impl MonitorApi for FakeUptimeRobot {
    async fn new_monitor(&self, request: &MonitorRequest) -> Result<CreatedMonitor> {
        let mut remote = self.remote.lock().unwrap();
        remote.calls.push(Call::NewMonitor(request.clone()));
        let id = remote.allocate_id();
        let url = if request.url.is_empty() && request.monitor_type == 5 {
            format!("https://heartbeat.uptimerobot.com/m{id}")
        } else {
            request.url.clone()
        };
        let port = if request.port == 0 {
            well_known_port(request.sub_type)
        } else {
            request.port
        };
        remote.monitors.insert(
            id.clone(),
            RemoteMonitor {
                id: id.clone(),
                friendly_name: request.friendly_name.clone(),
                url,
                monitor_type: request.monitor_type,
                interval: request.interval,
                status: 1,
                alert_contacts: contact_refs(&request.alert_contacts),
                sub_type: request.sub_type,
                port,
                keyword_type: request.keyword_type,
                keyword_value: request.keyword_value.clone(),
            },
        );
        Ok(CreatedMonitor { id, status: 1 })
    }

    async fn edit_monitor(&self, id: &str, request: &MonitorRequest) -> Result<()> {
        let mut remote = self.remote.lock().unwrap();
        remote
            .calls
            .push(Call::EditMonitor(id.to_string(), request.clone()));
        let monitor = remote
            .monitors
            .get_mut(id)
            .ok_or_else(|| UptimeRobotError::NotFound(format!("monitor {id}")))?;
        // An empty url is not sent; alert contacts are always sent.
        monitor.friendly_name = request.friendly_name.clone();
        if !request.url.is_empty() {
            monitor.url = request.url.clone();
        }
        monitor.interval = request.interval;
        monitor.alert_contacts = contact_refs(&request.alert_contacts);
        if request.sub_type != 0 {
            monitor.sub_type = request.sub_type;
            monitor.port = if request.port == 0 {
                well_known_port(request.sub_type)
            } else {
                request.port
            };
        }
        if request.keyword_type != 0 {
            monitor.keyword_type = request.keyword_type;
            monitor.keyword_value = request.keyword_value.clone();
        }
        Ok(())
    }

    async fn get_monitors(&self, ids: &[String]) -> Result<Vec<RemoteMonitor>> {
        let mut remote = self.remote.lock().unwrap();
        remote.reads += 1;
        Ok(ids
            .iter()
            .filter_map(|id| remote.monitors.get(id).cloned())
            .collect())
    }

    async fn delete_monitor(&self, id: &str) -> Result<()> {
        let mut remote = self.remote.lock().unwrap();
        remote.calls.push(Call::DeleteMonitor(id.to_string()));
        if remote.fail_deletes {
            return Err(unavailable());
        }
        remote
            .monitors
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| UptimeRobotError::NotFound(format!("monitor {id}")))
    }
}

#[async_trait]
impl AccountApi for FakeUptimeRobot {
    async fn get_account_details(&self) -> Result<AccountDetails> {
        let mut remote = self.remote.lock().unwrap();
        remote.reads += 1;
        Ok(remote.account.clone())
    }
}
