//! Monitor methods

use crate::client::{Params, UptimeRobotClient};
use crate::de::{int_or_blank, string_or_number};
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// Fields sent by `newMonitor` and `editMonitor`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorRequest {
    pub friendly_name: String,
    pub url: String,
    pub monitor_type: i32,
    pub interval: u32,
    pub alert_contacts: Vec<String>,
    /// Port monitors: the service, `99` for a custom port
    pub sub_type: i32,
    pub port: i32,
    /// Keyword monitors: `1` alerts when the keyword exists, `2` when it does not
    pub keyword_type: i32,
    pub keyword_value: String,
}

impl MonitorRequest {
    fn params(&self) -> Params {
        Params::new()
            .insert_if_set("friendly_name", &self.friendly_name)
            .insert_if_set("url", &self.url)
            .insert_if_nonzero("interval", i64::from(self.interval))
            .insert_if_nonzero("sub_type", i64::from(self.sub_type))
            .insert_if_nonzero("port", i64::from(self.port))
            .insert_if_nonzero("keyword_type", i64::from(self.keyword_type))
            .insert_if_set("keyword_value", &self.keyword_value)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MonitorAlertContact {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
}

/// Monitor as returned by `getMonitors`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteMonitor {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub friendly_name: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "type")]
    pub monitor_type: i32,
    #[serde(default)]
    pub interval: u32,
    #[serde(default)]
    pub status: i32,
    #[serde(default)]
    pub alert_contacts: Vec<MonitorAlertContact>,
    #[serde(default, deserialize_with = "int_or_blank")]
    pub sub_type: i32,
    #[serde(default, deserialize_with = "int_or_blank")]
    pub port: i32,
    #[serde(default, deserialize_with = "int_or_blank")]
    pub keyword_type: i32,
    #[serde(default)]
    pub keyword_value: String,
}

impl RemoteMonitor {
    pub fn alert_contact_ids(&self) -> Vec<String> {
        self.alert_contacts.iter().map(|c| c.id.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedMonitor {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub status: i32,
}

/// Monitor operations of the UptimeRobot API
#[async_trait]
pub trait MonitorApi: Send + Sync {
    async fn new_monitor(&self, request: &MonitorRequest) -> Result<CreatedMonitor>;

    /// The monitor type is fixed at creation and is not sent.
    async fn edit_monitor(&self, id: &str, request: &MonitorRequest) -> Result<()>;

    /// Fetch the given monitors with their alert contacts, or all when `ids` is empty.
    async fn get_monitors(&self, ids: &[String]) -> Result<Vec<RemoteMonitor>>;

    async fn delete_monitor(&self, id: &str) -> Result<()>;
}

#[derive(Deserialize)]
struct NewMonitorResponse {
    monitor: CreatedMonitor,
}

#[derive(Deserialize)]
struct GetMonitorsResponse {
    #[serde(default)]
    monitors: Vec<RemoteMonitor>,
}

#[derive(Deserialize)]
struct Ack {}

#[async_trait]
impl MonitorApi for UptimeRobotClient {
    async fn new_monitor(&self, request: &MonitorRequest) -> Result<CreatedMonitor> {
        let params = request
            .params()
            .insert("type", request.monitor_type.to_string())
            .insert_ids("alert_contacts", &request.alert_contacts);

        let response: NewMonitorResponse = self.request("newMonitor", params).await?;
        tracing::debug!(id = %response.monitor.id, "monitor created");
        Ok(response.monitor)
    }

    async fn edit_monitor(&self, id: &str, request: &MonitorRequest) -> Result<()> {
        // An empty value detaches every contact.
        let params = request
            .params()
            .insert("id", id)
            .insert("alert_contacts", request.alert_contacts.join("-"));
        let _: Ack = self.request("editMonitor", params).await?;
        Ok(())
    }

    async fn get_monitors(&self, ids: &[String]) -> Result<Vec<RemoteMonitor>> {
        let params = Params::new()
            .insert_ids("monitors", ids)
            .insert("alert_contacts", "1");
        let response: GetMonitorsResponse = self.request("getMonitors", params).await?;
        Ok(response.monitors)
    }

    async fn delete_monitor(&self, id: &str) -> Result<()> {
        let _: Ack = self
            .request("deleteMonitor", Params::new().insert("id", id))
            .await?;
        Ok(())
    }
}
