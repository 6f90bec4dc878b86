//! Alert contact methods

use crate::client::{Params, UptimeRobotClient};
use crate::de::string_or_number;
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// Alert contact as returned by `getAlertContacts`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteAlertContact {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub friendly_name: String,
    #[serde(rename = "type")]
    pub contact_type: i32,
    #[serde(default)]
    pub status: i32,
    #[serde(default)]
    pub value: String,
}

/// Identity and baseline status of a freshly created alert contact
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedAlertContact {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub status: i32,
}

/// Alert contact operations of the UptimeRobot API
#[async_trait]
pub trait AlertContactApi: Send + Sync {
    async fn new_alert_contact(
        &self,
        contact_type: i32,
        value: &str,
        friendly_name: &str,
    ) -> Result<CreatedAlertContact>;

    /// Type cannot be changed after creation; only value and name are sent.
    async fn edit_alert_contact(&self, id: &str, value: &str, friendly_name: &str) -> Result<()>;

    /// Fetch the given contacts, or every contact when `ids` is empty.
    async fn get_alert_contacts(&self, ids: &[String]) -> Result<Vec<RemoteAlertContact>>;

    async fn delete_alert_contact(&self, id: &str) -> Result<()>;
}

#[derive(Deserialize)]
struct NewAlertContactResponse {
    alertcontact: CreatedAlertContact,
}

#[derive(Deserialize)]
struct GetAlertContactsResponse {
    #[serde(default)]
    alert_contacts: Vec<RemoteAlertContact>,
}

#[derive(Deserialize)]
struct Ack {}

#[async_trait]
impl AlertContactApi for UptimeRobotClient {
    async fn new_alert_contact(
        &self,
        contact_type: i32,
        value: &str,
        friendly_name: &str,
    ) -> Result<CreatedAlertContact> {
        let params = Params::new()
            .insert("type", contact_type.to_string())
            .insert("value", value)
            .insert_if_set("friendly_name", friendly_name);

        let response: NewAlertContactResponse = self.request("newAlertContact", params).await?;
        tracing::debug!(id = %response.alertcontact.id, "alert contact created");
        Ok(response.alertcontact)
    }

    async fn edit_alert_contact(&self, id: &str, value: &str, friendly_name: &str) -> Result<()> {
        let params = Params::new()
            .insert("id", id)
            .insert("value", value)
            .insert_if_set("friendly_name", friendly_name);

        let _: Ack = self.request("editAlertContact", params).await?;
        Ok(())
    }

    async fn get_alert_contacts(&self, ids: &[String]) -> Result<Vec<RemoteAlertContact>> {
        let params = Params::new().insert_ids("alert_contacts", ids);
        let response: GetAlertContactsResponse = self.request("getAlertContacts", params).await?;
        Ok(response.alert_contacts)
    }

    async fn delete_alert_contact(&self, id: &str) -> Result<()> {
        let _: Ack = self
            .request("deleteAlertContact", Params::new().insert("id", id))
            .await?;
        Ok(())
    }
}
