//! Alert contact adapter

use super::{delete_remote, remote_error};
use async_trait::async_trait;
use uptime_operator_core::{
    AlertContactSpec, AlertContactStatus, AlertContactType, ApiObject, ApiObjectReconciler,
    OperatorError, Result,
};
use uptimerobot_client::{AlertContactApi, RemoteAlertContact};

/// Numeric type code the API uses for each channel
pub fn type_code(contact_type: AlertContactType) -> i32 {
    match contact_type {
        AlertContactType::Sms => 1,
        AlertContactType::Email => 2,
        AlertContactType::Twitter => 3,
        AlertContactType::Webhook => 5,
        AlertContactType::Pushbullet => 6,
        AlertContactType::Zapier => 7,
        AlertContactType::ProSms => 8,
        AlertContactType::Pushover => 9,
        AlertContactType::Slack => 11,
        AlertContactType::VoiceCall => 14,
        AlertContactType::Splunk => 15,
        AlertContactType::Pagerduty => 16,
        AlertContactType::Opsgenie => 17,
        AlertContactType::MsTeams => 20,
        AlertContactType::GoogleChat => 21,
        AlertContactType::Discord => 23,
    }
}

pub fn type_from_code(code: i32) -> Result<AlertContactType> {
    AlertContactType::ALL
        .into_iter()
        .find(|t| type_code(*t) == code)
        .ok_or_else(|| {
            OperatorError::Validation(format!("unrecognised alert contact type code: {}", code))
        })
}

/// Working value for one alert contact pass
///
/// Equality covers the identity and the fields the operator manages;
/// `status` is owned by the service and never diffed.
#[derive(Debug, Clone, Default)]
pub struct AlertContactIntent {
    pub id: String,
    pub name: String,
    pub contact_type: i32,
    pub value: String,
    pub status: i32,
}

impl PartialEq for AlertContactIntent {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.contact_type == other.contact_type
            && self.value == other.value
    }
}

impl AlertContactIntent {
    /// Start a pass from what was last observed
    pub fn observed(status: &AlertContactStatus) -> Self {
        Self {
            id: status.id.clone(),
            status: status.status,
            ..Self::default()
        }
    }

    pub fn apply_spec(&mut self, spec: &AlertContactSpec) -> Result<()> {
        self.name = spec.name.clone();
        self.contact_type = type_code(spec.contact_type);
        self.value = spec.value.clone();
        Ok(())
    }

    pub fn from_remote(remote: &RemoteAlertContact) -> Self {
        Self {
            id: remote.id.clone(),
            name: remote.friendly_name.clone(),
            contact_type: remote.contact_type,
            value: remote.value.clone(),
            status: remote.status,
        }
    }

    pub fn to_status(&self) -> Result<AlertContactStatus> {
        Ok(AlertContactStatus {
            id: self.id.clone(),
            name: self.name.clone(),
            contact_type: Some(type_from_code(self.contact_type)?),
            value: self.value.clone(),
            status: self.status,
        })
    }
}

impl ApiObject for AlertContactIntent {
    fn remote_id(&self) -> &str {
        &self.id
    }

    fn adopt_remote_state(&mut self, remote: &Self) {
        self.id = remote.id.clone();
        self.status = remote.status;
    }
}

/// Binds the generic reconciler to an [`AlertContactApi`]
pub struct AlertContactAdapter<'a, G: ?Sized> {
    api: &'a G,
}

impl<'a, G: AlertContactApi + ?Sized> AlertContactAdapter<'a, G> {
    pub fn new(api: &'a G) -> Self {
        Self { api }
    }

    /// Remote delete used as finalizer cleanup
    pub async fn delete(&self, id: &str) -> Result<()> {
        delete_remote(id, |id| async move { self.api.delete_alert_contact(&id).await }).await
    }

    async fn lookup(&self, id: &str) -> Result<Option<RemoteAlertContact>> {
        match self.api.get_alert_contacts(&[id.to_string()]).await {
            Ok(contacts) => Ok(contacts.into_iter().find(|c| c.id == id)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(remote_error(e)),
        }
    }
}

#[async_trait]
impl<'a, G: AlertContactApi + ?Sized> ApiObjectReconciler<AlertContactIntent>
    for AlertContactAdapter<'a, G>
{
    async fn exists(&self, object: &AlertContactIntent) -> Result<bool> {
        Ok(self.lookup(&object.id).await?.is_some())
    }

    async fn fetch(&self, object: &AlertContactIntent) -> Result<AlertContactIntent> {
        let remote = self
            .lookup(&object.id)
            .await?
            .ok_or_else(|| OperatorError::NotFound(format!("alert contact {}", object.id)))?;

        if remote.contact_type != object.contact_type {
            return Err(OperatorError::Validation(format!(
                "alert contact {} has type code {} remotely; the type cannot be changed in place",
                object.id, remote.contact_type
            )));
        }

        Ok(AlertContactIntent::from_remote(&remote))
    }

    async fn create(&self, object: &mut AlertContactIntent) -> Result<()> {
        let created = self
            .api
            .new_alert_contact(object.contact_type, &object.value, &object.name)
            .await
            .map_err(remote_error)?;
        object.id = created.id;
        object.status = created.status;
        Ok(())
    }

    async fn edit(&self, object: &AlertContactIntent) -> Result<()> {
        self.api
            .edit_alert_contact(&object.id, &object.value, &object.name)
            .await
            .map_err(remote_error)
    }
}
