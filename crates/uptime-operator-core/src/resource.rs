//! Resource schemas for the kinds the operator manages

use crate::error::OperatorError;
use crate::object::{LabelSelector, Object, ObjectSpec};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Delivery channel of an alert contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertContactType {
    Sms,
    Email,
    Twitter,
    Webhook,
    Pushbullet,
    Zapier,
    ProSms,
    Pushover,
    Slack,
    VoiceCall,
    Splunk,
    Pagerduty,
    Opsgenie,
    MsTeams,
    GoogleChat,
    Discord,
}

impl AlertContactType {
    pub const ALL: [AlertContactType; 16] = [
        AlertContactType::Sms,
        AlertContactType::Email,
        AlertContactType::Twitter,
        AlertContactType::Webhook,
        AlertContactType::Pushbullet,
        AlertContactType::Zapier,
        AlertContactType::ProSms,
        AlertContactType::Pushover,
        AlertContactType::Slack,
        AlertContactType::VoiceCall,
        AlertContactType::Splunk,
        AlertContactType::Pagerduty,
        AlertContactType::Opsgenie,
        AlertContactType::MsTeams,
        AlertContactType::GoogleChat,
        AlertContactType::Discord,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertContactType::Sms => "sms",
            AlertContactType::Email => "email",
            AlertContactType::Twitter => "twitter",
            AlertContactType::Webhook => "webhook",
            AlertContactType::Pushbullet => "pushbullet",
            AlertContactType::Zapier => "zapier",
            AlertContactType::ProSms => "pro-sms",
            AlertContactType::Pushover => "pushover",
            AlertContactType::Slack => "slack",
            AlertContactType::VoiceCall => "voice-call",
            AlertContactType::Splunk => "splunk",
            AlertContactType::Pagerduty => "pagerduty",
            AlertContactType::Opsgenie => "opsgenie",
            AlertContactType::MsTeams => "ms-teams",
            AlertContactType::GoogleChat => "google-chat",
            AlertContactType::Discord => "discord",
        }
    }
}

impl std::fmt::Display for AlertContactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertContactType {
    type Err = OperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlertContactType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                OperatorError::Validation(format!("unrecognised alert contact type: {}", s))
            })
    }
}

/// Desired state of an alert contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertContactSpec {
    /// Friendly name shown in the UptimeRobot dashboard
    pub name: String,

    #[serde(rename = "type")]
    pub contact_type: AlertContactType,

    /// Address, phone number or URL depending on the type
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertContactStatus {
    /// Remote identity; empty until the contact has been created
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, rename = "type")]
    pub contact_type: Option<AlertContactType>,

    #[serde(default)]
    pub value: String,

    /// Remote activation status (0 not activated, 1 paused, 2 active)
    #[serde(default)]
    pub status: i32,
}

impl ObjectSpec for AlertContactSpec {
    const KIND: &'static str = "alert-contact";
    type Status = AlertContactStatus;
}

pub type AlertContact = Object<AlertContactSpec>;

/// Check performed by a monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MonitorType {
    Http,
    Keyword,
    Ping,
    Port,
    Heartbeat,
}

impl MonitorType {
    pub const ALL: [MonitorType; 5] = [
        MonitorType::Http,
        MonitorType::Keyword,
        MonitorType::Ping,
        MonitorType::Port,
        MonitorType::Heartbeat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorType::Http => "http",
            MonitorType::Keyword => "keyword",
            MonitorType::Ping => "ping",
            MonitorType::Port => "port",
            MonitorType::Heartbeat => "heartbeat",
        }
    }
}

impl std::fmt::Display for MonitorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MonitorType {
    type Err = OperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MonitorType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| OperatorError::Validation(format!("unrecognised monitor type: {}", s)))
    }
}

/// When a keyword monitor reports the page as down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeywordMatch {
    /// Down when the keyword is found
    Exists,
    /// Down when the keyword is missing
    NotExists,
}

impl KeywordMatch {
    pub const ALL: [KeywordMatch; 2] = [KeywordMatch::Exists, KeywordMatch::NotExists];

    pub fn as_str(&self) -> &'static str {
        match self {
            KeywordMatch::Exists => "exists",
            KeywordMatch::NotExists => "not-exists",
        }
    }
}

impl FromStr for KeywordMatch {
    type Err = OperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeywordMatch::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| OperatorError::Validation(format!("unrecognised keyword match: {}", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCheck {
    #[serde(rename = "type")]
    pub alert_when: KeywordMatch,
    pub value: String,
}

/// Service a port monitor connects to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PortService {
    Http,
    Https,
    Ftp,
    Smtp,
    Pop3,
    Imap,
    Custom,
}

impl PortService {
    pub const ALL: [PortService; 7] = [
        PortService::Http,
        PortService::Https,
        PortService::Ftp,
        PortService::Smtp,
        PortService::Pop3,
        PortService::Imap,
        PortService::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PortService::Http => "http",
            PortService::Https => "https",
            PortService::Ftp => "ftp",
            PortService::Smtp => "smtp",
            PortService::Pop3 => "pop3",
            PortService::Imap => "imap",
            PortService::Custom => "custom",
        }
    }
}

impl FromStr for PortService {
    type Err = OperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PortService::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| OperatorError::Validation(format!("unrecognised port service: {}", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortCheck {
    pub service: PortService,

    /// Port number; set for `custom` only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

pub const DEFAULT_MONITOR_INTERVAL_SECS: u32 = 300;

fn default_interval() -> u32 {
    DEFAULT_MONITOR_INTERVAL_SECS
}

fn default_monitor_type() -> MonitorType {
    MonitorType::Http
}

/// Desired state of a monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorSpec {
    pub name: String,

    pub url: String,

    #[serde(default = "default_monitor_type", rename = "type")]
    pub monitor_type: MonitorType,

    /// Check interval in seconds
    #[serde(default = "default_interval")]
    pub interval: u32,

    /// Alert contacts to notify, selected by label. `None` notifies nobody.
    #[serde(default)]
    pub alert_contacts: Option<LabelSelector>,

    /// Required for keyword monitors, rejected for every other type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<KeywordCheck>,

    /// Required for port monitors, rejected for every other type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<PortCheck>,
}

impl MonitorSpec {
    /// Check the fields that depend on the monitor type.
    pub fn validate(&self) -> Result<(), OperatorError> {
        let invalid = |msg: &str| Err(OperatorError::Validation(msg.to_string()));

        if self.interval == 0 {
            return invalid("monitor interval must be positive");
        }
        if self.url.is_empty() && self.monitor_type != MonitorType::Heartbeat {
            return invalid("url is required");
        }

        match (self.monitor_type, &self.keyword) {
            (MonitorType::Keyword, None) => return invalid("keyword monitors require a keyword"),
            (MonitorType::Keyword, Some(k)) if k.value.is_empty() => {
                return invalid("keyword must not be empty");
            }
            (MonitorType::Keyword, Some(_)) | (_, None) => {}
            (_, Some(_)) => return invalid("keyword is only valid for keyword monitors"),
        }

        match (self.monitor_type, &self.port) {
            (MonitorType::Port, None) => invalid("port monitors require a port service"),
            (MonitorType::Port, Some(p)) => match (p.service, p.port) {
                (PortService::Custom, None | Some(0)) => {
                    invalid("custom port monitors require a port number")
                }
                (PortService::Custom, Some(_)) | (_, None) => Ok(()),
                (_, Some(_)) => invalid("a port number is only valid for the custom service"),
            },
            (_, None) => Ok(()),
            (_, Some(_)) => invalid("port is only valid for port monitors"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitorStatus {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub url: String,

    #[serde(default, rename = "type")]
    pub monitor_type: Option<MonitorType>,

    #[serde(default)]
    pub interval: u32,

    /// Remote ids of the alert contacts attached on the last sync
    #[serde(default)]
    pub alert_contacts: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<KeywordCheck>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<PortCheck>,

    /// Remote monitor status (0 paused, 1 not checked yet, 2 up, 8 seems down, 9 down)
    #[serde(default)]
    pub status: i32,
}

impl ObjectSpec for MonitorSpec {
    const KIND: &'static str = "monitor";
    type Status = MonitorStatus;
}

pub type Monitor = Object<MonitorSpec>;

/// An account view has nothing to declare; it only mirrors account details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountSpec {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountStatus {
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub monitor_limit: u32,

    #[serde(default)]
    pub monitor_interval: u32,

    #[serde(default)]
    pub up_monitors: u32,

    #[serde(default)]
    pub down_monitors: u32,

    #[serde(default)]
    pub paused_monitors: u32,
}

impl ObjectSpec for AccountSpec {
    const KIND: &'static str = "account";
    type Status = AccountStatus;
}

pub type Account = Object<AccountSpec>;
