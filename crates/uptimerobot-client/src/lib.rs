//! UptimeRobot v2 API client
//!
//! Typed wrappers over the form-encoded UptimeRobot API. Each resource kind
//! is exposed as a trait ([`AlertContactApi`], [`MonitorApi`],
//! [`AccountApi`]) implemented by [`UptimeRobotClient`], so callers can swap
//! in a fake gateway.

pub mod account;
pub mod alert_contact;
pub mod client;
mod de;
pub mod error;
pub mod monitor;

pub use account::{AccountApi, AccountDetails};
pub use alert_contact::{AlertContactApi, CreatedAlertContact, RemoteAlertContact};
pub use client::{ClientConfig, DEFAULT_BASE_URL, Params, UptimeRobotClient};
pub use error::{Result, UptimeRobotError};
pub use monitor::{CreatedMonitor, MonitorAlertContact, MonitorApi, MonitorRequest, RemoteMonitor};
