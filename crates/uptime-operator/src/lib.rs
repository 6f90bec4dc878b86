//! uptime-operator
//!
//! Declarative control loop for UptimeRobot: declared alert contacts,
//! monitors and accounts are read from a KDL manifest, kept in object
//! stores and reconciled against the UptimeRobot API by per-kind
//! controllers.

pub mod adapters;
pub mod controller;
pub mod manifest;
pub mod stores;
pub mod sync;

pub use controller::{
    AccountController, AlertContactController, Controller, ControllerRunner, MonitorController,
};
pub use manifest::{Manifest, ManifestError, parse_manifest_file, parse_manifest_str};
pub use stores::Stores;
pub use sync::{SyncReport, sync_manifest};
