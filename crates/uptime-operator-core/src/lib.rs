//! uptime-operator core
//!
//! Object model and reconcile machinery shared by every kind the operator
//! manages. Nothing in here knows about UptimeRobot; kinds plug in through
//! [`ApiObjectReconciler`] and are driven by per-kind controllers.
//!
//! # Architecture
//!
//! ```text
//!  manifest (uptime.kdl)            ┌──────────────────────────┐
//!        │ sync                     │  uptimerobot-client      │
//!        ▼                          │  (Remote API Gateway)    │
//! ┌───────────────┐  watch  ┌───────┴──────────┐               │
//! │  ObjectStore  │────────▶│   controllers    │───────────────┘
//! │ (MemoryStore) │◀────────│ finalize()       │
//! └──────┬────────┘  status │ reconcile_api_   │
//!        │ snapshot         │   object()       │
//!        ▼                  └──────────────────┘
//!  StateManager (.uptime-operator/state.json)
//! ```

pub mod action;
pub mod error;
pub mod finalizer;
pub mod object;
pub mod reconciler;
pub mod resource;
pub mod state;
pub mod store;

// Re-exports
pub use action::Action;
pub use error::{ErrorClass, OperatorError, Result};
pub use finalizer::{FINALIZER_TOKEN, FinalizerOutcome, FinalizerState, finalize};
pub use object::{DEFAULT_NAMESPACE, LabelSelector, Object, ObjectKey, ObjectMeta, ObjectSpec};
pub use reconciler::{ApiObject, ApiObjectReconciler, OperationResult, reconcile_api_object};
pub use resource::{
    Account, AccountSpec, AccountStatus, AlertContact, AlertContactSpec, AlertContactStatus,
    AlertContactType, KeywordCheck, KeywordMatch, Monitor, MonitorSpec, MonitorStatus,
    MonitorType, PortCheck, PortService,
};
pub use state::{GlobalState, StateLock, StateManager};
pub use store::{MemoryStore, ObjectStore};
