//! Status polling and device control for a UniFi controller site.
//!
//! - **[`Coordinator`]**: owns the controller session and the last good
//!   [`Snapshot`]. Refreshes are single-flight; after
//!   [`FAILURE_THRESHOLD`] consecutive failures the session is recreated
//!   and the fetch retried once.
//!
//! - **Derivation engine** ([`derive`]): an immutable [`SensorCatalog`] of
//!   base sensors and derived rules evaluated against snapshots.
//!
//! - **State machine** ([`state`]): maps device state codes and PoE modes
//!   to the [`SwitchState`] tri-state; [`DeviceSwitch`] issues the
//!   matching control actions.
//!
//! - **Session seam** ([`session`]): [`SessionFactory`] /
//!   [`ControllerSession`] traits with a legacy-API implementation.

pub mod config;
pub mod control;
pub mod convert;
pub mod coordinator;
pub mod derive;
pub mod error;
pub mod model;
pub mod probe;
pub mod session;
pub mod state;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ControllerConfig, TlsVerification};
pub use control::{DeviceSwitch, SwitchKind};
pub use coordinator::{Coordinator, FAILURE_THRESHOLD, RefreshOutcome};
pub use derive::{
    Condition, DerivationEngine, DerivationRule, SensorCatalog, SensorReading, SensorValue,
};
pub use error::{CoreError, DerivationError};
pub use model::{AlertRecord, DeviceRecord, MacAddress, PortRecord, Snapshot, Subsystem};
pub use probe::{ProbeError, validate_connection};
pub use session::{ControllerSession, LegacySession, LegacySessionFactory, SessionFactory};
pub use state::{DeviceReachability, SwitchState};

pub use unistat_api::ControllerPlatform;
