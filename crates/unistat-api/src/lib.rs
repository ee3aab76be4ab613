//! Async client for the UniFi controller's legacy JSON API.
//!
//! Only the surface needed for status polling and device control is
//! covered: site health, alarms, the device inventory, device restart, and
//! per-port PoE overrides. Session handling (platform detection, cookie
//! login/logout, CSRF rotation) lives alongside the transport in
//! [`legacy`].

pub mod auth;
pub mod error;
pub mod legacy;
pub mod transport;

pub use auth::ControllerPlatform;
pub use error::Error;
pub use legacy::LegacyClient;
pub use legacy::models::{LegacyAlarm, LegacyDevice, LegacyPort, PortOverride};
pub use transport::{TlsMode, TransportConfig};
