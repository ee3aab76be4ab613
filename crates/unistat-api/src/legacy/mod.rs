// Legacy API client modules
//
// Hand-written client for the UniFi controller's legacy endpoints used by
// the status poller: stat/health, stat/alarm, stat/device, cmd/devmgr and
// rest/device. Everything is wrapped in the `{ meta: { rc, msg }, data: [...] }`
// envelope.

pub mod alarms;
pub mod auth;
pub mod client;
pub mod devices;
pub mod health;
pub mod models;

pub use client::LegacyClient;
