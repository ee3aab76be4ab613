// ── Runtime connection configuration ──
//
// These types describe how to reach a controller and what to poll.
// They carry credential data and tuning but never touch disk: the CLI
// resolves a profile and hands a `ControllerConfig` in.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use unistat_api::{ControllerPlatform, TlsMode, TransportConfig};

use crate::derive::Condition;

/// Fixed poll cadence of the coordinator.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Display prefix for sensors and switches.
pub const DEFAULT_NAME: &str = "UniFi Status";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs). Default for local controllers.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for polling a single controller site.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Controller URL (e.g., `https://192.168.1.1`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    /// Site to operate on (defaults to "default").
    pub site: String,
    /// `None` probes the controller to pick the platform.
    pub platform: Option<ControllerPlatform>,
    pub tls: TlsVerification,
    pub timeout: Duration,
    pub poll_interval: Duration,
    /// Conditions whose sensors are evaluated.
    pub monitored: BTreeSet<Condition>,
    /// Prefix for sensor and switch names.
    pub name: String,
}

impl ControllerConfig {
    /// Config with every tunable at its default.
    pub fn new(url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            url,
            username: username.into(),
            password,
            site: "default".into(),
            platform: None,
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            monitored: Condition::all(),
            name: DEFAULT_NAME.into(),
        }
    }

    /// Build the transport settings for this controller.
    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
            cookie_jar: None, // LegacyClient::new adds one
        }
    }
}
