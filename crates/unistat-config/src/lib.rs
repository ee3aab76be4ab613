//! Configuration profiles for unistat.
//!
//! TOML profiles merged with `UNISTAT_` environment variables, credential
//! resolution (env, keyring, plaintext), and translation to
//! `unistat_core::ControllerConfig`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use unistat_core::config::{DEFAULT_NAME, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};
use unistat_core::{Condition, ControllerConfig, ControllerPlatform, TlsVerification};

/// Keyring service name; entries are keyed `{profile}/password`.
pub const KEYRING_SERVICE: &str = "unistat";

/// Environment variable checked first for the controller password.
pub const PASSWORD_ENV: &str = "UNISTAT_PASSWORD";

/// Environment variable used when a profile has no `username`.
pub const USERNAME_ENV: &str = "UNISTAT_USERNAME";

const REDACTED: &str = "********";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is selected explicitly.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named controller profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Pick a profile: the explicit name, else `default_profile`, else
    /// `"default"`.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default")
            .to_owned();
        match self.profiles.get(&name) {
            Some(profile) => Ok((name, profile)),
            None => Err(ConfigError::UnknownProfile { name }),
        }
    }

    /// Copy with every plaintext password masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for profile in copy.profiles.values_mut() {
            if profile.password.is_some() {
                profile.password = Some(REDACTED.into());
            }
        }
        copy
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Values applied to every profile that does not override them.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Accept self-signed certificates. Local controllers almost always
    /// present one.
    #[serde(default = "default_insecure")]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Poll cadence in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: default_insecure(),
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_insecure() -> bool {
    true
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}
fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}

/// A named controller profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Controller base URL (e.g., "https://192.168.1.1:8443").
    pub controller: String,

    #[serde(default = "default_site")]
    pub site: String,

    /// `auto`, `classic` or `unifi-os`.
    #[serde(default = "default_platform")]
    pub platform: String,

    pub username: Option<String>,

    /// Plaintext password; the env var and keyring take precedence.
    pub password: Option<String>,

    /// Path to a custom CA certificate. Enables strict verification.
    pub ca_cert: Option<PathBuf>,

    pub insecure: Option<bool>,

    pub timeout: Option<u64>,

    pub poll_interval: Option<u64>,

    /// Conditions to evaluate; all of them when absent.
    pub monitored: Option<Vec<String>>,

    /// Display prefix for sensors and switches.
    pub name: Option<String>,
}

fn default_site() -> String {
    "default".into()
}
fn default_platform() -> String {
    "auto".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "unistat", "unistat").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("unistat");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from the canonical path plus the environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` plus the environment. A missing file yields
/// the defaults. Nested keys use a double underscore, e.g.
/// `UNISTAT_DEFAULTS__TIMEOUT=10`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("UNISTAT_").split("__"))
        .extract()?;
    Ok(config)
}

// ── Field parsing ───────────────────────────────────────────────────

/// Parse a platform setting. `auto` means probe the controller.
pub fn parse_platform(value: &str) -> Result<Option<ControllerPlatform>, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "auto" => Ok(None),
        "classic" | "v4" | "v5" => Ok(Some(ControllerPlatform::ClassicController)),
        "unifi-os" | "unifios" | "udmp-unifios" => Ok(Some(ControllerPlatform::UnifiOs)),
        _ => Err(ConfigError::Validation {
            field: "platform".into(),
            reason: format!("expected 'auto', 'classic' or 'unifi-os', got '{value}'"),
        }),
    }
}

/// Parse the monitored list. Absent means every condition; unknown names
/// are rejected.
pub fn parse_monitored(values: Option<&[String]>) -> Result<BTreeSet<Condition>, ConfigError> {
    let Some(values) = values else {
        return Ok(Condition::all());
    };
    values
        .iter()
        .map(|raw| {
            Condition::from_str(&raw.trim().to_ascii_lowercase()).map_err(|_| {
                ConfigError::Validation {
                    field: "monitored".into(),
                    reason: format!("unknown condition '{raw}'"),
                }
            })
        })
        .collect()
}

// ── Credential resolution ───────────────────────────────────────────

/// Username and password for the legacy login.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// Resolve credentials from the process environment, the system keyring
/// and the profile, in that order.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Credentials, ConfigError> {
    resolve_credentials_with(
        profile,
        profile_name,
        |key| std::env::var(key).ok(),
        keyring_password,
    )
}

/// Credential chain with pluggable lookups for the environment and the
/// keyring.
pub fn resolve_credentials_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<Credentials, ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| env(USERNAME_ENV))
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    let password = env(PASSWORD_ENV)
        .or_else(|| keyring(profile_name))
        .or_else(|| profile.password.clone())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    Ok(Credentials {
        username,
        password: SecretString::from(password),
    })
}

fn keyring_password(profile_name: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
        .ok()?
        .get_password()
        .ok()
}

// ── Translation ─────────────────────────────────────────────────────

/// Resolve credentials and build the runtime config for a profile.
pub fn profile_to_controller_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ControllerConfig, ConfigError> {
    let credentials = resolve_credentials(profile, profile_name)?;
    controller_config(profile, defaults, credentials)
}

/// Build the runtime config for a profile with credentials already
/// resolved.
pub fn controller_config(
    profile: &Profile,
    defaults: &Defaults,
    credentials: Credentials,
) -> Result<ControllerConfig, ConfigError> {
    let url: url::Url = profile
        .controller
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "controller".into(),
            reason: format!("invalid URL: {}", profile.controller),
        })?;

    let tls = if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    };

    let poll_interval = profile.poll_interval.unwrap_or(defaults.poll_interval);
    if poll_interval == 0 {
        return Err(ConfigError::Validation {
            field: "poll_interval".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let mut config = ControllerConfig::new(url, credentials.username, credentials.password);
    config.site.clone_from(&profile.site);
    config.platform = parse_platform(&profile.platform)?;
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.poll_interval = Duration::from_secs(poll_interval);
    config.monitored = parse_monitored(profile.monitored.as_deref())?;
    config.name = profile.name.clone().unwrap_or_else(|| DEFAULT_NAME.into());
    Ok(config)
}
