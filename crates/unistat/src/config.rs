//! CLI configuration: thin wrapper around `unistat_config` that applies
//! `GlobalOpts` flag overrides (--controller, --site, etc.).

use unistat_core::ControllerConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use unistat_config::{Config, Profile, config_path};

/// Load the config file named by `--config`, or the canonical one.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let config = match global.config {
        Some(ref path) => unistat_config::load_config_from(path)?,
        None => unistat_config::load_config()?,
    };
    Ok(config)
}

/// The file `load` reads.
pub fn active_path(global: &GlobalOpts) -> std::path::PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `ControllerConfig` from the config file, profile and flags.
///
/// Flag overrides take priority over profile values. Without a matching
/// profile, `--controller` alone describes an ad-hoc profile.
pub fn build_controller_config(global: &GlobalOpts) -> Result<ControllerConfig, CliError> {
    let config = load(global)?;
    let profile_name = active_profile_name(global, &config);

    let base = match config.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&config),
            });
        }
        None => {
            let controller = global.controller.clone().ok_or_else(|| CliError::NoConfig {
                path: active_path(global).display().to_string(),
            })?;
            adhoc_profile(controller)
        }
    };

    let profile = apply_overrides(base, global);
    Ok(unistat_config::profile_to_controller_config(
        &profile,
        &profile_name,
        &config.defaults,
    )?)
}

fn adhoc_profile(controller: String) -> Profile {
    Profile {
        controller,
        site: "default".into(),
        platform: "auto".into(),
        username: None,
        password: None,
        ca_cert: None,
        insecure: None,
        timeout: None,
        poll_interval: None,
        monitored: None,
        name: None,
    }
}

fn apply_overrides(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref controller) = global.controller {
        profile.controller.clone_from(controller);
    }
    if let Some(ref site) = global.site {
        profile.site.clone_from(site);
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
        profile.ca_cert = None;
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    profile
}

fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        return "(none)".into();
    }
    config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
}
