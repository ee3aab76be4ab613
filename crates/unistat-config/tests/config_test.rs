#![allow(clippy::unwrap_used)]

use std::collections::BTreeSet;
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::{ExposeSecret, SecretString};

use unistat_config::{
    ConfigError, Credentials, Defaults, controller_config, load_config_from, parse_monitored,
    parse_platform, resolve_credentials_with,
};
use unistat_core::{Condition, ControllerPlatform, TlsVerification};

const SAMPLE: &str = r#"
default_profile = "home"

[defaults]
timeout = 10

[profiles.home]
controller = "https://192.168.1.1:8443"
site = "office"
platform = "v5"
username = "admin"
password = "plain"
monitored = ["wan", "WLAN", "alerts"]
name = "Home Net"

[profiles.lab]
controller = "https://10.0.0.2"
insecure = false
poll_interval = 60
"#;

fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

fn creds() -> Credentials {
    Credentials {
        username: "admin".into(),
        password: SecretString::from("pw".to_string()),
    }
}

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config_from(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(config.default_profile.as_deref(), Some("default"));
    assert!(config.profiles.is_empty());
    assert!(config.defaults.insecure);
    assert_eq!(config.defaults.timeout, 30);
    assert_eq!(config.defaults.poll_interval, 30);
}

#[test]
fn profile_selection_follows_default_profile() {
    let (_dir, path) = write_config(SAMPLE);
    let config = load_config_from(&path).unwrap();

    let (name, profile) = config.profile(None).unwrap();
    assert_eq!(name, "home");
    assert_eq!(profile.site, "office");

    let (name, profile) = config.profile(Some("lab")).unwrap();
    assert_eq!(name, "lab");
    assert_eq!(profile.site, "default");
    assert_eq!(profile.platform, "auto");

    assert!(matches!(
        config.profile(Some("nope")),
        Err(ConfigError::UnknownProfile { .. })
    ));
}

#[test]
fn profile_translates_to_controller_config() {
    let (_dir, path) = write_config(SAMPLE);
    let config = load_config_from(&path).unwrap();
    let (_, profile) = config.profile(Some("home")).unwrap();

    let cfg = controller_config(profile, &config.defaults, creds()).unwrap();
    assert_eq!(cfg.url.as_str(), "https://192.168.1.1:8443/");
    assert_eq!(cfg.site, "office");
    assert_eq!(cfg.platform, Some(ControllerPlatform::ClassicController));
    assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
    assert_eq!(cfg.timeout, Duration::from_secs(10));
    assert_eq!(cfg.poll_interval, Duration::from_secs(30));
    assert_eq!(cfg.name, "Home Net");
    assert_eq!(
        cfg.monitored,
        BTreeSet::from([Condition::Wan, Condition::Wlan, Condition::Alerts])
    );
}

#[test]
fn strict_profile_uses_system_roots() {
    let (_dir, path) = write_config(SAMPLE);
    let config = load_config_from(&path).unwrap();
    let (_, profile) = config.profile(Some("lab")).unwrap();

    let cfg = controller_config(profile, &config.defaults, creds()).unwrap();
    assert_eq!(cfg.tls, TlsVerification::SystemDefaults);
    assert_eq!(cfg.platform, None);
    assert_eq!(cfg.poll_interval, Duration::from_secs(60));
    assert_eq!(cfg.monitored, Condition::all());
    assert_eq!(cfg.name, "UniFi Status");
}

#[test]
fn invalid_fields_are_rejected() {
    let (_dir, path) = write_config(
        r#"
[profiles.default]
controller = "not a url"
"#,
    );
    let config = load_config_from(&path).unwrap();
    let (_, profile) = config.profile(None).unwrap();
    let err = controller_config(profile, &Defaults::default(), creds()).unwrap_err();
    assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "controller"));

    let mut profile = profile.clone();
    profile.controller = "https://10.0.0.1".into();
    profile.poll_interval = Some(0);
    let err = controller_config(&profile, &Defaults::default(), creds()).unwrap_err();
    assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "poll_interval"));
}

#[test]
fn platform_aliases() {
    assert_eq!(parse_platform("auto").unwrap(), None);
    assert_eq!(
        parse_platform("v4").unwrap(),
        Some(ControllerPlatform::ClassicController)
    );
    assert_eq!(
        parse_platform("unifiOS").unwrap(),
        Some(ControllerPlatform::UnifiOs)
    );
    assert_eq!(
        parse_platform("UDMP-unifiOS").unwrap(),
        Some(ControllerPlatform::UnifiOs)
    );
    assert!(parse_platform("v9").is_err());
}

#[test]
fn monitored_rejects_unknown_conditions() {
    let err = parse_monitored(Some(["wan".to_string(), "disk".to_string()].as_slice())).unwrap_err();
    assert!(err.to_string().contains("disk"));
    assert!(parse_monitored(Some([].as_slice())).unwrap().is_empty());
}

#[test]
fn password_resolution_order() {
    let (_dir, path) = write_config(SAMPLE);
    let config = load_config_from(&path).unwrap();
    let (_, profile) = config.profile(Some("home")).unwrap();

    let from_env = resolve_credentials_with(
        profile,
        "home",
        |key| (key == "UNISTAT_PASSWORD").then(|| "env-pw".to_string()),
        |_| Some("keyring-pw".to_string()),
    )
    .unwrap();
    assert_eq!(from_env.password.expose_secret(), "env-pw");

    let from_keyring =
        resolve_credentials_with(profile, "home", |_| None, |_| Some("keyring-pw".into())).unwrap();
    assert_eq!(from_keyring.password.expose_secret(), "keyring-pw");

    let plaintext = resolve_credentials_with(profile, "home", |_| None, |_| None).unwrap();
    assert_eq!(plaintext.username, "admin");
    assert_eq!(plaintext.password.expose_secret(), "plain");
}

#[test]
fn missing_credentials_error() {
    let (_dir, path) = write_config(SAMPLE);
    let config = load_config_from(&path).unwrap();
    let (_, profile) = config.profile(Some("lab")).unwrap();

    let err = resolve_credentials_with(profile, "lab", |_| None, |_| None).unwrap_err();
    assert!(matches!(err, ConfigError::NoCredentials { ref profile } if profile == "lab"));

    let creds = resolve_credentials_with(
        profile,
        "lab",
        |key| match key {
            "UNISTAT_USERNAME" => Some("ops".into()),
            "UNISTAT_PASSWORD" => Some("pw".into()),
            _ => None,
        },
        |_| None,
    )
    .unwrap();
    assert_eq!(creds.username, "ops");
}

#[test]
fn redacted_masks_passwords() {
    let (_dir, path) = write_config(SAMPLE);
    let config = load_config_from(&path).unwrap();
    let rendered = config.redacted().to_toml().unwrap();

    assert!(!rendered.contains("plain"));
    assert!(rendered.contains("********"));
}
