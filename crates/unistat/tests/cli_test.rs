//! Integration tests for the `unistat` binary.
//!
//! Argument parsing, config handling and error exit codes run without a
//! controller; the end-to-end cases talk to a wiremock controller.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command with env isolation: no `UNISTAT_*` variables and a
/// config file path that does not exist.
fn unistat_cmd(config_dir: &tempfile::TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("unistat");
    cmd.env("HOME", config_dir.path())
        .env("XDG_CONFIG_HOME", config_dir.path())
        .env("UNISTAT_CONFIG", config_dir.path().join("config.toml"))
        .env("NO_COLOR", "1")
        .env_remove("UNISTAT_PROFILE")
        .env_remove("UNISTAT_CONTROLLER")
        .env_remove("UNISTAT_SITE")
        .env_remove("UNISTAT_OUTPUT")
        .env_remove("UNISTAT_INSECURE")
        .env_remove("UNISTAT_TIMEOUT")
        .env_remove("UNISTAT_USERNAME")
        .env_remove("UNISTAT_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "meta": { "rc": "ok" }, "data": data }))
}

async fn mock_controller() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/logout"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/health"))
        .respond_with(ok(json!([
            { "subsystem": "wan", "status": "ok", "tx_bytes-r": 2048, "rx_bytes-r": 10240 },
            { "subsystem": "wlan", "status": "warning", "num_user": 4 }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/alarm"))
        .respond_with(ok(json!([{ "_id": "a1", "msg": "AP lost contact", "archived": false }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/device"))
        .respond_with(ok(json!([{
            "_id": "d1",
            "mac": "aa:bb:cc:dd:ee:ff",
            "name": "Office Switch",
            "state": 1,
            "port_table": [
                { "port_idx": 1, "name": "Port 1", "port_poe": true, "poe_mode": "auto", "poe_power": "2.5" },
                { "port_idx": 2, "name": "Port 2", "port_poe": false }
            ]
        }])))
        .mount(&server)
        .await;
    server
}

fn controller_args(server: &MockServer) -> Vec<String> {
    vec![
        "--controller".into(),
        server.uri(),
        "--username".into(),
        "admin".into(),
    ]
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn no_args_shows_help() {
    let dir = tempfile::tempdir().unwrap();
    let output = unistat_cmd(&dir).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    unistat_cmd(&dir).arg("--help").assert().success().stdout(
        predicate::str::contains("status")
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("switches"))
            .and(predicate::str::contains("probe")),
    );
}

#[test]
fn version_flag() {
    let dir = tempfile::tempdir().unwrap();
    unistat_cmd(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("unistat"));
}

#[test]
fn completions_zsh() {
    let dir = tempfile::tempdir().unwrap();
    unistat_cmd(&dir)
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn invalid_output_format_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = unistat_cmd(&dir)
        .args(["--output", "xml", "status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("possible values"));
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn status_without_config_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    unistat_cmd(&dir)
        .arg("status")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No controller configured"));
}

#[test]
fn unknown_profile_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[profiles.home]\ncontroller = \"https://192.168.1.1\"\n",
    )
    .unwrap();
    unistat_cmd(&dir)
        .args(["--profile", "lab", "status"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("lab").and(predicate::str::contains("home")));
}

#[test]
fn missing_credentials_exit_with_auth_code() {
    let dir = tempfile::tempdir().unwrap();
    unistat_cmd(&dir)
        .args(["--controller", "https://192.168.1.1", "status"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No credentials"));
}

#[test]
fn config_path_honors_override() {
    let dir = tempfile::tempdir().unwrap();
    let expected = dir.path().join("config.toml");
    unistat_cmd(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.display().to_string()));
}

#[test]
fn config_show_masks_passwords() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[profiles.default]\ncontroller = \"https://192.168.1.1\"\nusername = \"admin\"\npassword = \"hunter2\"\n",
    )
    .unwrap();
    unistat_cmd(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("********")
                .and(predicate::str::contains("hunter2").not())
                .and(predicate::str::contains("https://192.168.1.1")),
        );
}

// ── Against a controller ────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn status_prints_derived_sensors_as_json() {
    let server = mock_controller().await;
    let dir = tempfile::tempdir().unwrap();

    let output = unistat_cmd(&dir)
        .env("UNISTAT_PASSWORD", "secret")
        .args(controller_args(&server))
        .args(["--output", "json", "status", "--derived"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let readings: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    let value = |key: &str| {
        readings
            .iter()
            .find(|r| r["key"] == key)
            .map(|r| r["value"].clone())
            .unwrap()
    };
    assert_eq!(value("unifi_status_wan_download"), json!(10));
    assert_eq!(value("unifi_status_wan_upload"), json!(2));
    assert_eq!(value("unifi_status_wlan_num_user"), json!(4));
    assert_eq!(value("unifi_status_last_alert"), json!("AP lost contact"));
}

#[tokio::test(flavor = "multi_thread")]
async fn switches_reflect_port_modes() {
    let server = mock_controller().await;
    let dir = tempfile::tempdir().unwrap();

    unistat_cmd(&dir)
        .env("UNISTAT_PASSWORD", "secret")
        .args(controller_args(&server))
        .args(["--output", "plain", "switches"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("UniFi Status Office Switch Restart\ton")
                .and(predicate::str::contains("UniFi Status Office Switch PoE Port 1\ton"))
                .and(predicate::str::contains("Port 2").not()),
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn poe_off_sends_override_and_refreshes() {
    let server = mock_controller().await;
    Mock::given(method("POST"))
        .and(path("/api/s/default/stat/device"))
        .and(body_json(json!({ "macs": ["aa:bb:cc:dd:ee:ff"] })))
        .respond_with(ok(json!([{
            "_id": "d1",
            "mac": "aa:bb:cc:dd:ee:ff",
            "state": 1,
            "port_overrides": []
        }])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/s/default/rest/device/d1"))
        .and(body_json(json!({ "port_overrides": [{ "port_idx": 1, "poe_mode": "off" }] })))
        .respond_with(ok(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    unistat_cmd(&dir)
        .env("UNISTAT_PASSWORD", "secret")
        .args(controller_args(&server))
        .args(["poe", "Office Switch", "1", "off"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PoE Port 1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn poe_on_port_without_poe_is_rejected() {
    let server = mock_controller().await;
    let dir = tempfile::tempdir().unwrap();

    unistat_cmd(&dir)
        .env("UNISTAT_PASSWORD", "secret")
        .args(controller_args(&server))
        .args(["poe", "aa:bb:cc:dd:ee:ff", "2", "on"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("has no PoE"));
}

#[tokio::test(flavor = "multi_thread")]
async fn probe_with_rejected_login_exits_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(400).set_body_string("api.err.Invalid"))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    unistat_cmd(&dir)
        .env("UNISTAT_PASSWORD", "wrong")
        .args(controller_args(&server))
        .arg("probe")
        .assert()
        .code(3);
}
