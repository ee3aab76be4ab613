#![allow(clippy::unwrap_used)]
// End-to-end checks of the legacy session and probe against a mock controller.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unistat_core::{
    ControllerConfig, ControllerPlatform, Coordinator, LegacySessionFactory, ProbeError,
    SensorCatalog, SensorValue, validate_connection,
};
use unistat_core::derive::DerivationEngine;

fn config(server: &MockServer) -> ControllerConfig {
    config_for(&server.uri())
}

fn config_for(uri: &str) -> ControllerConfig {
    let mut cfg = ControllerConfig::new(
        uri.parse().unwrap(),
        "admin",
        SecretString::from("secret".to_string()),
    );
    cfg.platform = Some(ControllerPlatform::ClassicController);
    cfg.timeout = Duration::from_secs(5);
    cfg
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "meta": { "rc": "ok" }, "data": data }))
}

async fn mount_controller(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/logout"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/health"))
        .respond_with(ok(json!([
            { "subsystem": "wan", "status": "ok", "rx_bytes-r": 10240, "gw_version": "4.0.6" },
            { "subsystem": "wlan", "status": "ok", "num_user": 17 }
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/alarm"))
        .respond_with(ok(json!([])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/device"))
        .respond_with(ok(json!([{ "_id": "d1", "mac": "aa:bb:cc:dd:ee:ff", "state": 1 }])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn validation_succeeds_against_healthy_controller() {
    let server = MockServer::start().await;
    mount_controller(&server).await;

    let factory = LegacySessionFactory::new(config(&server));
    let subsystems = validate_connection(&factory).await.unwrap();
    assert_eq!(subsystems, 2);
}

#[tokio::test]
async fn validation_reports_rejected_login_as_invalid_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(400).set_body_string("api.err.Invalid"))
        .mount(&server)
        .await;

    let factory = LegacySessionFactory::new(config(&server));
    let err = validate_connection(&factory).await.unwrap_err();
    assert!(matches!(err, ProbeError::InvalidAuth(_)), "got {err:?}");
}

#[tokio::test]
async fn validation_reports_unreachable_controller_as_cannot_connect() {
    // Reserve a free port, then release it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let factory = LegacySessionFactory::new(config_for(&format!("http://{addr}")));
    let err = validate_connection(&factory).await.unwrap_err();
    assert!(matches!(err, ProbeError::CannotConnect(_)), "got {err:?}");
}

#[tokio::test]
async fn coordinator_derives_values_from_live_session() {
    let server = MockServer::start().await;
    mount_controller(&server).await;

    let cfg = config(&server);
    let engine = DerivationEngine::new(
        SensorCatalog::standard().into(),
        cfg.monitored.clone(),
        cfg.name.clone(),
    );
    let coordinator = Coordinator::new(LegacySessionFactory::new(cfg), Duration::from_secs(30));
    coordinator.start().await.unwrap();
    assert!(coordinator.refresh().await.is_success());

    let snapshot = coordinator.current_snapshot().unwrap();
    let readings = engine.readings(Some(&snapshot));
    let value = |key: &str| {
        readings
            .iter()
            .find(|r| r.key == key)
            .and_then(|r| r.value.clone())
    };
    assert_eq!(value("unifi_status_wan_download"), Some(SensorValue::Integer(10)));
    assert_eq!(value("unifi_status_wlan_num_user"), Some(SensorValue::Integer(17)));
    assert_eq!(
        value("unifi_status_firmware_version"),
        Some(SensorValue::Text("4.0.6".into()))
    );
    assert_eq!(
        value("unifi_status_last_alert"),
        Some(SensorValue::Text("Aucune alerte".into()))
    );

    coordinator.shutdown().await;
}
