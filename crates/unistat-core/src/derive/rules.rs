// Derived sensor table.
//
// Each rule reads the attribute map of its source view (a subsystem record,
// or the alerts view keyed "1", "2", ...) and never panics.

use serde_json::Value;

use super::format::{format_uptime, kbps, seconds_from};
use super::{Condition, DerivationRule, SensorValue};
use crate::error::DerivationError;
use crate::model::Attributes;

/// Fallback for the last-alert sensor when no alert is active.
pub const NO_ALERT: &str = "Aucune alerte";

const GW_STATS: &str = "gw_system-stats";

pub(super) fn standard_rules() -> Vec<DerivationRule> {
    vec![
        // ── WAN ──
        DerivationRule {
            key: "unifi_status_wan_cpu",
            name: "UDM CPU",
            source: Condition::Wan,
            unit: Some("%"),
            icon: None,
            extract: gateway_cpu,
        },
        DerivationRule {
            key: "unifi_status_wan_mem",
            name: "UDM Memory",
            source: Condition::Wan,
            unit: Some("%"),
            icon: None,
            extract: gateway_mem,
        },
        DerivationRule {
            key: "unifi_status_wan_ip",
            name: "WAN IP",
            source: Condition::Wan,
            unit: None,
            icon: None,
            extract: wan_ip,
        },
        DerivationRule {
            key: "unifi_status_wan_download",
            name: "WAN Download",
            source: Condition::Wan,
            unit: Some("Kbps"),
            icon: Some("mdi:progress-download"),
            extract: wan_download,
        },
        DerivationRule {
            key: "unifi_status_wan_upload",
            name: "WAN Upload",
            source: Condition::Wan,
            unit: Some("Kbps"),
            icon: Some("mdi:progress-upload"),
            extract: wan_upload,
        },
        DerivationRule {
            key: "unifi_status_wan_uptime",
            name: "UDM Uptime",
            source: Condition::Wan,
            unit: None,
            icon: None,
            extract: gateway_uptime,
        },
        DerivationRule {
            key: "unifi_status_firmware_version",
            name: "UDM Firmware Version",
            source: Condition::Wan,
            unit: None,
            icon: Some("mdi:database-plus"),
            extract: gateway_version,
        },
        // ── WWW ──
        DerivationRule {
            key: "unifi_status_www_xput_down",
            name: "UDM Speedtest Download",
            source: Condition::Www,
            unit: Some("Mbps"),
            icon: Some("mdi:progress-download"),
            extract: speedtest_down,
        },
        DerivationRule {
            key: "unifi_status_www_xput_up",
            name: "UDM Speedtest Upload",
            source: Condition::Www,
            unit: Some("Mbps"),
            icon: Some("mdi:progress-upload"),
            extract: speedtest_up,
        },
        DerivationRule {
            key: "unifi_status_www_speedtest_ping",
            name: "UDM Speedtest Ping",
            source: Condition::Www,
            unit: Some("ms"),
            icon: Some("mdi:progress-clock"),
            extract: speedtest_ping,
        },
        DerivationRule {
            key: "unifi_status_www_uptime",
            name: "Internet Uptime",
            source: Condition::Www,
            unit: None,
            icon: None,
            extract: internet_uptime,
        },
        // ── LAN / WLAN ──
        DerivationRule {
            key: "unifi_status_wlan_num_user",
            name: "Users Wifi",
            source: Condition::Wlan,
            unit: None,
            icon: Some("mdi:account-multiple"),
            extract: num_user,
        },
        DerivationRule {
            key: "unifi_status_lan_num_user",
            name: "Users Lan",
            source: Condition::Lan,
            unit: None,
            icon: Some("mdi:account-multiple"),
            extract: num_user,
        },
        // ── Alerts ──
        DerivationRule {
            key: "unifi_status_last_alert",
            name: "Last Alert",
            source: Condition::Alerts,
            unit: None,
            icon: Some("mdi:alert-outline"),
            extract: last_alert,
        },
    ]
}

// ── Field helpers ────────────────────────────────────────────────────

/// Present, non-null field as a scalar value.
fn scalar(attrs: &Attributes, field: &'static str) -> Result<SensorValue, DerivationError> {
    match attrs.get(field) {
        None | Some(Value::Null) => Err(DerivationError::MissingField { field }),
        Some(value) => SensorValue::try_from_json(field, value),
    }
}

/// The gateway stats object; absent or null reads as empty.
fn gateway_stats(attrs: &Attributes) -> Result<Option<&Attributes>, DerivationError> {
    match attrs.get(GW_STATS) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(stats)) => Ok(Some(stats)),
        Some(_) => Err(DerivationError::WrongType {
            field: GW_STATS,
            expected: "an object",
        }),
    }
}

fn gateway_stat(
    attrs: &Attributes,
    field: &'static str,
) -> Result<SensorValue, DerivationError> {
    match gateway_stats(attrs)?.and_then(|stats| stats.get(field)) {
        None => Ok(SensorValue::Integer(0)),
        Some(value) => SensorValue::try_from_json(field, value),
    }
}

/// `floor(rate / 1024)`, with an absent or null rate counting as 0.
fn rate_kbps(attrs: &Attributes, field: &'static str) -> Result<SensorValue, DerivationError> {
    let rate = match attrs.get(field) {
        None | Some(Value::Null) => 0.0,
        Some(Value::Number(n)) => n.as_f64().ok_or(DerivationError::OutOfRange { field })?,
        Some(_) => {
            return Err(DerivationError::WrongType {
                field,
                expected: "a number",
            });
        }
    };
    kbps(field, rate).map(SensorValue::Integer)
}

// ── Extractors ───────────────────────────────────────────────────────

fn gateway_cpu(attrs: &Attributes) -> Result<SensorValue, DerivationError> {
    gateway_stat(attrs, "cpu")
}

fn gateway_mem(attrs: &Attributes) -> Result<SensorValue, DerivationError> {
    gateway_stat(attrs, "mem")
}

fn wan_ip(attrs: &Attributes) -> Result<SensorValue, DerivationError> {
    scalar(attrs, "wan_ip")
}

fn wan_download(attrs: &Attributes) -> Result<SensorValue, DerivationError> {
    rate_kbps(attrs, "rx_bytes-r")
}

fn wan_upload(attrs: &Attributes) -> Result<SensorValue, DerivationError> {
    rate_kbps(attrs, "tx_bytes-r")
}

fn gateway_uptime(attrs: &Attributes) -> Result<SensorValue, DerivationError> {
    let secs = match gateway_stats(attrs)?.and_then(|stats| stats.get("uptime")) {
        None => 0,
        Some(value) => seconds_from("uptime", value)?,
    };
    Ok(SensorValue::Text(format_uptime(secs)))
}

fn gateway_version(attrs: &Attributes) -> Result<SensorValue, DerivationError> {
    scalar(attrs, "gw_version")
}

fn speedtest_down(attrs: &Attributes) -> Result<SensorValue, DerivationError> {
    scalar(attrs, "xput_down")
}

fn speedtest_up(attrs: &Attributes) -> Result<SensorValue, DerivationError> {
    scalar(attrs, "xput_up")
}

fn speedtest_ping(attrs: &Attributes) -> Result<SensorValue, DerivationError> {
    scalar(attrs, "speedtest_ping")
}

fn internet_uptime(attrs: &Attributes) -> Result<SensorValue, DerivationError> {
    let secs = match attrs.get("uptime") {
        None => 0,
        Some(value) => seconds_from("uptime", value)?,
    };
    Ok(SensorValue::Text(format_uptime(secs)))
}

fn num_user(attrs: &Attributes) -> Result<SensorValue, DerivationError> {
    scalar(attrs, "num_user")
}

fn last_alert(attrs: &Attributes) -> Result<SensorValue, DerivationError> {
    let newest = match attrs.get("1") {
        None | Some(Value::Null) => None,
        Some(Value::Object(alert)) => Some(alert),
        Some(_) => {
            return Err(DerivationError::WrongType {
                field: "1",
                expected: "an alert object",
            });
        }
    };
    match newest.and_then(|alert| alert.get("msg")) {
        None => Ok(SensorValue::Text(NO_ALERT.into())),
        Some(Value::Null) => Err(DerivationError::MissingField { field: "msg" }),
        Some(msg) => SensorValue::try_from_json("msg", msg),
    }
}
