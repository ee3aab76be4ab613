// Legacy API response types
//
// Models for the UniFi controller's legacy JSON API. All responses are wrapped
// in the `LegacyResponse<T>` envelope. Fields use `#[serde(default)]` liberally
// because the API is inconsistent about field presence across firmware versions.

use serde::{Deserialize, Deserializer, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard UniFi legacy API response envelope.
///
/// Every legacy endpoint wraps its payload:
/// ```json
/// { "meta": { "rc": "ok", "msg": "optional" }, "data": [...] }
/// ```
#[derive(Debug, Deserialize)]
pub struct LegacyResponse<T> {
    pub meta: Meta,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Metadata from the legacy envelope. `rc` == `"ok"` means success.
#[derive(Debug, Deserialize)]
pub struct Meta {
    pub rc: String,
    #[serde(default)]
    pub msg: Option<String>,
}

// ── Device ───────────────────────────────────────────────────────────

/// Full device object from `stat/device`.
///
/// The legacy API can return 100+ fields per device. We model the ones the
/// status and control paths need; everything else lands in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyDevice {
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Some firmware repeats the object id as `device_id`.
    #[serde(default)]
    pub device_id: Option<String>,
    /// Empty when the controller omits it; such devices are skipped later.
    #[serde(default)]
    pub mac: String,
    #[serde(default, rename = "type")]
    pub device_type: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// 0=disconnected, 1=connected, 4=upgrading, 5=provisioning,
    /// 6=heartbeat missed, 7=adopting. Missing or unreadable codes are 0.
    #[serde(default, deserialize_with = "lenient_state")]
    pub state: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub uptime: Option<i64>,
    #[serde(default)]
    pub port_table: Vec<LegacyPort>,
    #[serde(default)]
    pub port_overrides: Vec<PortOverride>,
    /// Catch-all for undocumented fields (`upgradable`, `upgrade_to_firmware`, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LegacyDevice {
    /// The identifier used by `rest/device/{id}`.
    pub fn rest_id(&self) -> &str {
        self.device_id.as_deref().unwrap_or(&self.id)
    }
}

/// One entry of a device's `port_table`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyPort {
    /// Ports without a usable index cannot be addressed and are dropped.
    #[serde(default, deserialize_with = "lenient_u32")]
    pub port_idx: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub port_poe: bool,
    #[serde(default)]
    pub poe_mode: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub poe_voltage: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub poe_current: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub poe_power: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One entry of a device's `port_overrides` list, as accepted by
/// `PUT rest/device/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortOverride {
    pub port_idx: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poe_mode: Option<String>,
    /// Unrelated override settings (port profile, name, ...) preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Alarm ────────────────────────────────────────────────────────────

/// Alarm object from `stat/alarm`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyAlarm {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(default)]
    pub archived: Option<bool>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Lenient numeric fields ───────────────────────────────────────────

/// Firmware reports PoE readings as either JSON numbers or numeric strings
/// (`"53.12"`). Unparseable values become `None` instead of failing the
/// whole device list.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(f64_to_i64)),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_state<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_i64(deserializer)?.unwrap_or(0))
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_i64(deserializer)?.and_then(|v| u32::try_from(v).ok()))
}

#[allow(clippy::as_conversions, clippy::cast_possible_truncation)]
fn f64_to_i64(v: f64) -> i64 {
    v as i64
}
