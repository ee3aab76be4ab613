// ── Device / port state machine ──
//
// Pure mapping from controller state codes and PoE modes to the tri-state
// {On, Off, Unavailable} that gates control actions.

use serde::Serialize;
use strum::Display;

use crate::model::{Attributes, DeviceRecord, MacAddress, Snapshot};

/// Controller state codes for which a device is considered reachable:
/// connected, upgrading, provisioning, heartbeat missed.
pub const REACHABLE_STATE_CODES: [i64; 4] = [1, 4, 5, 6];

/// `poe_mode` of a powered port.
pub const POE_MODE_AUTO: &str = "auto";

/// Whether a device can currently take control actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeviceReachability {
    Reachable,
    Unavailable,
}

impl DeviceReachability {
    /// 0 (disconnected), 7 (adopting), and unknown codes are unavailable.
    pub fn from_state_code(code: i64) -> Self {
        if REACHABLE_STATE_CODES.contains(&code) {
            Self::Reachable
        } else {
            Self::Unavailable
        }
    }

    pub fn is_reachable(self) -> bool {
        self == Self::Reachable
    }
}

/// Human label for a raw state code.
pub fn state_label(code: i64) -> &'static str {
    match code {
        0 => "disconnected",
        1 => "connected",
        4 => "upgrading",
        5 => "provisioning",
        6 => "heartbeat missed",
        7 => "adopting",
        _ => "unknown",
    }
}

/// Tri-state of a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SwitchState {
    On,
    Off,
    Unavailable,
}

impl SwitchState {
    pub fn is_on(self) -> bool {
        self == Self::On
    }

    pub fn is_available(self) -> bool {
        self != Self::Unavailable
    }
}

pub fn device_reachability(device: &DeviceRecord) -> DeviceReachability {
    DeviceReachability::from_state_code(device.state_code)
}

/// Restart switch: on while the device is reachable.
pub fn restart_state(snapshot: Option<&Snapshot>, mac: &MacAddress) -> SwitchState {
    match snapshot.and_then(|s| s.device(mac)) {
        Some(device) if device_reachability(device).is_reachable() => SwitchState::On,
        _ => SwitchState::Unavailable,
    }
}

/// PoE switch: unavailable unless the owning device is reachable and has
/// the port; otherwise on exactly when the port's mode is `"auto"`.
pub fn port_state(snapshot: Option<&Snapshot>, mac: &MacAddress, port_index: u32) -> SwitchState {
    let Some(device) = snapshot.and_then(|s| s.device(mac)) else {
        return SwitchState::Unavailable;
    };
    if !device_reachability(device).is_reachable() {
        return SwitchState::Unavailable;
    }
    match device.port(port_index) {
        Some(port) if port.poe_mode.as_deref() == Some(POE_MODE_AUTO) => SwitchState::On,
        Some(_) => SwitchState::Off,
        None => SwitchState::Unavailable,
    }
}

/// Attributes shown for a device's restart switch.
pub fn restart_attributes(device: &DeviceRecord) -> Attributes {
    let mut attrs = Attributes::new();
    let text = |s: Option<&str>| s.map_or(serde_json::Value::Null, Into::into);
    attrs.insert("model".into(), text(device.model.as_deref()));
    attrs.insert("serial".into(), text(device.serial.as_deref()));
    attrs.insert("version".into(), text(device.version.as_deref()));
    attrs.insert("ip".into(), text(device.ip.as_deref()));
    attrs.insert("mac".into(), device.mac.as_str().into());
    if let Some(uptime) = device.uptime_seconds.filter(|u| *u != 0) {
        attrs.insert("uptime".into(), uptime.into());
    }
    attrs
}

/// Attributes shown for a PoE switch; power readings only while on.
pub fn port_attributes(
    snapshot: Option<&Snapshot>,
    mac: &MacAddress,
    port_index: u32,
) -> Attributes {
    let mut attrs = Attributes::new();
    if !port_state(snapshot, mac, port_index).is_on() {
        return attrs;
    }
    let Some(port) = snapshot
        .and_then(|s| s.device(mac))
        .and_then(|d| d.port(port_index))
    else {
        return attrs;
    };
    for (key, reading) in [
        ("poe_voltage", port.poe_voltage),
        ("poe_current", port.poe_current),
        ("poe_power", port.poe_power),
    ] {
        if let Some(v) = reading {
            attrs.insert(key.into(), v.into());
        }
    }
    attrs
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    use crate::convert::build_snapshot;

    const MAC: &str = "aa:bb:cc:dd:ee:ff";

    fn snapshot_with(state: i64, poe_mode: &str) -> Snapshot {
        build_snapshot(
            Utc::now(),
            vec![],
            vec![],
            serde_json::from_value(json!([{
                "_id": "dev1",
                "mac": MAC,
                "name": "Switch",
                "model": "US8P60",
                "state": state,
                "uptime": 120,
                "port_table": [{
                    "port_idx": 2,
                    "port_poe": true,
                    "poe_mode": poe_mode,
                    "poe_voltage": "53.1",
                    "poe_current": "40.2",
                    "poe_power": "2.13"
                }]
            }]))
            .unwrap(),
        )
    }

    #[test]
    fn only_known_codes_are_reachable() {
        let reachable: Vec<i64> = [0, 1, 4, 5, 6, 7, 99]
            .into_iter()
            .filter(|c| DeviceReachability::from_state_code(*c).is_reachable())
            .collect();
        assert_eq!(reachable, [1, 4, 5, 6]);
    }

    #[test]
    fn restart_switch_tracks_reachability() {
        let mac = MacAddress::new(MAC);
        assert_eq!(restart_state(Some(&snapshot_with(1, "auto")), &mac), SwitchState::On);
        assert_eq!(
            restart_state(Some(&snapshot_with(0, "auto")), &mac),
            SwitchState::Unavailable
        );
        assert_eq!(restart_state(None, &mac), SwitchState::Unavailable);
    }

    #[test]
    fn poe_is_unavailable_when_device_is() {
        let mac = MacAddress::new(MAC);
        let snap = snapshot_with(7, "auto");
        assert_eq!(port_state(Some(&snap), &mac, 2), SwitchState::Unavailable);
    }

    #[test]
    fn poe_follows_mode_on_reachable_device() {
        let mac = MacAddress::new(MAC);
        assert_eq!(port_state(Some(&snapshot_with(1, "auto")), &mac, 2), SwitchState::On);
        assert_eq!(port_state(Some(&snapshot_with(5, "off")), &mac, 2), SwitchState::Off);
        assert_eq!(
            port_state(Some(&snapshot_with(1, "auto")), &mac, 9),
            SwitchState::Unavailable
        );
        assert_eq!(
            port_state(Some(&snapshot_with(1, "auto")), &MacAddress::new("00:00:00:00:00:01"), 2),
            SwitchState::Unavailable
        );
    }

    #[test]
    fn power_readings_only_while_on() {
        let mac = MacAddress::new(MAC);
        let on = port_attributes(Some(&snapshot_with(1, "auto")), &mac, 2);
        assert_eq!(on.get("poe_power"), Some(&json!(2.13)));
        let off = port_attributes(Some(&snapshot_with(1, "off")), &mac, 2);
        assert!(off.is_empty());
    }

    #[test]
    fn restart_attributes_include_identity() {
        let snap = snapshot_with(1, "auto");
        let attrs = restart_attributes(&snap.devices()[0]);
        assert_eq!(attrs["model"], "US8P60");
        assert_eq!(attrs["mac"], MAC);
        assert_eq!(attrs["uptime"], 120);
        assert_eq!(attrs["serial"], serde_json::Value::Null);
    }
}
