// ── API-to-snapshot conversions ──
//
// Bridges raw `unistat_api` responses into snapshot records. Unknown
// subsystem tags and devices without a MAC are skipped; missing optional
// data gets defaults instead of failing the refresh.

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use unistat_api::{LegacyAlarm, LegacyDevice, LegacyPort};

use crate::model::{
    AlertRecord, Attributes, DeviceRecord, MacAddress, PortRecord, Snapshot, Subsystem,
    SubsystemRecord,
};

// ── Health ─────────────────────────────────────────────────────────

/// Convert one `stat/health` entry. `None` for non-objects and unknown tags.
pub fn subsystem_record(raw: serde_json::Value) -> Option<SubsystemRecord> {
    let serde_json::Value::Object(fields) = raw else {
        debug!("skipping non-object health entry");
        return None;
    };

    let tag = fields.get("subsystem").and_then(serde_json::Value::as_str)?;
    let Ok(subsystem) = tag.parse::<Subsystem>() else {
        trace!(tag, "ignoring unknown subsystem");
        return None;
    };

    let status = fields
        .get("status")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("unknown")
        .to_owned();

    Some(SubsystemRecord {
        subsystem,
        status,
        fields,
    })
}

// ── Alerts ─────────────────────────────────────────────────────────

impl From<LegacyAlarm> for AlertRecord {
    fn from(alarm: LegacyAlarm) -> Self {
        let fields = match serde_json::to_value(&alarm) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => Attributes::new(),
        };
        Self {
            id: alarm.id,
            archived: alarm.archived.unwrap_or(false),
            message: alarm.msg.unwrap_or_default(),
            fields,
        }
    }
}

// ── Devices ────────────────────────────────────────────────────────

/// Convert one `port_table` entry. `None` when the port has no index.
fn port_record(port: LegacyPort) -> Option<PortRecord> {
    let port_index = port.port_idx?;
    Some(PortRecord {
        name: port
            .name
            .unwrap_or_else(|| format!("Port {port_index}")),
        port_index,
        is_poe_capable: port.port_poe,
        poe_mode: port.poe_mode,
        poe_voltage: port.poe_voltage,
        poe_current: port.poe_current,
        poe_power: port.poe_power,
    })
}

/// Convert one `stat/device` entry. `None` when the device has no MAC.
pub fn device_record(device: LegacyDevice) -> Option<DeviceRecord> {
    if device.mac.trim().is_empty() {
        debug!(id = %device.id, "skipping device without MAC");
        return None;
    }

    let device_id = device.rest_id().to_owned();
    let mut fields = device.extra;
    if let Some(kind) = device.device_type {
        fields.insert("type".into(), serde_json::Value::String(kind));
    }

    Some(DeviceRecord {
        device_id,
        mac: MacAddress::new(&device.mac),
        name: device.name,
        model: device.model,
        serial: device.serial,
        version: device.version,
        ip: device.ip,
        state_code: device.state,
        uptime_seconds: device.uptime,
        port_table: device.port_table.into_iter().filter_map(port_record).collect(),
        fields,
    })
}

// ── Snapshot ───────────────────────────────────────────────────────

/// Assemble a snapshot from the three raw fetch results.
pub fn build_snapshot(
    captured_at: DateTime<Utc>,
    health: Vec<serde_json::Value>,
    alarms: Vec<LegacyAlarm>,
    devices: Vec<LegacyDevice>,
) -> Snapshot {
    Snapshot::new(
        captured_at,
        health.into_iter().filter_map(subsystem_record).collect(),
        alarms.into_iter().map(AlertRecord::from).collect(),
        devices.into_iter().filter_map(device_record).collect(),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_subsystems_are_ignored() {
        assert!(subsystem_record(json!({ "subsystem": "gw", "status": "ok" })).is_none());
        assert!(subsystem_record(json!("wan")).is_none());

        let wan = subsystem_record(json!({ "subsystem": "wan", "status": "ok", "wan_ip": "1.2.3.4" }))
            .unwrap();
        assert_eq!(wan.subsystem, Subsystem::Wan);
        assert_eq!(wan.field("wan_ip"), Some(&json!("1.2.3.4")));
        assert_eq!(wan.field("subsystem"), Some(&json!("wan")));
    }

    #[test]
    fn alarm_defaults_when_fields_missing() {
        let alarm: LegacyAlarm = serde_json::from_value(json!({ "_id": "a1" })).unwrap();
        let record = AlertRecord::from(alarm);
        assert!(!record.archived);
        assert_eq!(record.message, "");
        assert_eq!(record.fields.get("_id"), Some(&json!("a1")));
    }

    #[test]
    fn device_conversion_normalizes_mac_and_names_ports() {
        let raw: LegacyDevice = serde_json::from_value(json!({
            "_id": "dev1",
            "mac": "AA:BB:CC:DD:EE:FF",
            "type": "usw",
            "state": 1,
            "upgradable": true,
            "port_table": [{ "port_idx": 4, "port_poe": true, "poe_mode": "off" }]
        }))
        .unwrap();
        let device = device_record(raw).unwrap();
        assert_eq!(device.mac.as_str(), "aa:bb:cc:dd:ee:ff");
        assert_eq!(device.port_table[0].name, "Port 4");
        assert_eq!(device.fields.get("type"), Some(&json!("usw")));
        assert!(device.is_upgradable());
    }

    #[test]
    fn devices_without_mac_are_skipped() {
        let raw: LegacyDevice =
            serde_json::from_value(json!({ "_id": "dev1", "mac": "" })).unwrap();
        assert!(device_record(raw).is_none());
    }

    #[test]
    fn malformed_device_entries_are_contained() {
        let devices: Vec<LegacyDevice> = serde_json::from_value(json!([
            { "_id": "d1", "mac": "aa:bb:cc:dd:ee:01", "state": 1,
              "port_table": [{ "name": "orphan" }, { "port_idx": 3, "port_poe": true }] },
            { "_id": "d2", "state": 1 },
            { "_id": "d3", "mac": "aa:bb:cc:dd:ee:03", "state": null }
        ]))
        .unwrap();

        let snapshot = build_snapshot(Utc::now(), Vec::new(), Vec::new(), devices);
        let macs: Vec<&str> = snapshot.devices().iter().map(|d| d.mac.as_str()).collect();
        assert_eq!(macs, vec!["aa:bb:cc:dd:ee:01", "aa:bb:cc:dd:ee:03"]);

        let first = &snapshot.devices()[0];
        assert_eq!(first.port_table.len(), 1);
        assert_eq!(first.port_table[0].port_index, 3);
        assert_eq!(snapshot.devices()[1].state_code, 0);
    }
}
