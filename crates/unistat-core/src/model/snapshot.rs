use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AlertRecord, DeviceRecord, MacAddress, Subsystem, SubsystemRecord};

/// Immutable result of one successful refresh cycle.
///
/// Readers share it through `Arc<Snapshot>`; a refresh always builds a
/// new one and swaps the reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub captured_at: DateTime<Utc>,
    health: Vec<SubsystemRecord>,
    alerts: Vec<AlertRecord>,
    devices: Vec<DeviceRecord>,
}

impl Snapshot {
    /// Assemble a snapshot, keeping the first record per subsystem tag and
    /// the first port per port index.
    pub fn new(
        captured_at: DateTime<Utc>,
        health: Vec<SubsystemRecord>,
        alerts: Vec<AlertRecord>,
        mut devices: Vec<DeviceRecord>,
    ) -> Self {
        let mut seen = HashSet::new();
        let health = health
            .into_iter()
            .filter(|record| {
                let first = seen.insert(record.subsystem);
                if !first {
                    debug!(subsystem = %record.subsystem, "dropping duplicate subsystem record");
                }
                first
            })
            .collect();

        for device in &mut devices {
            let mut ports = HashSet::new();
            device.port_table.retain(|port| {
                let first = ports.insert(port.port_index);
                if !first {
                    debug!(mac = %device.mac, port = port.port_index, "dropping duplicate port");
                }
                first
            });
        }

        Self {
            captured_at,
            health,
            alerts,
            devices,
        }
    }

    pub fn health(&self) -> &[SubsystemRecord] {
        &self.health
    }

    pub fn alerts(&self) -> &[AlertRecord] {
        &self.alerts
    }

    pub fn devices(&self) -> &[DeviceRecord] {
        &self.devices
    }

    pub fn subsystem(&self, subsystem: Subsystem) -> Option<&SubsystemRecord> {
        self.health.iter().find(|r| r.subsystem == subsystem)
    }

    pub fn device(&self, mac: &MacAddress) -> Option<&DeviceRecord> {
        self.devices.iter().find(|d| &d.mac == mac)
    }

    /// Resolve a device by MAC, display name, or IP.
    pub fn find_device(&self, needle: &str) -> Option<&DeviceRecord> {
        let mac = MacAddress::new(needle);
        self.device(&mac).or_else(|| {
            self.devices.iter().find(|d| {
                d.name.as_deref() == Some(needle) || d.ip.as_deref() == Some(needle)
            })
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Attributes, PortRecord};

    fn subsystem(subsystem: Subsystem, status: &str) -> SubsystemRecord {
        SubsystemRecord {
            subsystem,
            status: status.into(),
            fields: Attributes::new(),
        }
    }

    fn port(port_index: u32, name: &str) -> PortRecord {
        PortRecord {
            port_index,
            name: name.into(),
            is_poe_capable: true,
            poe_mode: Some("auto".into()),
            poe_voltage: None,
            poe_current: None,
            poe_power: None,
        }
    }

    fn device(mac: &str, name: &str, ports: Vec<PortRecord>) -> DeviceRecord {
        DeviceRecord {
            device_id: "id".into(),
            mac: MacAddress::new(mac),
            name: Some(name.into()),
            model: None,
            serial: None,
            version: None,
            ip: Some("10.0.0.2".into()),
            state_code: 1,
            uptime_seconds: None,
            port_table: ports,
            fields: Attributes::new(),
        }
    }

    #[test]
    fn first_subsystem_record_wins() {
        let snap = Snapshot::new(
            Utc::now(),
            vec![subsystem(Subsystem::Wan, "ok"), subsystem(Subsystem::Wan, "error")],
            vec![],
            vec![],
        );
        assert_eq!(snap.health().len(), 1);
        assert_eq!(snap.subsystem(Subsystem::Wan).unwrap().status, "ok");
        assert!(snap.subsystem(Subsystem::Vpn).is_none());
    }

    #[test]
    fn duplicate_port_indexes_are_dropped() {
        let snap = Snapshot::new(
            Utc::now(),
            vec![],
            vec![],
            vec![device(
                "aa:bb:cc:dd:ee:01",
                "sw",
                vec![port(1, "first"), port(2, "two"), port(1, "second")],
            )],
        );
        let dev = &snap.devices()[0];
        assert_eq!(dev.port_table.len(), 2);
        assert_eq!(dev.port(1).unwrap().name, "first");
    }

    #[test]
    fn find_device_by_mac_name_or_ip() {
        let snap = Snapshot::new(
            Utc::now(),
            vec![],
            vec![],
            vec![device("aa:bb:cc:dd:ee:01", "office", vec![])],
        );
        assert!(snap.find_device("AA:BB:CC:DD:EE:01").is_some());
        assert!(snap.find_device("office").is_some());
        assert!(snap.find_device("10.0.0.2").is_some());
        assert!(snap.find_device("garage").is_none());
    }
}
