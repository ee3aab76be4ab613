// ── Device switches ──
//
// Control projections discovered from a snapshot: one restart switch per
// device and one PoE switch per PoE-capable port. State comes from the
// state machine; actions go through the coordinator, which refreshes after
// a successful call.

use serde::Serialize;

use crate::coordinator::Coordinator;
use crate::error::CoreError;
use crate::model::{Attributes, MacAddress, Snapshot};
use crate::session::SessionFactory;
use crate::state::{self, SwitchState};

/// What a switch controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SwitchKind {
    /// Turning on restarts the device; turning off does nothing.
    Restart,
    /// PoE output of one port.
    Poe { port_index: u32 },
}

/// A controllable switch bound to a device MAC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSwitch {
    pub name: String,
    pub mac: MacAddress,
    #[serde(flatten)]
    pub kind: SwitchKind,
}

impl DeviceSwitch {
    /// Every switch the snapshot supports, devices in inventory order.
    pub fn discover(snapshot: &Snapshot, prefix: &str) -> Vec<Self> {
        let mut switches = Vec::new();
        for device in snapshot.devices() {
            let label = device.display_name();
            switches.push(Self {
                name: format!("{prefix} {label} Restart"),
                mac: device.mac.clone(),
                kind: SwitchKind::Restart,
            });
            switches.extend(
                device
                    .port_table
                    .iter()
                    .filter(|port| port.is_poe_capable)
                    .map(|port| Self {
                        name: format!("{prefix} {label} PoE {}", port.name),
                        mac: device.mac.clone(),
                        kind: SwitchKind::Poe {
                            port_index: port.port_index,
                        },
                    }),
            );
        }
        switches
    }

    pub fn state(&self, snapshot: Option<&Snapshot>) -> SwitchState {
        match self.kind {
            SwitchKind::Restart => state::restart_state(snapshot, &self.mac),
            SwitchKind::Poe { port_index } => state::port_state(snapshot, &self.mac, port_index),
        }
    }

    pub fn attributes(&self, snapshot: Option<&Snapshot>) -> Attributes {
        match self.kind {
            SwitchKind::Restart => snapshot
                .and_then(|s| s.device(&self.mac))
                .map(state::restart_attributes)
                .unwrap_or_default(),
            SwitchKind::Poe { port_index } => {
                state::port_attributes(snapshot, &self.mac, port_index)
            }
        }
    }

    /// Restart the device, or power the port.
    pub async fn turn_on<F: SessionFactory>(
        &self,
        coordinator: &Coordinator<F>,
    ) -> Result<(), CoreError> {
        match self.kind {
            SwitchKind::Restart => coordinator.restart_device(&self.mac).await,
            SwitchKind::Poe { port_index } => {
                coordinator.set_port_power(&self.mac, port_index, true).await
            }
        }
    }

    /// Cut port power. A no-op for restart switches.
    pub async fn turn_off<F: SessionFactory>(
        &self,
        coordinator: &Coordinator<F>,
    ) -> Result<(), CoreError> {
        match self.kind {
            SwitchKind::Restart => Ok(()),
            SwitchKind::Poe { port_index } => {
                coordinator.set_port_power(&self.mac, port_index, false).await
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::convert::build_snapshot;

    #[test]
    fn discovers_restart_and_poe_switches() {
        let snap = build_snapshot(
            Utc::now(),
            vec![],
            vec![],
            serde_json::from_value(json!([
                {
                    "_id": "1",
                    "mac": "aa:aa:aa:aa:aa:01",
                    "name": "Core Switch",
                    "state": 1,
                    "port_table": [
                        { "port_idx": 1, "name": "Uplink", "port_poe": false },
                        { "port_idx": 2, "name": "Camera", "port_poe": true, "poe_mode": "auto" }
                    ]
                },
                { "_id": "2", "mac": "aa:aa:aa:aa:aa:02", "ip": "10.0.0.5", "state": 0 }
            ]))
            .unwrap(),
        );

        let switches = DeviceSwitch::discover(&snap, "UniFi Status");
        let names: Vec<&str> = switches.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "UniFi Status Core Switch Restart",
                "UniFi Status Core Switch PoE Camera",
                "UniFi Status 10.0.0.5 Restart",
            ]
        );
        assert_eq!(switches[1].kind, SwitchKind::Poe { port_index: 2 });
        assert_eq!(switches[1].state(Some(&snap)), SwitchState::On);
        assert_eq!(switches[2].state(Some(&snap)), SwitchState::Unavailable);
        assert_eq!(switches[0].attributes(Some(&snap))["mac"], "aa:aa:aa:aa:aa:01");
    }
}
