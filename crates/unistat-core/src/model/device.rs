use serde::{Deserialize, Serialize};

use super::{Attributes, MacAddress, is_truthy};

/// A managed device from the inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub device_id: String,
    pub mac: MacAddress,
    pub name: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
    pub version: Option<String>,
    pub ip: Option<String>,
    /// Raw controller state code; see [`crate::state::DeviceReachability`].
    pub state_code: i64,
    pub uptime_seconds: Option<i64>,
    pub port_table: Vec<PortRecord>,
    /// Fields not modelled above (`upgradable`, `type`, ...).
    pub fields: Attributes,
}

impl DeviceRecord {
    /// Name shown to users: the configured name, else the IP, else the MAC.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.ip.as_deref())
            .unwrap_or(self.mac.as_str())
    }

    pub fn port(&self, port_index: u32) -> Option<&PortRecord> {
        self.port_table.iter().find(|p| p.port_index == port_index)
    }

    /// Whether the controller offers a firmware upgrade for this device.
    pub fn is_upgradable(&self) -> bool {
        self.fields.get("upgradable").is_some_and(is_truthy)
    }
}

/// One switch port of a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortRecord {
    pub port_index: u32,
    pub name: String,
    pub is_poe_capable: bool,
    /// `"auto"` when powered; anything else (usually `"off"`) is unpowered.
    pub poe_mode: Option<String>,
    pub poe_voltage: Option<f64>,
    pub poe_current: Option<f64>,
    pub poe_power: Option<f64>,
}
