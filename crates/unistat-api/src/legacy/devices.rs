// Legacy API device endpoints
//
// Device inventory via stat/device, commands via cmd/devmgr, and
// per-port PoE control via rest/device port overrides.

use serde_json::json;
use tracing::debug;

use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::legacy::models::{LegacyDevice, PortOverride};

/// `poe_mode` value that powers a port.
pub const POE_MODE_ON: &str = "auto";
/// `poe_mode` value that cuts power to a port.
pub const POE_MODE_OFF: &str = "off";

impl LegacyClient {
    /// List all devices with full statistics.
    ///
    /// `GET /api/s/{site}/stat/device`
    pub async fn list_devices(&self) -> Result<Vec<LegacyDevice>, Error> {
        let url = self.site_url("stat/device")?;
        debug!("listing devices");
        self.get(url).await
    }

    /// Get a single device by MAC address.
    ///
    /// Returns `None` if no device matches.
    pub async fn get_device(&self, mac: &str) -> Result<Option<LegacyDevice>, Error> {
        let url = self.site_url("stat/device")?;
        let body = json!({ "macs": [mac.to_lowercase()] });
        let devices: Vec<LegacyDevice> = self.post(url, &body).await?;
        Ok(devices.into_iter().next())
    }

    /// Restart a device.
    ///
    /// `POST /api/s/{site}/cmd/devmgr` with `{"cmd": "restart", "mac": "..."}`
    pub async fn restart_device(&self, mac: &str) -> Result<(), Error> {
        let url = self.site_url("cmd/devmgr")?;
        debug!(mac, "restarting device");
        let _: Vec<serde_json::Value> = self
            .post(
                url,
                &json!({
                    "cmd": "restart",
                    "mac": mac,
                }),
            )
            .await?;
        Ok(())
    }

    /// Enable or disable PoE output on one switch port.
    ///
    /// Reads the device's current `port_overrides`, replaces the `poe_mode`
    /// of `port_idx` and writes the whole list back with
    /// `PUT /api/s/{site}/rest/device/{id}`. Other overrides are preserved.
    pub async fn set_port_poe(&self, mac: &str, port_idx: u32, enabled: bool) -> Result<(), Error> {
        let device = self
            .get_device(mac)
            .await?
            .ok_or_else(|| Error::DeviceNotFound {
                mac: mac.to_owned(),
            })?;

        let mode = if enabled { POE_MODE_ON } else { POE_MODE_OFF };
        let rest_id = device.rest_id().to_owned();
        let overrides = merge_poe_override(device.port_overrides, port_idx, mode);

        let url = self.site_url(&format!("rest/device/{rest_id}"))?;
        debug!(mac, port_idx, mode, "setting port PoE mode");
        let _: Vec<serde_json::Value> = self
            .put(url, &json!({ "port_overrides": overrides }))
            .await?;
        Ok(())
    }
}

/// Set `poe_mode` for `port_idx`, adding an override entry if the port has none.
pub fn merge_poe_override(
    mut overrides: Vec<PortOverride>,
    port_idx: u32,
    mode: &str,
) -> Vec<PortOverride> {
    if let Some(existing) = overrides.iter_mut().find(|o| o.port_idx == port_idx) {
        existing.poe_mode = Some(mode.to_owned());
    } else {
        overrides.push(PortOverride {
            port_idx,
            poe_mode: Some(mode.to_owned()),
            extra: serde_json::Map::new(),
        });
    }
    overrides
}

#[cfg(test)]
mod tests {
    use super::*;

    fn override_for(port_idx: u32, poe_mode: Option<&str>) -> PortOverride {
        PortOverride {
            port_idx,
            poe_mode: poe_mode.map(String::from),
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn merge_replaces_existing_port_mode() {
        let merged = merge_poe_override(
            vec![override_for(1, Some("auto")), override_for(2, Some("auto"))],
            2,
            POE_MODE_OFF,
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].poe_mode.as_deref(), Some("auto"));
        assert_eq!(merged[1].poe_mode.as_deref(), Some("off"));
    }

    #[test]
    fn merge_appends_missing_port() {
        let merged = merge_poe_override(vec![override_for(1, None)], 7, POE_MODE_ON);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].port_idx, 7);
        assert_eq!(merged[1].poe_mode.as_deref(), Some("auto"));
        assert_eq!(merged[0].poe_mode, None);
    }
}
