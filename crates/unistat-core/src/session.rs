// ── Controller session seam ──
//
// The coordinator talks to the controller only through these traits so
// the refresh/recreate logic can run against any backend. The production
// implementation wraps `unistat_api::LegacyClient`.

use std::future::Future;

use tracing::{debug, info};

use unistat_api::{LegacyAlarm, LegacyClient, LegacyDevice};

use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::model::MacAddress;

/// An authenticated connection to one controller site.
pub trait ControllerSession: Send + Sync + 'static {
    /// Raw per-subsystem health records.
    fn fetch_health(
        &self,
    ) -> impl Future<Output = Result<Vec<serde_json::Value>, CoreError>> + Send;

    /// All alarms, archived ones included.
    fn fetch_alerts(&self) -> impl Future<Output = Result<Vec<LegacyAlarm>, CoreError>> + Send;

    /// The device inventory with port tables.
    fn fetch_devices(&self) -> impl Future<Output = Result<Vec<LegacyDevice>, CoreError>> + Send;

    fn restart_device(
        &self,
        mac: &MacAddress,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Power a PoE port on (`"auto"`) or off.
    fn set_port_power(
        &self,
        mac: &MacAddress,
        port_index: u32,
        on: bool,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// End the session. Callers treat errors as best-effort.
    fn close(&self) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// Opens fresh sessions; used at start and on threshold recovery.
pub trait SessionFactory: Send + Sync + 'static {
    type Session: ControllerSession;

    fn open(&self) -> impl Future<Output = Result<Self::Session, CoreError>> + Send;
}

// ── Legacy API implementation ────────────────────────────────────────

/// Opens cookie-authenticated [`LegacySession`]s from a [`ControllerConfig`].
#[derive(Debug, Clone)]
pub struct LegacySessionFactory {
    config: ControllerConfig,
}

impl LegacySessionFactory {
    pub fn new(config: ControllerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }
}

impl SessionFactory for LegacySessionFactory {
    type Session = LegacySession;

    async fn open(&self) -> Result<LegacySession, CoreError> {
        let config = &self.config;
        let transport = config.transport();

        let platform = match config.platform {
            Some(platform) => platform,
            None => {
                let detected = LegacyClient::detect_platform(&config.url, &transport).await?;
                debug!(?detected, "detected controller platform");
                detected
            }
        };

        let client = LegacyClient::new(
            config.url.clone(),
            config.site.clone(),
            platform,
            &transport,
        )?;
        client.login(&config.username, &config.password).await?;
        info!(url = %config.url, site = %config.site, "controller session opened");

        Ok(LegacySession { client })
    }
}

/// A logged-in legacy API client.
pub struct LegacySession {
    client: LegacyClient,
}

impl ControllerSession for LegacySession {
    async fn fetch_health(&self) -> Result<Vec<serde_json::Value>, CoreError> {
        Ok(self.client.get_health().await?)
    }

    async fn fetch_alerts(&self) -> Result<Vec<LegacyAlarm>, CoreError> {
        Ok(self.client.list_alarms().await?)
    }

    async fn fetch_devices(&self) -> Result<Vec<LegacyDevice>, CoreError> {
        Ok(self.client.list_devices().await?)
    }

    async fn restart_device(&self, mac: &MacAddress) -> Result<(), CoreError> {
        Ok(self.client.restart_device(mac.as_str()).await?)
    }

    async fn set_port_power(
        &self,
        mac: &MacAddress,
        port_index: u32,
        on: bool,
    ) -> Result<(), CoreError> {
        Ok(self
            .client
            .set_port_poe(mac.as_str(), port_index, on)
            .await?)
    }

    async fn close(&self) -> Result<(), CoreError> {
        Ok(self.client.logout().await?)
    }
}
