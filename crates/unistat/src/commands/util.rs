//! Shared helpers for command handlers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use unistat_core::derive::DerivationEngine;
use unistat_core::{
    ControllerConfig, Coordinator, DeviceRecord, LegacySessionFactory, RefreshOutcome,
    SensorCatalog, Snapshot,
};

use crate::error::CliError;

/// An open coordinator plus the engine configured for the same profile.
pub struct Connection {
    pub coordinator: Coordinator<LegacySessionFactory>,
    pub engine: DerivationEngine,
    pub name: String,
    pub timeout: Duration,
}

impl Connection {
    /// Open the controller session. Nothing is fetched yet.
    pub async fn open(config: ControllerConfig) -> Result<Self, CliError> {
        let engine = DerivationEngine::new(
            Arc::new(SensorCatalog::standard()),
            config.monitored.clone(),
            config.name.clone(),
        );
        let name = config.name.clone();
        let timeout = config.timeout;
        let poll_interval = config.poll_interval;
        let coordinator = Coordinator::new(LegacySessionFactory::new(config), poll_interval);
        coordinator.start().await?;
        Ok(Self {
            coordinator,
            engine,
            name,
            timeout,
        })
    }

    /// Run one refresh and return the snapshot it published.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, CliError> {
        match self.coordinator.refresh().await {
            RefreshOutcome::Success { .. } => self.coordinator.current_snapshot().ok_or_else(|| {
                CliError::RefreshFailed {
                    message: "no snapshot after a successful refresh".into(),
                }
            }),
            RefreshOutcome::SoftFailure { message, .. } | RefreshOutcome::HardFailure { message } => {
                Err(CliError::RefreshFailed { message })
            }
        }
    }

    pub async fn close(&self) {
        self.coordinator.shutdown().await;
    }
}

/// Look a device up by MAC, name or IP.
pub fn find_device<'a>(snapshot: &'a Snapshot, needle: &str) -> Result<&'a DeviceRecord, CliError> {
    snapshot
        .find_device(needle)
        .ok_or_else(|| CliError::device_not_found(needle))
}

/// Wait for the next refresh outcome after a control action. The receiver
/// must have been subscribed before the action so the follow-up refresh
/// cannot be missed.
pub async fn await_next_outcome(
    mut outcomes: watch::Receiver<Option<RefreshOutcome>>,
    timeout: Duration,
) -> Result<RefreshOutcome, CliError> {
    let changed = tokio::time::timeout(timeout, outcomes.changed())
        .await
        .map_err(|_| CliError::Timeout)?;
    changed.map_err(|_| CliError::RefreshFailed {
        message: "coordinator stopped".into(),
    })?;
    let outcome = outcomes.borrow_and_update().clone();
    outcome.ok_or_else(|| CliError::RefreshFailed {
        message: "no refresh outcome".into(),
    })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}
