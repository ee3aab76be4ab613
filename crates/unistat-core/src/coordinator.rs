// ── Polling coordinator ──
//
// Owns the controller session, the refresh schedule, the consecutive
// failure counter and the last good snapshot. Refreshes are single-flight:
// the fetch sequence runs in a spawned task and every concurrent caller
// awaits the same shared outcome. Crossing the failure threshold tears the
// session down, opens a new one and retries exactly once.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::convert::build_snapshot;
use crate::error::CoreError;
use crate::model::{MacAddress, Snapshot};
use crate::session::{ControllerSession, SessionFactory};

/// Consecutive failures that trigger a session recreate.
pub const FAILURE_THRESHOLD: u32 = 3;

// ── RefreshOutcome ───────────────────────────────────────────────────

/// Result of one refresh cycle, shared by every caller that joined it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// A new snapshot was published.
    Success { captured_at: DateTime<Utc> },
    /// Below the threshold: the previous snapshot keeps serving.
    SoftFailure {
        consecutive_failures: u32,
        message: String,
    },
    /// Recreate-and-retry did not recover; the coordinator is unavailable
    /// until the next success.
    HardFailure { message: String },
}

impl RefreshOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

// ── Coordinator ──────────────────────────────────────────────────────

/// Cheaply cloneable handle to the polling state of one controller site.
pub struct Coordinator<F: SessionFactory> {
    inner: Arc<Inner<F>>,
}

impl<F: SessionFactory> Clone for Coordinator<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<F: SessionFactory> {
    factory: F,
    poll_interval: Duration,
    session: ArcSwapOption<F::Session>,
    snapshot: ArcSwapOption<Snapshot>,
    /// Only written by the in-flight refresh task.
    failures: AtomicU32,
    available: AtomicBool,
    /// The in-flight refresh, tagged so a finished task never clears a newer one.
    in_flight: Mutex<Option<(u64, SharedRefresh)>>,
    next_flight: AtomicU64,
    outcome: watch::Sender<Option<RefreshOutcome>>,
    cancel: CancellationToken,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl<F: SessionFactory> Coordinator<F> {
    /// Create an idle coordinator. Call [`start()`](Self::start) to open
    /// the session.
    pub fn new(factory: F, poll_interval: Duration) -> Self {
        let (outcome, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                factory,
                poll_interval,
                session: ArcSwapOption::empty(),
                snapshot: ArcSwapOption::empty(),
                failures: AtomicU32::new(0),
                available: AtomicBool::new(false),
                in_flight: Mutex::new(None),
                next_flight: AtomicU64::new(0),
                outcome,
                cancel: CancellationToken::new(),
                driver: Mutex::new(None),
            }),
        }
    }

    pub fn factory(&self) -> &F {
        &self.inner.factory
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Open the initial session. Auth and connectivity errors propagate
    /// unchanged.
    pub async fn start(&self) -> Result<(), CoreError> {
        let session = self.inner.factory.open().await?;
        self.inner.session.store(Some(Arc::new(session)));
        debug!("coordinator started");
        Ok(())
    }

    /// Start the periodic driver. The first tick fires immediately; later
    /// ticks are delayed rather than bursted when a cycle runs long.
    pub fn spawn_polling(&self) {
        let mut driver = self.inner.driver.lock().expect("driver lock poisoned");
        if driver.is_some() {
            return;
        }
        let coordinator = self.clone();
        let cancel = self.inner.cancel.clone();
        *driver = Some(tokio::spawn(polling_task(coordinator, cancel)));
    }

    /// Stop the driver and close the session (best effort).
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let driver = self.inner.driver.lock().expect("driver lock poisoned").take();
        if let Some(handle) = driver {
            let _ = handle.await;
        }

        if let Some(session) = self.inner.session.swap(None) {
            if let Err(e) = session.close().await {
                warn!(error = %e, "session close failed (non-fatal)");
            }
        }
        debug!("coordinator shut down");
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Start a refresh cycle, or join the one already in flight, and
    /// resolve to its outcome. The cycle begins on call; dropping the
    /// returned future does not cancel it.
    pub fn refresh(&self) -> impl Future<Output = RefreshOutcome> + Send + 'static {
        self.join_or_start()
    }

    /// Trigger a refresh outside the timer cadence without waiting for it.
    pub fn request_refresh(&self) {
        drop(self.join_or_start());
    }

    fn join_or_start(&self) -> SharedRefresh {
        let mut slot = self.inner.in_flight.lock().expect("refresh slot lock poisoned");
        if let Some((_, flight)) = slot.as_ref() {
            debug!("joining in-flight refresh");
            return flight.clone();
        }

        let id = self.inner.next_flight.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let outcome = inner.run_refresh().await;
            inner.finish_flight(id);
            inner.outcome.send_replace(Some(outcome.clone()));
            outcome
        });

        let flight = async move {
            task.await.unwrap_or_else(|e| RefreshOutcome::HardFailure {
                message: format!("refresh task failed: {e}"),
            })
        }
        .boxed()
        .shared();

        *slot = Some((id, flight.clone()));
        flight
    }

    // ── Readers ──────────────────────────────────────────────────────

    /// The last good snapshot; `None` before the first successful refresh.
    pub fn current_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner.snapshot.load_full()
    }

    /// Watch the outcome of each completed refresh.
    pub fn subscribe(&self) -> watch::Receiver<Option<RefreshOutcome>> {
        self.inner.outcome.subscribe()
    }

    /// False before the first success and after a hard failure.
    pub fn is_available(&self) -> bool {
        self.inner.available.load(Ordering::Acquire)
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.inner.failures.load(Ordering::Acquire)
    }

    // ── Control ──────────────────────────────────────────────────────

    /// Restart a device, then request a refresh.
    pub async fn restart_device(&self, mac: &MacAddress) -> Result<(), CoreError> {
        let session = self.inner.current_session()?;
        match session.restart_device(mac).await {
            Ok(()) => {
                info!(%mac, "device restart requested");
                self.request_refresh();
                Ok(())
            }
            Err(e) => {
                warn!(%mac, error = %e, "device restart failed");
                Err(e)
            }
        }
    }

    /// Switch PoE on a port, then request a refresh. No optimistic update:
    /// the new state shows up with the next snapshot.
    pub async fn set_port_power(
        &self,
        mac: &MacAddress,
        port_index: u32,
        on: bool,
    ) -> Result<(), CoreError> {
        let session = self.inner.current_session()?;
        match session.set_port_power(mac, port_index, on).await {
            Ok(()) => {
                info!(%mac, port_index, on, "port power change requested");
                self.request_refresh();
                Ok(())
            }
            Err(e) => {
                warn!(%mac, port_index, on, error = %e, "port power change failed");
                Err(e)
            }
        }
    }
}

impl<F: SessionFactory> Inner<F> {
    fn current_session(&self) -> Result<Arc<F::Session>, CoreError> {
        self.session
            .load_full()
            .ok_or(CoreError::ControllerDisconnected)
    }

    fn finish_flight(&self, id: u64) {
        let mut slot = self.in_flight.lock().expect("refresh slot lock poisoned");
        if slot.as_ref().is_some_and(|(current, _)| *current == id) {
            *slot = None;
        }
    }

    async fn run_refresh(&self) -> RefreshOutcome {
        let err = match self.fetch_snapshot().await {
            Ok(snapshot) => return self.publish(snapshot),
            Err(e) => e,
        };

        let failures = self.failures.fetch_add(1, Ordering::AcqRel) + 1;
        if failures < FAILURE_THRESHOLD {
            warn!(
                failures,
                threshold = FAILURE_THRESHOLD,
                error = %err,
                "refresh failed, serving previous snapshot"
            );
            return RefreshOutcome::SoftFailure {
                consecutive_failures: failures,
                message: err.to_string(),
            };
        }

        warn!(
            failures,
            threshold = FAILURE_THRESHOLD,
            error = %err,
            "failure threshold reached, recreating session"
        );
        if let Err(e) = self.recreate_session().await {
            error!(error = %e, "session recreate failed");
            return self.hard_failure(&e);
        }

        match self.fetch_snapshot().await {
            Ok(snapshot) => {
                info!("refresh recovered after session recreate");
                self.publish(snapshot)
            }
            Err(e) => {
                error!(error = %e, "refresh failed after session recreate");
                self.hard_failure(&e)
            }
        }
    }

    async fn fetch_snapshot(&self) -> Result<Snapshot, CoreError> {
        let session = self.current_session()?;
        let (health, alerts, devices) = tokio::try_join!(
            session.fetch_health(),
            session.fetch_alerts(),
            session.fetch_devices(),
        )?;
        Ok(build_snapshot(Utc::now(), health, alerts, devices))
    }

    /// Close the current session (errors ignored) and open a new one. The
    /// counter resets only once the new session exists.
    async fn recreate_session(&self) -> Result<(), CoreError> {
        if let Some(old) = self.session.swap(None) {
            if let Err(e) = old.close().await {
                debug!(error = %e, "ignoring close error during recreate");
            }
        }
        let session = self.factory.open().await?;
        self.session.store(Some(Arc::new(session)));
        self.failures.store(0, Ordering::Release);
        Ok(())
    }

    fn publish(&self, snapshot: Snapshot) -> RefreshOutcome {
        let captured_at = snapshot.captured_at;
        debug!(
            subsystems = snapshot.health().len(),
            alerts = snapshot.alerts().len(),
            devices = snapshot.devices().len(),
            "snapshot published"
        );
        self.snapshot.store(Some(Arc::new(snapshot)));
        self.failures.store(0, Ordering::Release);
        self.available.store(true, Ordering::Release);
        RefreshOutcome::Success { captured_at }
    }

    fn hard_failure(&self, err: &CoreError) -> RefreshOutcome {
        self.available.store(false, Ordering::Release);
        RefreshOutcome::HardFailure {
            message: err.to_string(),
        }
    }
}

// ── Background driver ────────────────────────────────────────────────

async fn polling_task<F: SessionFactory>(coordinator: Coordinator<F>, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(coordinator.inner.poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => coordinator.request_refresh(),
        }
    }
    debug!("polling driver stopped");
}
