// ── Connectivity probe ──
//
// One-shot validation used before committing a configuration: open a
// session, read site health once, close. Failures are split into bad
// credentials and everything else.

use thiserror::Error;
use tracing::debug;

use crate::error::CoreError;
use crate::session::{ControllerSession, SessionFactory};

/// Why a connection could not be validated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("invalid credentials: {0}")]
    InvalidAuth(String),

    #[error("cannot connect: {0}")]
    CannotConnect(String),
}

/// Open a session, fetch health once, and close it.
pub async fn validate_connection<F: SessionFactory>(factory: &F) -> Result<usize, ProbeError> {
    let session = factory.open().await.map_err(|e| classify(&e))?;
    let result = session.fetch_health().await;
    if let Err(e) = session.close().await {
        debug!(error = %e, "probe logout failed (ignored)");
    }
    let health = result.map_err(|e| classify(&e))?;
    debug!(subsystems = health.len(), "probe succeeded");
    Ok(health.len())
}

/// Authentication errors count as bad credentials, as do controller-reported
/// errors whose message mentions a login or an HTTP 401/403. Transport
/// failures never do, even though their message carries the login URL.
pub fn classify(err: &CoreError) -> ProbeError {
    let message = err.to_string();
    let controller_reported = matches!(err, CoreError::Api { .. } | CoreError::Internal(_));
    let lowered = message.to_lowercase();
    let looks_like_auth = controller_reported
        && ["login", "401", "403"]
            .iter()
            .any(|needle| lowered.contains(needle));

    if err.is_auth() || looks_like_auth {
        ProbeError::InvalidAuth(message)
    } else {
        ProbeError::CannotConnect(message)
    }
}
