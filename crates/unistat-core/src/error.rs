// ── Core error types ──
//
// Errors surfaced by unistat-core. Consumers never see HTTP status codes
// or JSON parse failures directly: `From<unistat_api::Error>` folds them
// into two families, authentication and connectivity, which is all the
// coordinator and the probe need to tell apart.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Controller disconnected")]
    ControllerDisconnected,

    #[error("Controller request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Credentials were rejected or the session was refused.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }

    /// Transient failure worth retrying on the next poll.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. }
                | Self::ControllerDisconnected
                | Self::Timeout
                | Self::Api { .. }
                | Self::Internal(_)
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<unistat_api::Error> for CoreError {
    fn from(err: unistat_api::Error) -> Self {
        match err {
            unistat_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            unistat_api::Error::SessionExpired => CoreError::AuthenticationFailed {
                message: "Session expired -- re-authentication required".into(),
            },
            unistat_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            unistat_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            unistat_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            unistat_api::Error::LegacyApi { message } => CoreError::Api {
                message,
                status: None,
            },
            unistat_api::Error::DeviceNotFound { mac } => {
                CoreError::DeviceNotFound { identifier: mac }
            }
            unistat_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

/// Why a derivation rule produced no value.
///
/// Always contained by the engine: the reading degrades to "no value".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DerivationError {
    #[error("field `{field}` is missing")]
    MissingField { field: &'static str },

    #[error("field `{field}` is not {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("field `{field}` is out of range")]
    OutOfRange { field: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_map_to_authentication_failed() {
        let err: CoreError = unistat_api::Error::Authentication {
            message: "bad password".into(),
        }
        .into();
        assert!(err.is_auth());
        assert!(!err.is_connectivity());

        let expired: CoreError = unistat_api::Error::SessionExpired.into();
        assert!(expired.is_auth());
    }

    #[test]
    fn envelope_errors_are_connectivity() {
        let err: CoreError = unistat_api::Error::LegacyApi {
            message: "api.err.NoSiteContext".into(),
        }
        .into();
        assert!(err.is_connectivity());
        assert!(CoreError::ControllerDisconnected.is_connectivity());
    }

    #[test]
    fn missing_device_keeps_identifier() {
        let err: CoreError = unistat_api::Error::DeviceNotFound {
            mac: "aa:bb:cc:dd:ee:ff".into(),
        }
        .into();
        assert!(
            matches!(err, CoreError::DeviceNotFound { ref identifier } if identifier == "aa:bb:cc:dd:ee:ff")
        );
    }
}
