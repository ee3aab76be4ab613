use thiserror::Error;

/// Top-level error type for the `unistat-api` crate.
///
/// Covers authentication, transport, and legacy-envelope failures.
/// `unistat-core` folds these into its auth/connectivity taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed or the session was rejected (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Session has expired (cookie expired or revoked).
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Legacy API ──────────────────────────────────────────────────
    /// Error from the legacy API (parsed from the `{meta: {rc, msg}}` envelope).
    #[error("Legacy API error: {message}")]
    LegacyApi { message: String },

    /// A lookup by MAC returned no device.
    #[error("No device with MAC {mac}")]
    DeviceNotFound { mac: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates auth has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::SessionExpired)
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_are_flagged_as_expired() {
        let err = Error::Authentication {
            message: "bad password".into(),
        };
        assert!(err.is_auth_expired());
        assert!(Error::SessionExpired.is_auth_expired());
        assert!(
            !Error::LegacyApi {
                message: "api.err.NoSiteContext".into()
            }
            .is_auth_expired()
        );
    }

    #[test]
    fn envelope_errors_are_not_transient() {
        let err = Error::LegacyApi {
            message: "rc=error".into(),
        };
        assert!(!err.is_transient());
    }
}
