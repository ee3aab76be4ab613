// Legacy API HTTP client
//
// Site-scoped URL construction, the `{ meta, data }` envelope, and the
// UniFi OS CSRF handshake. Endpoint groups (health, alarms, devices, auth)
// live in sibling files as inherent methods.

use std::sync::RwLock;

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::ControllerPlatform;
use crate::error::Error;
use crate::legacy::models::LegacyResponse;
use crate::transport::TransportConfig;

/// Message the classic controller sends (with HTTP 200) once the session
/// cookie is no longer accepted.
const LOGIN_REQUIRED: &str = "api.err.LoginRequired";

/// Header carrying a rotated CSRF token on UniFi OS responses.
const UPDATED_CSRF_HEADER: &str = "X-Updated-CSRF-Token";

/// Client for one site of a controller's legacy JSON API.
///
/// Every request helper returns the unwrapped `data` array.
pub struct LegacyClient {
    http: reqwest::Client,
    base_url: Url,
    site: String,
    platform: ControllerPlatform,
    /// Sent as `X-CSRF-Token` on writes. Only UniFi OS issues one.
    csrf: RwLock<Option<String>>,
}

impl LegacyClient {
    /// Build a client whose HTTP stack keeps cookies, which the legacy
    /// login depends on.
    pub fn new(
        base_url: Url,
        site: String,
        platform: ControllerPlatform,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let transport = match transport.cookie_jar {
            Some(_) => transport.clone(),
            None => transport.clone().with_cookie_jar(),
        };
        Ok(Self::with_client(
            transport.build_client()?,
            base_url,
            site,
            platform,
        ))
    }

    /// Wrap an existing `reqwest::Client`. The caller is responsible for
    /// giving it a cookie store.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        site: String,
        platform: ControllerPlatform,
    ) -> Self {
        Self {
            http,
            base_url,
            site,
            platform,
            csrf: RwLock::new(None),
        }
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn platform(&self) -> ControllerPlatform {
        self.platform
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── CSRF ─────────────────────────────────────────────────────────

    pub(crate) fn set_csrf_token(&self, token: String) {
        debug!("storing CSRF token");
        *self.csrf.write().expect("CSRF lock poisoned") = Some(token);
    }

    pub(crate) fn clear_csrf_token(&self) {
        self.csrf.write().expect("CSRF lock poisoned").take();
    }

    fn rotate_csrf(&self, headers: &HeaderMap) {
        let rotated = headers
            .get(UPDATED_CSRF_HEADER)
            .and_then(|v| v.to_str().ok());
        if let Some(token) = rotated {
            trace!("CSRF token rotated");
            self.set_csrf_token(token.to_owned());
        }
    }

    // ── URLs ─────────────────────────────────────────────────────────

    /// `{base}{path}`, for the login and logout endpoints.
    pub(crate) fn root_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    /// `{base}{prefix}/api/s/{site}/{path}`
    pub(crate) fn site_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let prefix = self.platform.legacy_prefix();
        Ok(Url::parse(&format!(
            "{base}{prefix}/api/s/{}/{path}",
            self.site
        ))?)
    }

    // ── Requests ─────────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, Error> {
        self.send(Method::GET, url, None::<&()>).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<Vec<T>, Error> {
        self.send(Method::POST, url, Some(body)).await
    }

    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<Vec<T>, Error> {
        self.send(Method::PUT, url, Some(body)).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<Vec<T>, Error> {
        debug!(%method, %url, "legacy request");
        let mut request = self.http.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }
        if method != Method::GET {
            if let Some(token) = self.csrf.read().expect("CSRF lock poisoned").as_deref() {
                request = request.header("X-CSRF-Token", token);
            }
        }

        let resp = request.send().await?;
        self.rotate_csrf(resp.headers());

        let status = resp.status();
        let body = resp.text().await?;
        if let Some(err) = status_error(status, &body) {
            return Err(err);
        }
        decode_envelope(&body)
    }
}

/// Errors carried by the HTTP status alone.
fn status_error(status: StatusCode, body: &str) -> Option<Error> {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Some(Error::Authentication {
            message: format!("controller refused the session (HTTP {})", status.as_u16()),
        }),
        s if !s.is_success() => Some(Error::LegacyApi {
            message: format!("HTTP {s}: {}", preview(body)),
        }),
        _ => None,
    }
}

/// UniFi OS sometimes answers HTTP 200 with `{"error":{"code":N,"message":..}}`.
#[derive(serde::Deserialize)]
struct UnifiOsFailure {
    error: Option<UnifiOsFailureBody>,
}

#[derive(serde::Deserialize)]
struct UnifiOsFailureBody {
    code: u16,
    message: Option<String>,
}

/// Unwrap `data` from a 2xx body, mapping `meta.rc != "ok"` and the UniFi OS
/// error wrapper to errors.
fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, Error> {
    if let Ok(UnifiOsFailure { error: Some(failure) }) = serde_json::from_str(body) {
        let message = failure.message.unwrap_or_default();
        return Err(match failure.code {
            401 => Error::Authentication { message },
            code => Error::LegacyApi {
                message: format!("UniFi OS error {code}: {message}"),
            },
        });
    }

    let envelope: LegacyResponse<T> =
        serde_json::from_str(body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(body)),
            body: body.to_owned(),
        })?;

    if envelope.meta.rc == "ok" {
        return Ok(envelope.data);
    }
    match envelope.meta.msg {
        Some(msg) if msg == LOGIN_REQUIRED => Err(Error::SessionExpired),
        Some(message) => Err(Error::LegacyApi { message }),
        None => Err(Error::LegacyApi {
            message: format!("rc={}", envelope.meta.rc),
        }),
    }
}

fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}
