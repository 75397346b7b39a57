//! Remote authentication port and its HTTP implementation.
//!
//! # Invariants
//! - One request per call; no retry.
//! - Only status 200 carries a usable body. Other statuses are surfaced
//!   as-is for the session store to classify.
//! - Credentials are never logged.

use crate::model::profile::AuthenticatedUser;
use crate::platform::{PlatformError, PlatformResult};
use log::info;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub const STATUS_OK: u16 = 200;
pub const STATUS_UNAUTHORIZED: u16 = 401;

const LOGIN_PATH: &str = "/user/login";

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct AuthRequest {
    pub email: String,
    pub password: String,
}

impl AuthRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRequest")
            .field("email", &"<redacted>")
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthBody {
    pub user: AuthenticatedUser,
}

/// Outcome of one auth call that reached the server.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthResponse {
    pub status: u16,
    pub token: Option<String>,
    /// Present only for status 200.
    pub body: Option<AuthBody>,
}

impl AuthResponse {
    pub fn status_only(status: u16) -> Self {
        Self {
            status,
            token: None,
            body: None,
        }
    }
}

pub trait AuthClient: Send + Sync {
    /// Performs one sign-in request.
    ///
    /// Returns `Err` only when no HTTP status was obtained.
    fn authenticate(&self, request: &AuthRequest) -> PlatformResult<AuthResponse>;
}

/// Builds an [`AuthResponse`] from raw HTTP parts.
///
/// # Errors
/// - Returns `InvalidResponse` when a 200 body is not the expected JSON.
pub fn parse_auth_response(
    status: u16,
    authorization: Option<&str>,
    body: &[u8],
) -> PlatformResult<AuthResponse> {
    if status != STATUS_OK {
        return Ok(AuthResponse::status_only(status));
    }
    let body = serde_json::from_slice::<AuthBody>(body)
        .map_err(|err| PlatformError::InvalidResponse(format!("auth body: {err}")))?;
    let token = authorization
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);
    Ok(AuthResponse {
        status,
        token,
        body: Some(body),
    })
}

#[derive(Serialize)]
struct LoginEnvelope<'a> {
    user: &'a AuthRequest,
}

/// Blocking HTTP client for the app API `POST /user/login`.
pub struct HttpAuthClient {
    base_url: String,
    timeout: Duration,
    http: reqwest::blocking::Client,
}

impl HttpAuthClient {
    /// `timeout` bounds the whole single attempt, connect through body.
    ///
    /// # Errors
    /// - Returns `Transport` when the HTTP backend cannot be initialized.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> PlatformResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| PlatformError::Transport(format!("http client: {err}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            http,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn login_url(&self) -> String {
        format!("{}{LOGIN_PATH}", self.base_url)
    }
}

impl AuthClient for HttpAuthClient {
    fn authenticate(&self, request: &AuthRequest) -> PlatformResult<AuthResponse> {
        let started_at = Instant::now();
        let response = self
            .http
            .post(self.login_url())
            .json(&LoginEnvelope { user: request })
            .send()
            .map_err(|err| PlatformError::Transport(err.to_string()))?;

        let status = response.status().as_u16();
        let authorization = response
            .headers()
            .get(reqwest::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .map_err(|err| PlatformError::Transport(err.to_string()))?;

        info!(
            "event=auth_request module=platform status={} duration_ms={}",
            status,
            started_at.elapsed().as_millis()
        );
        parse_auth_response(status, authorization.as_deref(), &body)
    }
}
