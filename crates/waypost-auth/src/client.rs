//! Gateway for the identity endpoints.
//!
//! This module provides `AuthClient`, which performs the login, registration,
//! and logout exchanges against the Waypost identity endpoints and keeps the
//! in-memory session and its durable copy consistent. Every other
//! authenticated request in the application derives its headers from
//! `auth_headers`.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::session::{Session, SessionState};
use crate::store::TokenStore;

// ============================================================================
// Constants
// ============================================================================

/// Login endpoint, relative to the configured base URL.
const LOGIN_PATH: &str = "/auth/login";

/// Registration endpoint, relative to the configured base URL.
const REGISTER_PATH: &str = "/auth/register";

/// HTTP request timeout in seconds.
/// 30s allows for slow responses while failing fast enough for a login form.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Rejection message when a login failure body carries none.
const LOGIN_FALLBACK: &str = "Login failed";

/// Rejection message when a registration failure body carries none.
const REGISTER_FALLBACK: &str = "Registration failed";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Successful login payload: the token plus the application-defined user
/// record, passed through verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: Value,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Client for the identity endpoints.
/// Clone is cheap - reqwest::Client uses Arc internally, and clones share the
/// same session state, so there is one session per process.
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: Client,
    config: AuthConfig,
    store: TokenStore,
    state: SessionState,
}

impl AuthClient {
    /// Create a client, restoring any persisted session from the token store.
    /// Purely local - no request is made.
    pub fn new(config: AuthConfig) -> AuthResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let store = TokenStore::new(&config.data_dir);
        let state = SessionState::new(store.load());

        Ok(Self {
            client,
            config,
            store,
            state,
        })
    }

    /// Handle to the observable session state.
    pub fn state(&self) -> SessionState {
        self.state.clone()
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.state.get()
    }

    /// Whether a user is currently logged in.
    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    /// Log in with a username and password.
    ///
    /// On success the session is written to the token store first, then to
    /// the in-memory state; a persistence failure surfaces as
    /// `AuthError::Storage` with the in-memory session untouched. Rejections
    /// and transport faults mutate nothing. A success body carrying an empty
    /// token is returned without being committed - an empty token is never a
    /// session.
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<LoginResponse> {
        let response = self
            .client
            .post(self.config.endpoint(LOGIN_PATH))
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            debug!(%status, "Login rejected");
            return Err(AuthError::Rejected(rejection_message(&body, LOGIN_FALLBACK)));
        }

        let payload: LoginResponse = response.json().await?;

        if payload.token.is_empty() {
            warn!("Login response carried an empty token; session unchanged");
            return Ok(payload);
        }

        let session = Session::Authenticated {
            token: payload.token.clone(),
            profile: payload.user.clone(),
        };
        self.store.save(&session).map_err(AuthError::Storage)?;
        self.state.set(session);

        info!("Login succeeded");
        Ok(payload)
    }

    /// Register a new user. A successful registration is not a login: the
    /// session is untouched and the decoded response body is returned
    /// verbatim.
    pub async fn register(&self, user_data: &impl Serialize) -> AuthResult<Value> {
        let response = self
            .client
            .post(self.config.endpoint(REGISTER_PATH))
            .json(user_data)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            debug!(%status, "Registration rejected");
            return Err(AuthError::Rejected(rejection_message(
                &body,
                REGISTER_FALLBACK,
            )));
        }

        Ok(response.json().await?)
    }

    /// Log out, clearing the in-memory session and its durable copy. Local
    /// only - no request is made and nothing can fail.
    pub fn logout(&self) {
        self.state.clear();
        self.store.clear();
        info!("Logged out");
    }

    /// Headers for an authenticated request: the JSON content type, plus a
    /// bearer authorization entry iff a user is logged in. Derived from the
    /// live session on every call, so build these per request.
    pub fn auth_headers(&self) -> AuthResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = self.state.token() {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}"))?,
            );
        }
        Ok(headers)
    }
}

/// Extract the server's `message` from a failure body, falling back when the
/// body is not JSON or the field is absent or empty.
fn rejection_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
