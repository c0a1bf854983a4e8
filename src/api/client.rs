//! API client for the Questify backend.
//!
//! `ApiClient` sends every request with the session's current access token
//! attached. When a request comes back 401 it renews the session through the
//! `RefreshGate` - one refresh call no matter how many requests expired at
//! once - and replays the original request exactly once with the new token.
//! Callers never see any of this; they get the final response or a typed
//! `ApiError`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::{Credential, Session};
use crate::models::{Card, CardsResponse, EditCard, LoginResponse, NewCard, RefreshResponse,
    RegisterResponse};

use super::refresh::{RefreshGate, Ticket};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL of the hosted Questify backend.
pub const DEFAULT_BASE_URL: &str = "https://questify-backend.goit.global";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// A request the dispatcher can rebuild and replay.
///
/// Replay works from this description rather than a mutable flag on a
/// caller-owned request object; the retried-at-most-once rule is encoded in
/// the dispatch control flow.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn post_empty(path: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: None,
        }
    }

    pub fn patch(path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method: Method::PATCH,
            path: path.into(),
            body,
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            path: path.into(),
            body: None,
        }
    }
}

/// API client for Questify.
/// Clone is cheap - the reqwest client, session, and refresh gate are shared.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<Session>,
    gate: Arc<RefreshGate>,
}

impl ApiClient {
    /// Create a client against the hosted backend.
    pub fn new(session: Arc<Session>) -> Result<Self, ApiError> {
        Self::with_base_url(DEFAULT_BASE_URL, session)
    }

    /// Create a client against an explicit backend URL (tests, self-hosting).
    pub fn with_base_url(
        base_url: impl Into<String>,
        session: Arc<Session>,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            gate: Arc::new(RefreshGate::new()),
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    // ===== Dispatch =====

    /// Send a request with the current access token, renewing the session
    /// and replaying once if the token has expired.
    ///
    /// Errors:
    /// - `Network` when no response was received; never triggers a refresh
    /// - `Unauthorized` when a 401 could not be recovered from
    /// - `RefreshFailed` when the renewal itself failed (session is torn down)
    /// - `Http` for any other failure status, passed through unmodified
    pub async fn dispatch(&self, request: ApiRequest) -> Result<reqwest::Response, ApiError> {
        let token = self.session.access_token();
        let response = self.send_once(&request, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::check_response(response).await;
        }

        debug!(path = %request.path, "Access token rejected, entering refresh");
        self.recover(request).await
    }

    /// Handle a 401 on a request that has not been retried yet.
    async fn recover(&self, request: ApiRequest) -> Result<reqwest::Response, ApiError> {
        match self.gate.join(&self.session) {
            Ticket::NoSession => {
                debug!("No refresh credentials on hand, propagating 401");
                Err(ApiError::Unauthorized)
            }
            Ticket::Waiter(outcome) => {
                let token = outcome
                    .await
                    .map_err(|_| ApiError::RefreshFailed("refresh was abandoned".to_string()))??;
                self.replay(request, &token).await
            }
            Ticket::Leader { refresh_token, sid } => {
                let outcome = self.refresh_session(&refresh_token, &sid).await;
                self.gate.settle(&outcome);

                match outcome {
                    Ok(token) => self.replay(request, &token).await,
                    Err(e) => {
                        warn!(error = %e, "Session refresh failed, tearing down");
                        if let Err(teardown_err) = self.session.teardown() {
                            warn!(error = %teardown_err, "Session teardown left state behind");
                        }
                        Err(e)
                    }
                }
            }
        }
    }

    /// Retry a request once with the freshly minted token. A second 401 here
    /// propagates as an error instead of re-entering the refresh path.
    async fn replay(
        &self,
        request: ApiRequest,
        token: &str,
    ) -> Result<reqwest::Response, ApiError> {
        debug!(path = %request.path, "Replaying request with renewed token");
        let response = self.send_once(&request, Some(token)).await?;
        Self::check_response(response).await
    }

    /// Build and send one attempt, with the given token captured at send time.
    async fn send_once(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let url = format!("{}/{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), &url);

        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        builder.send().await
    }

    /// Exchange the refresh token + sid for a new credential triple and
    /// install it. Any failure here - transport, non-2xx, bad payload - is a
    /// refresh failure and fatal to the session.
    async fn refresh_session(&self, refresh_token: &str, sid: &str) -> Result<String, ApiError> {
        let url = format!("{}/auth/refresh", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(refresh_token)
            .json(&serde_json::json!({ "sid": sid }))
            .send()
            .await
            .map_err(|e| ApiError::RefreshFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = ApiError::server_message(&body)
                .unwrap_or_else(|| format!("refresh endpoint returned status {status}"));
            return Err(ApiError::RefreshFailed(message));
        }

        let tokens: RefreshResponse = response
            .json()
            .await
            .map_err(|e| ApiError::RefreshFailed(format!("malformed refresh response: {e}")))?;

        let access_token = tokens.new_access_token.clone();
        let credential = Credential::new(
            tokens.new_access_token,
            tokens.new_refresh_token,
            tokens.new_sid,
        );
        if let Err(e) = self.session.install(credential) {
            // The renewed tokens are valid even if the disk copy lagged.
            warn!(error = %e, "Failed to persist renewed session");
        }

        info!("Session refreshed");
        Ok(access_token)
    }

    /// Check if a response is successful, mapping failures into `ApiError`.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn dispatch_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let path = request.path.clone();
        let response = self.dispatch(request).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response from {path}: {e}")))
    }

    // ===== Auth operations =====

    /// Create an account. Does not log in.
    pub async fn register(&self, email: &str, password: &str) -> Result<RegisterResponse, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        self.dispatch_json(ApiRequest::post("auth/register", body)).await
    }

    /// Log in and install the returned credential into the session.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let login: LoginResponse = self.dispatch_json(ApiRequest::post("auth/login", body)).await?;

        let credential = Credential::new(
            login.access_token.clone(),
            login.refresh_token.clone(),
            login.sid.clone(),
        );
        if let Err(e) = self.session.install(credential) {
            warn!(error = %e, "Failed to persist session after login");
        }

        info!("Logged in");
        Ok(login)
    }

    /// Log out on the server, then clear the local session.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.dispatch(ApiRequest::post_empty("auth/logout")).await?;
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear session after logout");
        }
        Ok(())
    }

    // ===== Card operations =====

    /// Fetch all quest cards for the logged-in user.
    pub async fn fetch_cards(&self) -> Result<Vec<Card>, ApiError> {
        let response: CardsResponse = self.dispatch_json(ApiRequest::get("card")).await?;
        Ok(response.cards)
    }

    /// Create a new quest card.
    pub async fn create_card(&self, card: &NewCard) -> Result<Card, ApiError> {
        let body = serde_json::to_value(card)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to encode card: {e}")))?;
        self.dispatch_json(ApiRequest::post("card", body)).await
    }

    /// Edit an existing card's title, difficulty, category, or schedule.
    pub async fn edit_card(&self, card_id: &str, card: &EditCard) -> Result<Card, ApiError> {
        let body = serde_json::to_value(card)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to encode card: {e}")))?;
        self.dispatch_json(ApiRequest::patch(format!("card/{card_id}"), Some(body))).await
    }

    /// Delete a card.
    pub async fn delete_card(&self, card_id: &str) -> Result<(), ApiError> {
        self.dispatch(ApiRequest::delete(format!("card/{card_id}"))).await?;
        Ok(())
    }

    /// Mark a card complete.
    pub async fn complete_card(&self, card_id: &str) -> Result<Card, ApiError> {
        self.dispatch_json(ApiRequest::patch(format!("card/complete/{card_id}"), None)).await
    }
}
