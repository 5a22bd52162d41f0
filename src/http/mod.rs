//! Request pipeline shared by every backend call.
//!
//! ## Interceptors
//! - **Request**: attach `Authorization: Bearer <token>` from the token store
//!   (or the request's own bearer after a refresh).
//! - **Response**: a 401 on a request that has not been retried triggers one
//!   refresh-and-retry. Refresh failure clears the stored tokens and the
//!   original 401 is returned; the caller routes to login.

pub mod request;

pub use request::{ApiRequest, RetryState};

use crate::api::models::{RefreshRequest, RefreshResponse, REFRESH_PATH};
use crate::config::ClientConfig;
use crate::error::AuthError;
use crate::tokens::TokenStore;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client with transparent bearer authentication.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, tokens: Arc<TokenStore>) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn from_config(config: &ClientConfig, tokens: Arc<TokenStore>) -> anyhow::Result<Self> {
        Self::new(&config.api_base_url, config.request_timeout(), tokens)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request and decode a successful JSON body.
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, AuthError> {
        let response = self.execute(request).await?;
        Ok(response.json::<T>().await?)
    }

    /// Send a request through both interceptors and return the successful
    /// response, or the mapped failure.
    pub async fn execute(&self, mut request: ApiRequest) -> Result<reqwest::Response, AuthError> {
        let response = self.dispatch(&request).await?;
        if response.status() != StatusCode::UNAUTHORIZED || request.retry == RetryState::Retried {
            return check_status(response).await;
        }

        request.retry = RetryState::Retried;
        let unauthorized = check_status(response).await;

        match self.refresh_access_token().await {
            Ok(Some(access_token)) => {
                tracing::debug!(path = %request.path, "Retrying request with refreshed token");
                request.bearer = Some(access_token);
                let retried = self.dispatch(&request).await?;
                check_status(retried).await
            }
            Ok(None) => {
                tracing::debug!(path = %request.path, "Got 401 with no refresh token stored");
                unauthorized
            }
            Err(e) => {
                tracing::warn!(path = %request.path, "Token refresh failed: {e}");
                if let Err(e) = self.tokens.clear_tokens() {
                    tracing::debug!(path = %request.path, "Clearing tokens after failed refresh: {e}");
                }
                unauthorized
            }
        }
    }

    /// Exchange the stored refresh token for a new access token and persist it.
    /// `Ok(None)` when no refresh token is stored.
    async fn refresh_access_token(&self) -> Result<Option<String>, AuthError> {
        let Some(refresh_token) = self.tokens.refresh_token() else {
            return Ok(None);
        };

        let refreshed = self.request_refresh(&refresh_token).await?;
        self.tokens
            .set_tokens(&refreshed.access_token, refreshed.refresh_token.as_deref())?;
        tracing::info!("Access token refreshed");
        Ok(Some(refreshed.access_token))
    }

    /// Call the refresh endpoint. Never itself refreshes on 401.
    pub(crate) async fn request_refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AuthError> {
        let request = ApiRequest::post(REFRESH_PATH)
            .json(&RefreshRequest { refresh_token })?
            .without_refresh();
        let response = check_status(self.dispatch(&request).await?).await?;
        Ok(response.json::<RefreshResponse>().await?)
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<reqwest::Response, AuthError> {
        let mut builder = self
            .http
            .request(request.method.clone(), self.url(&request.path));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let bearer = request
            .bearer
            .clone()
            .or_else(|| self.tokens.access_token());
        let authenticated = bearer.is_some();
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            authenticated,
            retried = request.retry == RetryState::Retried,
            "Sending API request"
        );
        Ok(builder.send().await?)
    }
}

/// Map non-success statuses to [`AuthError::Http`], pulling the server's
/// `message` out of the body when there is one.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AuthError::Http {
        status: status.as_u16(),
        message: extract_message(&body),
    })
}

fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("message")? {
        serde_json::Value::String(s) => Some(s.clone()),
        // Validation pipes report one message per failed field.
        serde_json::Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            (!joined.is_empty()).then_some(joined)
        }
        _ => None,
    }
}
