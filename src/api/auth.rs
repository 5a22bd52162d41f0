use super::models::{
    AuthResponse, Credentials, RefreshResponse, User, LOGIN_PATH, PROFILE_PATH, REGISTER_PATH,
};
use crate::error::AuthError;
use crate::http::{ApiClient, ApiRequest};
use std::sync::Arc;

/// Typed pass-through to the auth endpoints. No business logic lives here;
/// failures are whatever the HTTP client reports.
#[derive(Clone)]
pub struct AuthApi {
    client: Arc<ApiClient>,
}

impl AuthApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    /// `POST /auth/register`
    pub async fn register(&self, credentials: &Credentials) -> Result<AuthResponse, AuthError> {
        let request = ApiRequest::post(REGISTER_PATH).json(credentials)?;
        self.client.send(request).await
    }

    /// `POST /auth/login`
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, AuthError> {
        let request = ApiRequest::post(LOGIN_PATH).json(credentials)?;
        self.client.send(request).await
    }

    /// `POST /auth/refresh`
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<RefreshResponse, AuthError> {
        self.client.request_refresh(refresh_token).await
    }

    /// `GET /auth/profile`
    pub async fn profile(&self) -> Result<User, AuthError> {
        self.client.send(ApiRequest::get(PROFILE_PATH)).await
    }
}
