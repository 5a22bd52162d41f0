//! Credential pair persistence on top of a [`SecretBackend`].

use super::backend::{MemoryBackend, SecretBackend};
use crate::error::AuthError;
use std::sync::Arc;

/// Entry holding the bearer access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Entry holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Access/refresh token storage.
///
/// Reads favour availability: a failing backend read is logged and reported
/// as "no token" so the app degrades to logged-out instead of erroring.
pub struct TokenStore {
    backend: Arc<dyn SecretBackend>,
}

impl TokenStore {
    pub fn new(backend: Arc<dyn SecretBackend>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Persist a credential pair.
    ///
    /// The refresh token is optional; servers that do not rotate it on every
    /// call simply omit it and the previously stored one is kept.
    pub fn set_tokens(&self, access_token: &str, refresh_token: Option<&str>) -> Result<(), AuthError> {
        tracing::debug!(
            access_token = !access_token.is_empty(),
            refresh_token = refresh_token.is_some_and(|t| !t.is_empty()),
            "Storing tokens"
        );
        if access_token.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        self.backend
            .set(ACCESS_TOKEN_KEY, access_token)
            .map_err(|e| {
                tracing::error!("Error storing access token: {e}");
                AuthError::storage(e)
            })?;

        match refresh_token.filter(|t| !t.is_empty()) {
            Some(refresh) => self.backend.set(REFRESH_TOKEN_KEY, refresh).map_err(|e| {
                tracing::error!("Error storing refresh token: {e}");
                AuthError::storage(e)
            })?,
            None => tracing::debug!("No refresh token provided, skipping storage"),
        }

        Ok(())
    }

    pub fn access_token(&self) -> Option<String> {
        self.read(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read(REFRESH_TOKEN_KEY)
    }

    /// Delete both entries. Both deletes are attempted; the first failure is
    /// returned for the caller to log.
    pub fn clear_tokens(&self) -> Result<(), AuthError> {
        let access = self.backend.delete(ACCESS_TOKEN_KEY);
        let refresh = self.backend.delete(REFRESH_TOKEN_KEY);
        access.and(refresh).map_err(|e| {
            tracing::error!("Error clearing tokens: {e}");
            AuthError::storage(e)
        })
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::error!(key, "Error reading token: {e}");
                None
            }
        }
    }
}
