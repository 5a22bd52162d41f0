use crate::error::AuthError;
use reqwest::Method;
use serde::Serialize;

/// Refresh bookkeeping carried by each logical request.
///
/// A request moves `NotYetRetried -> Retried` at most once; a `Retried`
/// request that fails again is a terminal failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    NotYetRetried,
    Retried,
}

/// A backend call before it goes through the interceptors.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: Option<serde_json::Value>,
    /// Bearer set explicitly on this request; wins over the stored token.
    pub(crate) bearer: Option<String>,
    pub(crate) retry: RetryState,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
            retry: RetryState::NotYetRetried,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, AuthError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Mark the request as already retried so a 401 on it never triggers a
    /// refresh. Used for the refresh call itself.
    pub fn without_refresh(mut self) -> Self {
        self.retry = RetryState::Retried;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn retry_state(&self) -> RetryState {
        self.retry
    }
}
