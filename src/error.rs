//! Error taxonomy for the session core.
//!
//! Actions return [`AuthError`]; setup code (config, backend construction)
//! uses `anyhow::Result` like the rest of the crate's plumbing.

use crate::validation::ValidationErrors;
use thiserror::Error;

/// Failure of a token, HTTP or session operation.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Client-side input check failed; nothing reached the network.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// An empty access token was handed to the token store.
    #[error("Access token is required but was empty")]
    InvalidToken,

    /// Register/login succeeded but the server omitted the access token.
    #[error("No access token received from server")]
    MissingToken,

    /// The server answered with a non-success status.
    #[error("Request failed with status {status}: {}", message.as_deref().unwrap_or("no message"))]
    Http {
        status: u16,
        message: Option<String>,
    },

    /// Connect, timeout or body decode failure.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A request body could not be serialized.
    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// Secure store read/write failure.
    #[error("Token storage error: {0}")]
    Storage(String),

    /// The action was superseded by a newer one or explicitly cancelled.
    #[error("Operation cancelled")]
    Cancelled,
}

impl AuthError {
    /// Message supplied by the server, if this is an HTTP failure that carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Http {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }

    /// HTTP status code for server failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub(crate) fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }
}
