//! Client-side authentication core for the outfit inspiration app.
//!
//! Provides:
//! - Encrypted token persistence (access + refresh token pair)
//! - An HTTP client that attaches the bearer token and retries a 401 once
//!   after refreshing it
//! - Typed auth and collections endpoints
//! - A session store (register, login, logout, profile, startup check)
//!   observable through a `watch` channel
//! - Route guards that map session state to onboarding/dashboard navigation
//!
//! ## Design Decisions
//! - The refresh call is issued already marked as retried, so a refresh can
//!   never trigger another refresh.
//! - Session actions report failures twice: as the returned `Err` and as the
//!   display message in [`Session::error`].
//! - A newer session action supersedes an older one; the older returns
//!   [`AuthError::Cancelled`] and leaves state alone.

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod guard;
pub mod http;
pub mod logging;
pub mod session;
pub mod tokens;
pub mod validation;

pub use api::{AuthApi, CollectionsApi, User};
pub use config::ClientConfig;
pub use context::SessionContext;
pub use error::AuthError;
pub use guard::{GuardKind, Navigator, Route, RouteGuard};
pub use http::ApiClient;
pub use session::{Session, SessionStore};
pub use tokens::TokenStore;
pub use validation::{validate_credentials, FormKind, ValidationErrors};
