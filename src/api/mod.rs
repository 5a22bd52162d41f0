//! Typed backend endpoints.
//!
//! - [`AuthApi`]: register, login, refresh, profile
//! - [`CollectionsApi`]: outfit collection CRUD
//!
//! Register and login wrap their tokens in `data`; the profile endpoint
//! returns the user record bare.

pub mod auth;
pub mod collections;
pub mod models;

pub use auth::AuthApi;
pub use collections::{Collection, CollectionsApi, CreateCollectionRequest, UpdateCollectionRequest};
pub use models::{ApiResponse, AuthResponse, Credentials, RefreshResponse, TokenPair, User};
