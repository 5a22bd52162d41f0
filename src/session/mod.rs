//! Session state and the actions that change it.
//!
//! [`SessionStore`] is constructed once per app and shared (usually behind an
//! `Arc`). Screens read [`Session`] snapshots or follow the `watch` channel
//! returned by [`SessionStore::subscribe`].
//!
//! Each action:
//! - raises `is_loading` for its lifetime; overlapping actions keep it raised
//!   until the last one finishes
//! - supersedes the action before it, which then returns
//!   [`AuthError::Cancelled`](crate::AuthError::Cancelled) without writing
//!   state or tokens
//! - records a display message in `error` and also returns the error

mod state;
mod store;

pub use state::Session;
pub use store::SessionStore;
