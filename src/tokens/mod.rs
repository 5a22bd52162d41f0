//! Secure token storage.
//!
//! Provides:
//! - [`TokenStore`]: access/refresh token persistence with availability-first reads
//! - [`SecretBackend`]: pluggable key/value secret store
//! - [`EncryptedFileBackend`]: AES-256-GCM sealed files with a generated key
//! - [`MemoryBackend`]: process-local store for tests and ephemeral sessions

pub mod backend;
pub mod cipher;
pub mod store;

pub use backend::{EncryptedFileBackend, MemoryBackend, SecretBackend};
pub use store::{TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
