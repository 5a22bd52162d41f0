//! Client configuration.
//!
//! Resolution order: built-in defaults, then an optional TOML file, then
//! `OUTFIT_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Backend used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api";

/// Matches the HTTP client's request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const DEFAULT_LOG_FILTER: &str = "outfit_auth=info";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend base URL including the `/api` prefix.
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Directory holding the encrypted token files and their key.
    pub data_dir: PathBuf,
    /// `tracing_subscriber::EnvFilter` directive.
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            data_dir: default_data_dir(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load from a TOML file (if it exists) and apply environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            _ => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {e}", path.display()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        toml::from_str(contents).map_err(|e| anyhow::anyhow!("Failed to parse config: {e}"))
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup("OUTFIT_API_URL") {
            self.api_base_url = url;
        }
        if let Some(dir) = lookup("OUTFIT_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(filter) = lookup("OUTFIT_LOG") {
            self.log_filter = filter;
        }
        if let Some(secs) = lookup("OUTFIT_TIMEOUT_SECS") {
            match secs.parse() {
                Ok(secs) => self.request_timeout_secs = secs,
                Err(e) => tracing::warn!("Ignoring OUTFIT_TIMEOUT_SECS={secs}: {e}"),
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            anyhow::bail!(
                "api_base_url must be an http(s) URL, got {:?}",
                self.api_base_url
            );
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn token_dir(&self) -> PathBuf {
        self.data_dir.join("tokens")
    }
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("app", "outfit", "outfit-auth")
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".outfit-auth"))
}
