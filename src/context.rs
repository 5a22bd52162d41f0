use crate::api::{AuthApi, CollectionsApi};
use crate::config::ClientConfig;
use crate::guard::{Navigator, RouteGuard};
use crate::http::ApiClient;
use crate::session::SessionStore;
use crate::tokens::{EncryptedFileBackend, MemoryBackend, SecretBackend, TokenStore};
use std::sync::Arc;

/// Everything a host app needs, wired once at startup.
#[derive(Clone)]
pub struct SessionContext {
    tokens: Arc<TokenStore>,
    client: Arc<ApiClient>,
    auth: AuthApi,
    collections: CollectionsApi,
    session: Arc<SessionStore>,
}

impl SessionContext {
    /// Persist tokens in the encrypted store under `config.token_dir()`.
    pub fn open(config: &ClientConfig) -> anyhow::Result<Self> {
        let backend = EncryptedFileBackend::open(&config.token_dir())?;
        tracing::info!(
            api = %config.api_base_url,
            tokens = %config.token_dir().display(),
            "Opening session context"
        );
        Self::with_backend(config, Arc::new(backend))
    }

    /// Tokens live only as long as the process.
    pub fn in_memory(config: &ClientConfig) -> anyhow::Result<Self> {
        Self::with_backend(config, Arc::new(MemoryBackend::new()))
    }

    pub fn with_backend(
        config: &ClientConfig,
        backend: Arc<dyn SecretBackend>,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        let tokens = Arc::new(TokenStore::new(backend));
        let client = Arc::new(ApiClient::from_config(config, tokens.clone())?);
        let auth = AuthApi::new(client.clone());
        let collections = CollectionsApi::new(client.clone());
        let session = Arc::new(SessionStore::new(auth.clone()));
        Ok(Self {
            tokens,
            client,
            auth,
            collections,
            session,
        })
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn auth(&self) -> &AuthApi {
        &self.auth
    }

    pub fn collections(&self) -> &CollectionsApi {
        &self.collections
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn redirect_guard(&self, navigator: Arc<dyn Navigator>) -> RouteGuard {
        RouteGuard::redirect(self.session.clone(), navigator)
    }

    pub fn access_guard(&self, navigator: Arc<dyn Navigator>) -> RouteGuard {
        RouteGuard::access(self.session.clone(), navigator)
    }
}
