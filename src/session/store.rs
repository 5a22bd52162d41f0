//! The only component allowed to mutate [`Session`].

use super::state::Session;
use crate::api::{AuthApi, Credentials, User};
use crate::error::AuthError;
use crate::tokens::TokenStore;
use crate::validation::{validate_credentials, FormKind};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Cancellation handle for one top-level action.
///
/// Starting a newer action cancels the previous ticket; a cancelled ticket
/// never writes state or tokens.
#[derive(Clone)]
struct Ticket {
    cancel: CancellationToken,
}

impl Ticket {
    fn ensure_active(&self) -> Result<(), AuthError> {
        if self.cancel.is_cancelled() {
            Err(AuthError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Race `fut` against cancellation of this ticket.
    async fn run<T>(
        &self,
        fut: impl Future<Output = Result<T, AuthError>>,
    ) -> Result<T, AuthError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(AuthError::Cancelled),
            result = fut => result,
        }
    }
}

/// Holds `is_loading` up for as long as it lives.
struct LoadingGuard<'a> {
    store: &'a SessionStore,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let in_flight = &self.store.in_flight;
        self.store.state.send_modify(|s| {
            let remaining = in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
            s.is_loading = remaining > 0;
        });
    }
}

/// Session service: owns [`Session`] and orchestrates the multi-step flows.
///
/// State changes are published on a `watch` channel; see [`SessionStore::subscribe`].
pub struct SessionStore {
    api: AuthApi,
    tokens: Arc<TokenStore>,
    state: watch::Sender<Session>,
    in_flight: AtomicUsize,
    current: Mutex<CancellationToken>,
}

impl SessionStore {
    pub fn new(api: AuthApi) -> Self {
        let tokens = api.client().tokens().clone();
        let (state, _) = watch::channel(Session::default());
        Self {
            api,
            tokens,
            state,
            in_flight: AtomicUsize::new(0),
            current: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    // ── Actions ─────────────────────────────────────────────────────

    /// Create an account, persist its tokens and load the profile.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.authenticate(FormKind::Signup, email, password).await
    }

    /// Sign in, persist the tokens and load the profile.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.authenticate(FormKind::Login, email, password).await
    }

    /// Load the profile with the stored token. A failure is treated as an
    /// invalid session: the store logs out, then returns the error.
    pub async fn fetch_profile(&self) -> Result<User, AuthError> {
        let ticket = self.join();
        self.fetch_profile_with(&ticket).await
    }

    /// Clear stored tokens and reset the session. Always succeeds from the
    /// caller's point of view; storage failures are only logged.
    pub fn logout(&self) {
        let ticket = self.begin();
        self.logout_with(&ticket);
        tracing::info!("Logged out");
    }

    /// Startup check: verify a stored token by fetching the profile.
    /// Returns whether the session ended authenticated.
    pub async fn check_auth_status(&self) -> bool {
        let ticket = self.begin();
        let _loading = self.start_loading();

        if self.tokens.access_token().is_none() {
            tracing::debug!("No stored access token");
            let _ = self.apply(&ticket, |s| s.is_authenticated = false);
            return false;
        }

        match self.fetch_profile_with(&ticket).await {
            Ok(_) => true,
            Err(AuthError::Cancelled) => self.snapshot().is_authenticated,
            Err(e) => {
                tracing::warn!("Auth check failed: {e}");
                false
            }
        }
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|s| s.error.take().is_some());
    }

    /// Abandon whatever action is in flight. Its pending request is dropped
    /// and it returns [`AuthError::Cancelled`] without touching state.
    pub fn cancel_pending(&self) {
        drop(self.begin());
        tracing::debug!("Cancelled pending session action");
    }

    // ── Flows ───────────────────────────────────────────────────────

    async fn authenticate(
        &self,
        kind: FormKind,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        validate_credentials(kind, email, password).map_err(AuthError::Validation)?;

        let ticket = self.begin();
        let _loading = self.start_loading();
        let _ = self.apply(&ticket, |s| s.error = None);

        let credentials = Credentials::new(email.trim(), password);
        match self.authenticate_with(&ticket, kind, &credentials).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "{} succeeded", action_name(kind));
                Ok(user)
            }
            Err(AuthError::Cancelled) => Err(AuthError::Cancelled),
            Err(e) => {
                tracing::warn!("{} failed: {e}", action_name(kind));
                let message = e
                    .server_message()
                    .map(str::to_owned)
                    .unwrap_or_else(|| fallback_message(kind).to_owned());
                let _ = self.apply(&ticket, |s| s.error = Some(message));
                Err(e)
            }
        }
    }

    async fn authenticate_with(
        &self,
        ticket: &Ticket,
        kind: FormKind,
        credentials: &Credentials,
    ) -> Result<User, AuthError> {
        let response = ticket
            .run(async {
                match kind {
                    FormKind::Signup => self.api.register(credentials).await,
                    FormKind::Login => self.api.login(credentials).await,
                }
            })
            .await?;

        // Contract violation: nothing may be stored without an access token.
        let access_token = response.access_token().ok_or(AuthError::MissingToken)?;

        ticket.ensure_active()?;
        self.tokens
            .set_tokens(access_token, response.refresh_token())?;

        self.fetch_profile_with(ticket).await
    }

    async fn fetch_profile_with(&self, ticket: &Ticket) -> Result<User, AuthError> {
        match ticket.run(self.api.profile()).await {
            Ok(user) => {
                let profile = user.clone();
                self.apply(ticket, move |s| {
                    s.user = Some(profile);
                    s.is_authenticated = true;
                })?;
                Ok(user)
            }
            Err(AuthError::Cancelled) => Err(AuthError::Cancelled),
            Err(e) => {
                tracing::error!("Error fetching profile: {e}");
                self.logout_with(ticket);
                Err(e)
            }
        }
    }

    fn logout_with(&self, ticket: &Ticket) {
        if ticket.ensure_active().is_err() {
            tracing::debug!("Skipping logout for a superseded action");
            return;
        }
        if let Err(e) = self.tokens.clear_tokens() {
            tracing::error!("Error during logout: {e}");
        }
        let _ = self.apply(ticket, Session::reset);
    }

    // ── Plumbing ────────────────────────────────────────────────────

    /// Start a new top-level action, superseding the current one.
    fn begin(&self) -> Ticket {
        let cancel = CancellationToken::new();
        let previous = std::mem::replace(&mut *self.current.lock(), cancel.clone());
        previous.cancel();
        Ticket { cancel }
    }

    /// Run under the current action's ticket without superseding it.
    fn join(&self) -> Ticket {
        Ticket {
            cancel: self.current.lock().clone(),
        }
    }

    fn start_loading(&self) -> LoadingGuard<'_> {
        self.state.send_modify(|s| {
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            s.is_loading = true;
        });
        LoadingGuard { store: self }
    }

    /// Mutate state unless `ticket` has been superseded.
    fn apply(&self, ticket: &Ticket, f: impl FnOnce(&mut Session)) -> Result<(), AuthError> {
        let mut applied = false;
        self.state.send_if_modified(|s| {
            if ticket.cancel.is_cancelled() {
                return false;
            }
            f(s);
            applied = true;
            true
        });
        if applied {
            Ok(())
        } else {
            Err(AuthError::Cancelled)
        }
    }
}

fn action_name(kind: FormKind) -> &'static str {
    match kind {
        FormKind::Signup => "Registration",
        FormKind::Login => "Login",
    }
}

fn fallback_message(kind: FormKind) -> &'static str {
    match kind {
        FormKind::Signup => "Registration failed",
        FormKind::Login => "Login failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{ApiClient, DEFAULT_TIMEOUT};
    use crate::tokens::{MemoryBackend, SecretBackend};
    use std::time::Duration;
    use wiremock::matchers::{any, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Memory backend that counts writes and can be told to fail deletes.
    #[derive(Default)]
    struct RecordingBackend {
        inner: MemoryBackend,
        writes: AtomicUsize,
        fail_deletes: bool,
    }

    impl SecretBackend for RecordingBackend {
        fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value)
        }

        fn delete(&self, key: &str) -> anyhow::Result<()> {
            if self.fail_deletes {
                anyhow::bail!("keychain unavailable");
            }
            self.inner.delete(key)
        }
    }

    fn store_with(server: &MockServer, backend: Arc<RecordingBackend>) -> SessionStore {
        let tokens = Arc::new(TokenStore::new(backend));
        let client = Arc::new(ApiClient::new(&server.uri(), DEFAULT_TIMEOUT, tokens).unwrap());
        SessionStore::new(AuthApi::new(client))
    }

    fn store_for(server: &MockServer) -> (SessionStore, Arc<RecordingBackend>) {
        let backend = Arc::new(RecordingBackend::default());
        (store_with(server, backend.clone()), backend)
    }

    fn user_u1() -> User {
        User {
            id: "u1".into(),
            email: "a@b.com".into(),
            full_name: None,
            created_at: None,
            updated_at: None,
        }
    }

    async fn mount_login(server: &MockServer, data: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": data})))
            .mount(server)
            .await;
    }

    async fn mount_profile(server: &MockServer, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/auth/profile"))
            .respond_with(template)
            .mount(server)
            .await;
    }

    fn profile_ok() -> ResponseTemplate {
        ResponseTemplate::new(200)
            .set_body_json(serde_json::json!({"id": "u1", "email": "a@b.com"}))
    }

    #[tokio::test]
    async fn login_populates_session_and_tokens() {
        let server = MockServer::start().await;
        mount_login(&server, serde_json::json!({"access_token": "t1"})).await;
        mount_profile(&server, profile_ok()).await;

        let (store, _backend) = store_for(&server);
        let user = store.login("a@b.com", "x").await.unwrap();
        assert_eq!(user.id, "u1");

        assert_eq!(
            store.snapshot(),
            Session {
                user: Some(user_u1()),
                is_authenticated: true,
                is_loading: false,
                error: None,
            }
        );
        assert_eq!(store.tokens().access_token().as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn register_without_access_token_stores_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(ResponseTemplate::new(201).set_body_json(
                serde_json::json!({"success": true, "data": {"refresh_token": "r1"}}),
            ))
            .mount(&server)
            .await;
        Mock::given(path("/auth/profile"))
            .respond_with(profile_ok())
            .expect(0)
            .mount(&server)
            .await;

        let (store, backend) = store_for(&server);
        let err = store.register("a@b.com", "longenough").await.unwrap_err();
        assert!(matches!(err, AuthError::MissingToken));

        let session = store.snapshot();
        assert!(!session.is_loading);
        assert_eq!(session.error.as_deref(), Some("Registration failed"));
        assert!(!session.is_authenticated);
        assert_eq!(backend.writes.load(Ordering::SeqCst), 0);
        assert!(store.tokens().access_token().is_none());
    }

    #[tokio::test]
    async fn register_with_null_data_is_missing_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"success": false, "data": null, "message": "x"}),
            ))
            .mount(&server)
            .await;

        let (store, backend) = store_for(&server);
        let err = store.register("a@b.com", "longenough").await.unwrap_err();
        assert!(matches!(err, AuthError::MissingToken));
        assert_eq!(backend.writes.load(Ordering::SeqCst), 0);
        assert_eq!(
            store.snapshot().error.as_deref(),
            Some("Registration failed")
        );
    }

    #[tokio::test]
    async fn login_tolerates_zone_less_profile_timestamp() {
        let server = MockServer::start().await;
        mount_login(&server, serde_json::json!({"access_token": "t1"})).await;
        mount_profile(
            &server,
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "u1",
                "email": "a@b.com",
                "createdAt": "2024-01-15T10:00:00",
                "updatedAt": 1705312800000_i64
            })),
        )
        .await;

        let (store, _backend) = store_for(&server);
        let user = store.login("a@b.com", "x").await.unwrap();
        assert!(user.created_at.is_some());
        assert_eq!(user.created_at, user.updated_at);
        assert!(store.snapshot().is_authenticated);
        assert_eq!(store.tokens().access_token().as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn login_without_access_token_raises_before_storage() {
        let server = MockServer::start().await;
        mount_login(&server, serde_json::json!({"access_token": ""})).await;

        let (store, backend) = store_for(&server);
        let err = store.login("a@b.com", "x").await.unwrap_err();
        assert!(matches!(err, AuthError::MissingToken));
        assert_eq!(backend.writes.load(Ordering::SeqCst), 0);
        assert_eq!(store.snapshot().error.as_deref(), Some("Login failed"));
    }

    #[tokio::test]
    async fn failed_profile_after_login_leaves_logged_out_state() {
        let server = MockServer::start().await;
        mount_login(
            &server,
            serde_json::json!({"access_token": "t1", "refresh_token": "r1"}),
        )
        .await;
        mount_profile(&server, ResponseTemplate::new(500)).await;

        let (store, _backend) = store_for(&server);
        let err = store.login("a@b.com", "x").await.unwrap_err();
        assert_eq!(err.status(), Some(500));

        let session = store.snapshot();
        assert!(session.user.is_none());
        assert!(!session.is_authenticated);
        assert!(!session.is_loading);
        assert_eq!(session.error.as_deref(), Some("Login failed"));
        assert!(store.tokens().access_token().is_none());
        assert!(store.tokens().refresh_token().is_none());
    }

    #[tokio::test]
    async fn server_message_becomes_session_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"message": "Invalid credentials"})),
            )
            .mount(&server)
            .await;

        let (store, _backend) = store_for(&server);
        let err = store.login("a@b.com", "wrong").await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(
            store.snapshot().error.as_deref(),
            Some("Invalid credentials")
        );
    }

    #[tokio::test]
    async fn validation_failure_never_reaches_network() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (store, _backend) = store_for(&server);
        let err = store.register("not-an-email", "short").await.unwrap_err();
        let AuthError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.email.is_some());
        assert!(errors.password.is_some());
        assert_eq!(store.snapshot(), Session::default());
    }

    #[tokio::test]
    async fn clear_error_touches_only_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"data": {"access_token": "t1"}})),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_json(serde_json::json!({"message": "Too many attempts"})),
            )
            .mount(&server)
            .await;
        mount_profile(&server, profile_ok()).await;

        let (store, _backend) = store_for(&server);
        store.login("a@b.com", "x").await.unwrap();
        store.login("a@b.com", "x").await.unwrap_err();

        let before = store.snapshot();
        assert_eq!(before.error.as_deref(), Some("Too many attempts"));

        store.clear_error();
        let after = store.snapshot();
        assert!(after.error.is_none());
        assert_eq!(after.user, before.user);
        assert_eq!(after.is_authenticated, before.is_authenticated);
        assert_eq!(after.is_loading, before.is_loading);
        assert!(after.is_authenticated);
    }

    #[tokio::test]
    async fn check_auth_status_without_token_skips_network() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (store, _backend) = store_for(&server);
        assert!(!store.check_auth_status().await);

        let session = store.snapshot();
        assert!(!session.is_authenticated);
        assert!(!session.is_loading);
    }

    #[tokio::test]
    async fn check_auth_status_restores_session() {
        let server = MockServer::start().await;
        mount_profile(&server, profile_ok()).await;

        let (store, _backend) = store_for(&server);
        store.tokens().set_tokens("t1", None).unwrap();

        assert!(store.check_auth_status().await);
        let session = store.snapshot();
        assert_eq!(session.user, Some(user_u1()));
        assert!(session.is_authenticated);
        assert!(!session.is_loading);
    }

    #[tokio::test]
    async fn check_auth_status_with_rejected_token_self_heals() {
        let server = MockServer::start().await;
        mount_profile(&server, ResponseTemplate::new(401)).await;

        let (store, _backend) = store_for(&server);
        store.tokens().set_tokens("revoked", None).unwrap();

        assert!(!store.check_auth_status().await);
        let session = store.snapshot();
        assert!(session.is_logged_out());
        assert!(!session.is_loading);
        assert!(store.tokens().access_token().is_none());
    }

    #[tokio::test]
    async fn check_auth_status_refreshes_expired_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/profile"))
            .and(wiremock::matchers::header("Authorization", "Bearer old"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/profile"))
            .and(wiremock::matchers::header("Authorization", "Bearer new"))
            .respond_with(profile_ok())
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"access_token": "new"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (store, _backend) = store_for(&server);
        store.tokens().set_tokens("old", Some("r1")).unwrap();

        assert!(store.check_auth_status().await);
        assert_eq!(store.tokens().access_token().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn logout_tolerates_storage_failure() {
        let server = MockServer::start().await;
        mount_login(&server, serde_json::json!({"access_token": "t1"})).await;
        mount_profile(&server, profile_ok()).await;

        let backend = Arc::new(RecordingBackend {
            fail_deletes: true,
            ..Default::default()
        });
        let store = store_with(&server, backend);
        store.login("a@b.com", "x").await.unwrap();

        store.logout();
        let session = store.snapshot();
        assert!(session.is_logged_out());
        assert!(!session.is_loading);
    }

    #[tokio::test]
    async fn fetch_profile_failure_logs_out_and_reraises() {
        let server = MockServer::start().await;
        mount_profile(
            &server,
            ResponseTemplate::new(403).set_body_json(serde_json::json!({"message": "Forbidden"})),
        )
        .await;

        let (store, _backend) = store_for(&server);
        store.tokens().set_tokens("t1", Some("r1")).unwrap();

        let err = store.fetch_profile().await.unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert!(store.snapshot().is_logged_out());
        assert!(store.tokens().refresh_token().is_none());
    }

    #[tokio::test]
    async fn logout_supersedes_in_flight_login() {
        let server = MockServer::start().await;
        mount_login(&server, serde_json::json!({"access_token": "t1"})).await;
        mount_profile(&server, profile_ok().set_delay(Duration::from_secs(5))).await;

        let (store, _backend) = store_for(&server);
        let store = Arc::new(store);

        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.login("a@b.com", "x").await }
        });

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(store.snapshot().is_loading);
        store.logout();

        let result = tokio::time::timeout(Duration::from_secs(2), pending)
            .await
            .expect("cancelled login should return promptly")
            .unwrap();
        assert!(matches!(result, Err(AuthError::Cancelled)));

        let session = store.snapshot();
        assert!(session.is_logged_out());
        assert!(!session.is_loading);
        assert!(store.tokens().access_token().is_none());
    }

    #[tokio::test]
    async fn cancel_pending_abandons_auth_check() {
        let server = MockServer::start().await;
        mount_profile(&server, profile_ok().set_delay(Duration::from_secs(5))).await;

        let (store, _backend) = store_for(&server);
        store.tokens().set_tokens("t1", None).unwrap();
        let store = Arc::new(store);

        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.check_auth_status().await }
        });

        tokio::time::sleep(Duration::from_millis(200)).await;
        store.cancel_pending();

        let authenticated = tokio::time::timeout(Duration::from_secs(2), pending)
            .await
            .expect("cancelled check should return promptly")
            .unwrap();
        assert!(!authenticated);

        let session = store.snapshot();
        assert!(!session.is_loading);
        assert!(session.user.is_none());
        // Cancellation is not a logout.
        assert_eq!(store.tokens().access_token().as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn loading_stays_raised_across_overlapping_actions() {
        let server = MockServer::start().await;
        mount_login(&server, serde_json::json!({"access_token": "t1"})).await;
        mount_profile(&server, profile_ok().set_delay(Duration::from_secs(5))).await;

        let (store, _backend) = store_for(&server);
        let store = Arc::new(store);

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.login("a@b.com", "x").await }
        });
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(store.snapshot().is_loading);

        let second = tokio::spawn({
            let store = store.clone();
            async move { store.login("a@b.com", "y").await }
        });

        let first_result = tokio::time::timeout(Duration::from_secs(2), first)
            .await
            .expect("superseded login should return promptly")
            .unwrap();
        assert!(matches!(first_result, Err(AuthError::Cancelled)));

        // The second login is still waiting on its profile.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(store.snapshot().is_loading);
        assert!(!second.is_finished());

        store.cancel_pending();
        let second_result = tokio::time::timeout(Duration::from_secs(2), second)
            .await
            .expect("cancelled login should return promptly")
            .unwrap();
        assert!(matches!(second_result, Err(AuthError::Cancelled)));
        assert!(!store.snapshot().is_loading);
    }

    #[tokio::test]
    async fn subscribers_observe_loading_transitions() {
        let server = MockServer::start().await;
        mount_login(&server, serde_json::json!({"access_token": "t1"})).await;
        mount_profile(&server, profile_ok()).await;

        let (store, _backend) = store_for(&server);
        let mut rx = store.subscribe();
        assert!(!rx.borrow_and_update().is_loading);

        store.login("a@b.com", "x").await.unwrap();
        assert!(rx.has_changed().unwrap());
        let latest = rx.borrow_and_update().clone();
        assert!(latest.is_authenticated);
        assert!(latest.is_settled());
    }
}
