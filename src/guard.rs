//! Route guards: turn session state into navigation.
//!
//! Both guards trigger one `check_auth_status` when mounted and then react
//! whenever `(is_authenticated, is_loading)` changes. Nothing is decided
//! while a session action is in flight.

use crate::session::{Session, SessionStore};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Authenticated landing area.
    Dashboard,
    Onboarding,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Dashboard => "/dashboard",
            Route::Onboarding => "/onboarding",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Host navigation hook. `replace` swaps the current screen without
/// pushing history.
pub trait Navigator: Send + Sync {
    fn replace(&self, route: Route);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardKind {
    /// Sends every visitor somewhere: dashboard or onboarding.
    Redirect,
    /// Only ejects unauthenticated visitors; authenticated ones stay put.
    Access,
}

impl GuardKind {
    /// Where a settled session should go, if anywhere.
    pub fn decide(self, session: &Session) -> Option<Route> {
        if session.is_loading {
            return None;
        }
        match (self, session.is_authenticated) {
            (GuardKind::Redirect, true) => Some(Route::Dashboard),
            (_, false) => Some(Route::Onboarding),
            (GuardKind::Access, true) => None,
        }
    }
}

pub struct RouteGuard {
    kind: GuardKind,
    store: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    mounted: AtomicBool,
    last_seen: Mutex<Option<(bool, bool)>>,
}

impl RouteGuard {
    pub fn new(kind: GuardKind, store: Arc<SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            kind,
            store,
            navigator,
            mounted: AtomicBool::new(false),
            last_seen: Mutex::new(None),
        }
    }

    pub fn redirect(store: Arc<SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self::new(GuardKind::Redirect, store, navigator)
    }

    pub fn access(store: Arc<SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self::new(GuardKind::Access, store, navigator)
    }

    pub fn kind(&self) -> GuardKind {
        self.kind
    }

    /// Run the startup auth check. Only the first call per guard does anything.
    pub async fn mount(&self) {
        if self.mounted.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!(guard = ?self.kind, "Mounting route guard");
        self.store.check_auth_status().await;
    }

    /// Evaluate `session` and navigate if the observed key changed.
    pub fn react(&self, session: &Session) -> Option<Route> {
        let key = (session.is_authenticated, session.is_loading);
        {
            let mut last_seen = self.last_seen.lock();
            if *last_seen == Some(key) {
                return None;
            }
            *last_seen = Some(key);
        }

        let route = self.kind.decide(session)?;
        tracing::debug!(guard = ?self.kind, %route, "Guard navigating");
        self.navigator.replace(route);
        Some(route)
    }

    /// React to every state change until the sending side is dropped.
    pub async fn follow(&self, mut rx: watch::Receiver<Session>) {
        loop {
            let session = rx.borrow_and_update().clone();
            self.react(&session);
            if rx.changed().await.is_err() {
                break;
            }
        }
    }

    /// Mount and follow the store. The auth check is started before the
    /// first evaluation so an unchecked session is never redirected.
    pub async fn run(&self) {
        let rx = self.store.subscribe();
        tokio::join!(self.mount(), self.follow(rx));
    }
}
