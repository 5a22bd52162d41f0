use crate::api::User;
use serde::Serialize;

/// Observable authentication state.
///
/// `is_authenticated` implies `user.is_some()`: both are only set together
/// by a successful profile fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Session {
    /// True once no session action is running.
    pub fn is_settled(&self) -> bool {
        !self.is_loading
    }

    /// The state `logout` leaves behind, ignoring the shared loading flag.
    pub fn is_logged_out(&self) -> bool {
        self.user.is_none() && !self.is_authenticated && self.error.is_none()
    }

    pub(crate) fn reset(&mut self) {
        *self = Self {
            is_loading: self.is_loading,
            ..Self::default()
        };
    }
}
