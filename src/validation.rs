//! Client-side credential checks run before any request is issued.

use regex::Regex;
use std::sync::LazyLock;

/// Minimum password length accepted at signup.
pub const MIN_SIGNUP_PASSWORD_LEN: usize = 8;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").unwrap());

/// Which rule set applies to the submitted form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Login,
    Signup,
}

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = [self.email.as_deref(), self.password.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        f.write_str(&messages.join("; "))
    }
}

/// Check an email/password pair against the rules for `kind`.
pub fn validate_credentials(
    kind: FormKind,
    email: &str,
    password: &str,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if email.trim().is_empty() {
        errors.email = Some("Email is required".into());
    } else if !EMAIL_PATTERN.is_match(email) {
        errors.email = Some("Please enter a valid email".into());
    }

    if password.is_empty() {
        errors.password = Some("Password is required".into());
    } else if kind == FormKind::Signup && password.chars().count() < MIN_SIGNUP_PASSWORD_LEN {
        errors.password = Some(format!(
            "Password must be at least {MIN_SIGNUP_PASSWORD_LEN} characters"
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
