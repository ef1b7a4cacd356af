//! Session data model — the authoritative record of identity state.
//!
//! INVARIANTS
//! ==========
//! `user` and `token` are both present exactly when the status is
//! `Authenticated`, and `error` is a non-empty string exactly when the status
//! is `Failed`. Fields are private and only the constructors below build a
//! `Session`, so a partial state is unrepresentable from outside this module.

use serde::{Deserialize, Serialize};

/// Authentication status of the current browsing session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    /// No identity; the initial state and the result of `logout`.
    Unauthenticated,
    /// A login is in flight against the credential verifier.
    Authenticating,
    /// Identity confirmed; `user` and `token` are populated.
    Authenticated,
    /// The last login attempt was rejected; `error` is populated.
    Failed,
}

/// Identity record for an authenticated visitor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Backend-assigned identifier (opaque string).
    pub id: String,
    /// Email the visitor signed in with.
    pub email: String,
    /// Human-readable name shown in the navbar.
    pub display_name: String,
}

/// Email/password pair submitted by the login form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }
}

/// Current authentication state. Owned by the [`SessionStore`]; everything
/// else holds clones and mutates only through the [`AuthController`].
///
/// [`SessionStore`]: crate::store::SessionStore
/// [`AuthController`]: crate::controller::AuthController
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    status: AuthStatus,
    user: Option<AuthUser>,
    token: Option<String>,
    error: Option<String>,
}

impl Session {
    /// Session with no identity. The state every process starts in.
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self { status: AuthStatus::Unauthenticated, user: None, token: None, error: None }
    }

    /// Transient state while a verifier call is in flight. Any prior
    /// identity is already cleared here, not on resolution.
    #[must_use]
    pub fn authenticating() -> Self {
        Self { status: AuthStatus::Authenticating, user: None, token: None, error: None }
    }

    /// Confirmed identity with its opaque token.
    #[must_use]
    pub fn authenticated(user: AuthUser, token: impl Into<String>) -> Self {
        Self {
            status: AuthStatus::Authenticated,
            user: Some(user),
            token: Some(token.into()),
            error: None,
        }
    }

    /// Rejected login. An empty message is replaced with a generic one so
    /// the `Failed`-carries-an-error invariant always holds.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.trim().is_empty() {
            error = "login failed".to_owned();
        }
        Self { status: AuthStatus::Failed, user: None, token: None, error: Some(error) }
    }

    #[must_use]
    pub fn status(&self) -> AuthStatus {
        self.status
    }

    #[must_use]
    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::unauthenticated()
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
