//! Auth controller — the only writer of the session store.
//!
//! STATE MACHINE
//! =============
//! ```text
//! Unauthenticated --login--> Authenticating --success--> Authenticated
//! Failed          --login--> Authenticating --failure--> Failed
//! Authenticated   --login--> Authenticating            (re-auth overwrites)
//! Authenticated   --logout--> Unauthenticated          (also from any state)
//! ```
//!
//! CONCURRENCY
//! ===========
//! The verifier call is the only suspension point. While it is in flight the
//! session reads `Authenticating` and further `login` calls are rejected
//! rather than queued. Every committed transition bumps a monotonically
//! increasing epoch; each in-flight verification carries the epoch it was
//! issued under and its response is discarded when a `logout` or newer
//! `login` committed in the meantime. The epoch lock is never held across the
//! await, and store listeners must not call back into the controller.

use std::sync::{Arc, Mutex};

use time::OffsetDateTime;

use crate::session::{AuthStatus, Credentials, Session};
use crate::storage::{PersistedSession, TokenStorage};
use crate::store::SessionStore;
use crate::verifier::CredentialVerifier;

/// Synchronous rejection of a `login` call. The session is left untouched.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    /// Email or password was empty; nothing was submitted to the verifier.
    #[error("email and password must be non-empty")]
    Validation,
    /// Another login is in flight; at most one per session, never queued.
    #[error("a login is already in progress")]
    ConcurrentLogin,
}

/// How an accepted `login` call resolved. The session itself is the source
/// of truth; this is caller convenience for the login form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Verification succeeded; the session is `Authenticated`.
    Authenticated,
    /// Verification failed; the session is `Failed` with the error message.
    Failed,
    /// A logout or newer login committed first; this response was discarded
    /// and the session was not touched.
    Superseded,
}

/// How much to trust a locally persisted token at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RestorePolicy {
    /// Restore whenever a record is present. Matches the original frontend.
    #[default]
    TrustStored,
    /// Treat a record older than the given age as absent and clear it.
    MaxAge(time::Duration),
}

/// Enforces valid session transitions and talks to the credential verifier.
///
/// Cheap to clone; clones share the same epoch and collaborators.
#[derive(Clone)]
pub struct AuthController {
    store: SessionStore,
    verifier: Arc<dyn CredentialVerifier>,
    storage: Arc<dyn TokenStorage>,
    restore_policy: RestorePolicy,
    /// Request id of the most recently committed transition.
    epoch: Arc<Mutex<u64>>,
}

impl AuthController {
    #[must_use]
    pub fn new(
        store: SessionStore,
        verifier: Arc<dyn CredentialVerifier>,
        storage: Arc<dyn TokenStorage>,
    ) -> Self {
        Self {
            store,
            verifier,
            storage,
            restore_policy: RestorePolicy::default(),
            epoch: Arc::new(Mutex::new(0)),
        }
    }

    #[must_use]
    pub fn with_restore_policy(mut self, policy: RestorePolicy) -> Self {
        self.restore_policy = policy;
        self
    }

    /// The store this controller writes to.
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Submit credentials to the verifier.
    ///
    /// Subscribers observe `Authenticating` before the verifier resolves,
    /// then exactly one terminal transition — unless a logout or newer login
    /// commits first, in which case this response is dropped on the floor.
    ///
    /// # Errors
    ///
    /// [`LoginError::Validation`] for empty credentials and
    /// [`LoginError::ConcurrentLogin`] while another login is in flight; in
    /// both cases the session is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the epoch lock is poisoned.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, LoginError> {
        if credentials.email.trim().is_empty() || credentials.password.trim().is_empty() {
            return Err(LoginError::Validation);
        }

        let my_epoch = {
            let mut epoch = self.epoch.lock().expect("epoch lock poisoned");
            if self.store.get().status() == AuthStatus::Authenticating {
                return Err(LoginError::ConcurrentLogin);
            }
            *epoch += 1;
            self.store.set(Session::authenticating());
            *epoch
        };

        let result = self.verifier.verify(&credentials.email, &credentials.password).await;

        let epoch = self.epoch.lock().expect("epoch lock poisoned");
        if *epoch != my_epoch {
            tracing::debug!(request = my_epoch, current = *epoch, "stale verifier response discarded");
            return Ok(LoginOutcome::Superseded);
        }

        match result {
            Ok(identity) => {
                self.store
                    .set(Session::authenticated(identity.user.clone(), identity.token.clone()));
                let record = PersistedSession {
                    token: identity.token,
                    user: identity.user,
                    issued_at_unix: OffsetDateTime::now_utc().unix_timestamp(),
                };
                // Best-effort: the in-memory session stays authoritative.
                if let Err(e) = self.storage.write(&record) {
                    tracing::warn!(error = %e, "failed to persist session token");
                }
                tracing::info!(email = %record.user.email, "login succeeded");
                Ok(LoginOutcome::Authenticated)
            }
            Err(e) => {
                tracing::info!(error = %e, "login failed");
                self.store.set(Session::failed(e.to_string()));
                Ok(LoginOutcome::Failed)
            }
        }
    }

    /// Unconditionally drop the current identity. Idempotent; subscribers
    /// are notified even when already `Unauthenticated`. Any in-flight
    /// verification is invalidated.
    ///
    /// # Panics
    ///
    /// Panics if the epoch lock is poisoned.
    pub fn logout(&self) {
        let mut epoch = self.epoch.lock().expect("epoch lock poisoned");
        *epoch += 1;
        if let Err(e) = self.storage.clear() {
            tracing::warn!(error = %e, "failed to clear persisted session token");
        }
        self.store.set(Session::unauthenticated());
    }

    /// Recover a persisted session at process start, without contacting the
    /// verifier. Returns whether a session was restored; absent, malformed,
    /// unreadable, or over-age records leave the session `Unauthenticated`.
    ///
    /// # Panics
    ///
    /// Panics if the epoch lock is poisoned.
    pub fn restore_session(&self) -> bool {
        let record = match self.storage.read() {
            Ok(Some(record)) => record,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!(error = %e, "could not read persisted session");
                return false;
            }
        };

        if let RestorePolicy::MaxAge(limit) = self.restore_policy {
            let age = OffsetDateTime::now_utc().unix_timestamp() - record.issued_at_unix;
            // A future-dated record means clock skew; don't trust it either.
            if age < 0 || time::Duration::seconds(age) > limit {
                tracing::info!(age_secs = age, "persisted session over age limit; clearing");
                if let Err(e) = self.storage.clear() {
                    tracing::warn!(error = %e, "failed to clear expired session token");
                }
                return false;
            }
        }

        let mut epoch = self.epoch.lock().expect("epoch lock poisoned");
        *epoch += 1;
        tracing::info!(email = %record.user.email, "session restored from storage");
        self.store.set(Session::authenticated(record.user, record.token));
        true
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
