//! Credential verification — the controller's only external collaborator.
//!
//! The controller depends on the [`CredentialVerifier`] trait alone and
//! treats every implementation as slow and fallible. [`HttpVerifier`] talks
//! to the blog backend; [`StaticVerifier`] serves demos and tests with an
//! in-memory account table.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::session::AuthUser;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Confirmed identity returned by a successful verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub user: AuthUser,
    /// Opaque token proving the authentication.
    pub token: String,
}

/// Verification failure. The `Display` text is user-presentable and ends up
/// in the session's `error` field.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// The credentials were checked and rejected.
    #[error("invalid email or password")]
    Rejected,
    /// The verifier could not be reached or answered unexpectedly.
    #[error("login service unavailable: {0}")]
    Unavailable(String),
}

/// Checks an email/password pair and issues a token on success.
#[async_trait::async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Verify the pair. May suspend for arbitrarily long.
    ///
    /// # Errors
    ///
    /// [`VerifyError::Rejected`] when the credentials are wrong,
    /// [`VerifyError::Unavailable`] when the check itself could not run.
    async fn verify(&self, email: &str, password: &str) -> Result<VerifiedIdentity, VerifyError>;
}

// =============================================================================
// HTTP VERIFIER
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    user: UserDto,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDto {
    id: String,
    email: String,
    display_name: String,
}

/// Verifier backed by the blog backend's `POST /api/auth/login` endpoint.
pub struct HttpVerifier {
    client: reqwest::Client,
    login_url: String,
}

impl HttpVerifier {
    /// Build a verifier against `base_url` (e.g. `https://blog.example.com`).
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Unavailable`] if the HTTP client cannot be
    /// constructed.
    pub fn new(base_url: &str) -> Result<Self, VerifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| VerifyError::Unavailable(e.to_string()))?;
        let login_url = format!("{}/api/auth/login", base_url.trim_end_matches('/'));
        Ok(Self { client, login_url })
    }
}

#[async_trait::async_trait]
impl CredentialVerifier for HttpVerifier {
    async fn verify(&self, email: &str, password: &str) -> Result<VerifiedIdentity, VerifyError> {
        let resp = self
            .client
            .post(&self.login_url)
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(|e| VerifyError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(VerifyError::Rejected);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VerifyError::Unavailable(format!("{status}: {body}")));
        }

        let body: LoginResponse = resp
            .json()
            .await
            .map_err(|e| VerifyError::Unavailable(format!("unexpected response: {e}")))?;
        Ok(VerifiedIdentity {
            user: AuthUser {
                id: body.user.id,
                email: body.user.email,
                display_name: body.user.display_name,
            },
            token: body.token,
        })
    }
}

// =============================================================================
// STATIC VERIFIER
// =============================================================================

struct Account {
    password_hash: String,
    user: AuthUser,
}

/// In-memory verifier with a fixed account table. Passwords are stored as
/// sha256 hex digests; each successful login issues a fresh random token.
#[derive(Default)]
pub struct StaticVerifier {
    accounts: HashMap<String, Account>,
}

impl StaticVerifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account. The email is normalized (trimmed, lowercased)
    /// and used as the login key.
    #[must_use]
    pub fn with_account(mut self, email: &str, password: &str, display_name: &str) -> Self {
        let key = normalize_email(email).unwrap_or_else(|| email.to_owned());
        let user = AuthUser {
            id: format!("user-{}", self.accounts.len() + 1),
            email: key.clone(),
            display_name: display_name.to_owned(),
        };
        self.accounts
            .insert(key, Account { password_hash: hash_password(password), user });
        self
    }
}

#[async_trait::async_trait]
impl CredentialVerifier for StaticVerifier {
    async fn verify(&self, email: &str, password: &str) -> Result<VerifiedIdentity, VerifyError> {
        let key = normalize_email(email).ok_or(VerifyError::Rejected)?;
        let account = self.accounts.get(&key).ok_or(VerifyError::Rejected)?;
        if account.password_hash != hash_password(password) {
            return Err(VerifyError::Rejected);
        }
        Ok(VerifiedIdentity { user: account.user.clone(), token: generate_token() })
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Trim and lowercase an email; `None` if it does not look like `local@host`.
#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let mut parts = normalized.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(host), None) if !local.is_empty() && !host.is_empty() => {
            Some(normalized)
        }
        _ => None,
    }
}

fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    bytes_to_hex(&hasher.finalize())
}

fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

#[cfg(test)]
#[path = "verifier_test.rs"]
mod tests;
