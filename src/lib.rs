//! Client-side authentication core for the Artikulo blog application.
//!
//! ARCHITECTURE
//! ============
//! One process-wide [`SessionStore`] is the single source of truth for the
//! visitor's authentication state. The [`AuthController`] is its only writer:
//! it validates credentials, talks to a [`CredentialVerifier`], persists the
//! issued token through a [`TokenStorage`], and guards against stale verifier
//! responses with a per-request epoch. The [`RouteGuard`] subscribes to the
//! store and keeps the visible page consistent with the session status. UI
//! layers (login form, navbar) are plain subscribers outside this crate.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use artikulo_auth::{
//!     AuthController, FileTokenStorage, GuardConfig, HttpVerifier, Navigator, RouteAccess,
//!     RouteGuard, RouteTable, SessionStore,
//! };
//!
//! struct Router;
//! impl Navigator for Router {
//!     fn navigate(&self, path: &str) {
//!         println!("-> {path}");
//!     }
//! }
//!
//! # fn main() -> Result<(), artikulo_auth::VerifyError> {
//! let store = SessionStore::new();
//! let controller = AuthController::new(
//!     store.clone(),
//!     Arc::new(HttpVerifier::new("https://blog.example.com")?),
//!     Arc::new(FileTokenStorage::new("session.json")),
//! );
//! controller.restore_session();
//!
//! let routes = RouteTable::new()
//!     .route("/login", RouteAccess::GuestOnly)
//!     .route("/blog/new", RouteAccess::AuthOnly);
//! let _guard = RouteGuard::install(&store, routes, GuardConfig::default(), Arc::new(Router), "/blog");
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod guard;
pub mod session;
pub mod storage;
pub mod store;
pub mod verifier;

pub use controller::{AuthController, LoginError, LoginOutcome, RestorePolicy};
pub use guard::{GuardConfig, Navigator, RouteAccess, RouteGuard, RouteTable};
pub use session::{AuthStatus, AuthUser, Credentials, Session};
pub use storage::{FileTokenStorage, MemoryTokenStorage, PersistedSession, StorageError, TokenStorage};
pub use store::{SessionStore, Subscription};
pub use verifier::{CredentialVerifier, HttpVerifier, StaticVerifier, VerifiedIdentity, VerifyError};
