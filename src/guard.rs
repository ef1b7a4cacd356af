//! Route guard — keeps the visible page consistent with the session status.
//!
//! DESIGN
//! ======
//! Routes declare a required status class instead of hard-coding redirects
//! per page. The guard subscribes to the session store and reacts only to
//! `status` transitions — a `set` that does not change the status never
//! navigates, so a redirect can never feed back into another redirect.
//! Navigation itself is an external capability behind the [`Navigator`]
//! trait; `navigate` is fire-and-forget.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::session::AuthStatus;
use crate::store::{SessionStore, Subscription};

/// Required session status class for a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteAccess {
    /// Reachable regardless of status (blog index, posts).
    Public,
    /// Requires `Authenticated`; otherwise redirect to the login route.
    AuthOnly,
    /// Requires anything but `Authenticated` (the login page itself);
    /// otherwise redirect to the landing route.
    GuestOnly,
}

/// Declared access requirements, keyed by exact route path.
/// Unregistered paths are [`RouteAccess::Public`].
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    routes: HashMap<String, RouteAccess>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the requirement for a path.
    #[must_use]
    pub fn route(mut self, path: impl Into<String>, access: RouteAccess) -> Self {
        self.routes.insert(path.into(), access);
        self
    }

    #[must_use]
    pub fn access(&self, path: &str) -> RouteAccess {
        self.routes.get(path).copied().unwrap_or(RouteAccess::Public)
    }
}

/// Fallback targets for violated requirements.
#[derive(Clone, Debug)]
pub struct GuardConfig {
    /// Where `AuthOnly` violations land.
    pub login_route: String,
    /// Where `GuestOnly` violations land.
    pub landing_route: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self { login_route: "/login".into(), landing_route: "/blog".into() }
    }
}

/// External navigation capability. No return value is consulted.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

struct GuardInner {
    table: RouteTable,
    config: GuardConfig,
    navigator: Arc<dyn Navigator>,
    current_route: String,
    last_status: AuthStatus,
}

impl GuardInner {
    /// Issue at most one redirect for the current route under `status`.
    fn enforce(&mut self, status: AuthStatus) {
        let target = match self.table.access(&self.current_route) {
            RouteAccess::Public => return,
            RouteAccess::AuthOnly if status != AuthStatus::Authenticated => {
                self.config.login_route.clone()
            }
            RouteAccess::GuestOnly if status == AuthStatus::Authenticated => {
                self.config.landing_route.clone()
            }
            RouteAccess::AuthOnly | RouteAccess::GuestOnly => return,
        };
        tracing::debug!(from = %self.current_route, to = %target, "route guard redirect");
        self.navigator.navigate(&target);
        self.current_route = target;
    }
}

/// Reactive guard holding its store subscription; dropping it unsubscribes.
pub struct RouteGuard {
    inner: Arc<Mutex<GuardInner>>,
    _subscription: Subscription,
}

impl RouteGuard {
    /// Subscribe to the store and enforce the policy for `initial_route`
    /// immediately, then on every status transition.
    ///
    /// # Panics
    ///
    /// Panics if the guard lock is poisoned.
    #[must_use]
    pub fn install(
        store: &SessionStore,
        table: RouteTable,
        config: GuardConfig,
        navigator: Arc<dyn Navigator>,
        initial_route: &str,
    ) -> Self {
        let status = store.get().status();
        let inner = Arc::new(Mutex::new(GuardInner {
            table,
            config,
            navigator,
            current_route: initial_route.to_owned(),
            last_status: status,
        }));
        inner.lock().expect("route guard lock poisoned").enforce(status);

        let reactor = Arc::clone(&inner);
        let subscription = store.subscribe(move |session| {
            let mut inner = reactor.lock().expect("route guard lock poisoned");
            let status = session.status();
            // Only status transitions matter; other field changes are
            // invisible here, which is what prevents redirect storms.
            if status == inner.last_status {
                return;
            }
            inner.last_status = status;
            inner.enforce(status);
        });

        Self { inner, _subscription: subscription }
    }

    /// Report that the router moved to `path`; the requirement for the new
    /// route is enforced immediately.
    ///
    /// # Panics
    ///
    /// Panics if the guard lock is poisoned.
    pub fn on_route_change(&self, path: &str) {
        let mut inner = self.inner.lock().expect("route guard lock poisoned");
        inner.current_route = path.to_owned();
        let status = inner.last_status;
        inner.enforce(status);
    }

    /// Route the guard currently considers visible.
    ///
    /// # Panics
    ///
    /// Panics if the guard lock is poisoned.
    #[must_use]
    pub fn current_route(&self) -> String {
        self.inner.lock().expect("route guard lock poisoned").current_route.clone()
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
