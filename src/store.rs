//! Session store — single owner of the current [`Session`], with
//! synchronous subscribe/notify.
//!
//! DESIGN
//! ======
//! One process-wide store is created at composition time and handed (cloned)
//! to the controller, the route guard, and any UI layer. There is no global
//! singleton. `set` commits the new value under the lock, snapshots the
//! listener list, and then notifies outside the lock — so no listener ever
//! observes a half-updated session, listeners run in registration order, and
//! a listener registered during a notification is not invoked for that same
//! notification.
//!
//! TRADE-OFFS
//! ==========
//! Listeners run synchronously on the committing call's stack. They must not
//! call back into `set` (the route guard only navigates; UI subscribers only
//! re-render).

use std::sync::{Arc, Mutex, Weak};

use crate::session::Session;

type Listener = Arc<dyn Fn(&Session) + Send + Sync>;

struct StoreInner {
    session: Session,
    listeners: Vec<(u64, Listener)>,
    next_listener_id: u64,
}

/// Shared handle to the process-wide session state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl SessionStore {
    /// Create a store starting `Unauthenticated`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                session: Session::unauthenticated(),
                listeners: Vec::new(),
                next_listener_id: 0,
            })),
        }
    }

    /// Current session value.
    ///
    /// # Panics
    ///
    /// Panics if a listener panicked while holding the store lock.
    #[must_use]
    pub fn get(&self) -> Session {
        self.inner.lock().expect("session store lock poisoned").session.clone()
    }

    /// Replace the session and notify every subscriber, in registration
    /// order, with the committed value.
    ///
    /// Internal primitive: all callers outside this crate go through the
    /// [`AuthController`](crate::controller::AuthController).
    ///
    /// # Panics
    ///
    /// Panics if a listener panicked while holding the store lock.
    pub fn set(&self, next: Session) {
        let (snapshot, listeners) = {
            let mut inner = self.inner.lock().expect("session store lock poisoned");
            inner.session = next;
            (inner.session.clone(), inner.listeners.clone())
        };
        for (_, listener) in listeners {
            listener(&snapshot);
        }
    }

    /// Register a listener invoked once per committed transition. The
    /// returned [`Subscription`] unregisters on [`Subscription::unsubscribe`]
    /// or drop; after that the listener is never invoked again.
    ///
    /// # Panics
    ///
    /// Panics if a listener panicked while holding the store lock.
    pub fn subscribe(&self, listener: impl Fn(&Session) + Send + Sync + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.lock().expect("session store lock poisoned");
            let id = inner.next_listener_id;
            inner.next_listener_id += 1;
            inner.listeners.push((id, Arc::new(listener)));
            id
        };
        Subscription { store: Arc::downgrade(&self.inner), id }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped registration handle returned by [`SessionStore::subscribe`].
pub struct Subscription {
    store: Weak<Mutex<StoreInner>>,
    id: u64,
}

impl Subscription {
    /// Unregister the listener now instead of at drop.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            if let Ok(mut inner) = inner.lock() {
                inner.listeners.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
