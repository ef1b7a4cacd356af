use std::sync::Arc;
use std::sync::Mutex;

use super::*;
use crate::session::{AuthStatus, AuthUser, Session};

fn sample_user() -> AuthUser {
    AuthUser {
        id: "u-1".into(),
        email: "a@b.com".into(),
        display_name: "Alice".into(),
    }
}

/// Shared log of observed statuses, written from listeners.
fn status_log() -> (Arc<Mutex<Vec<AuthStatus>>>, impl Fn(&Session) + Send + Sync + 'static) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let writer = Arc::clone(&log);
    (log, move |s: &Session| writer.lock().unwrap().push(s.status()))
}

// =============================================================================
// get / set
// =============================================================================

#[test]
fn new_store_starts_unauthenticated() {
    let store = SessionStore::new();
    assert_eq!(store.get().status(), AuthStatus::Unauthenticated);
}

#[test]
fn set_replaces_the_session() {
    let store = SessionStore::new();
    store.set(Session::authenticated(sample_user(), "tok"));
    let session = store.get();
    assert!(session.is_authenticated());
    assert_eq!(session.token(), Some("tok"));
}

#[test]
fn cloned_handles_share_state() {
    let store = SessionStore::new();
    let other = store.clone();
    store.set(Session::failed("nope"));
    assert_eq!(other.get().status(), AuthStatus::Failed);
}

// =============================================================================
// subscribe / notify
// =============================================================================

#[test]
fn subscriber_sees_every_committed_transition() {
    let store = SessionStore::new();
    let (log, listener) = status_log();
    let _sub = store.subscribe(listener);

    store.set(Session::authenticating());
    store.set(Session::authenticated(sample_user(), "tok"));
    store.set(Session::unauthenticated());

    assert_eq!(
        *log.lock().unwrap(),
        vec![AuthStatus::Authenticating, AuthStatus::Authenticated, AuthStatus::Unauthenticated]
    );
}

#[test]
fn listeners_run_in_registration_order() {
    let store = SessionStore::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    let first = Arc::clone(&order);
    let _a = store.subscribe(move |_| first.lock().unwrap().push("first"));
    let second = Arc::clone(&order);
    let _b = store.subscribe(move |_| second.lock().unwrap().push("second"));

    store.set(Session::authenticating());
    assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
}

#[test]
fn listener_observes_the_committed_value() {
    let store = SessionStore::new();
    let seen = Arc::new(Mutex::new(None));
    let writer = Arc::clone(&seen);
    let _sub = store.subscribe(move |s| {
        *writer.lock().unwrap() = Some(s.clone());
    });

    store.set(Session::authenticated(sample_user(), "tok"));
    let seen = seen.lock().unwrap().clone().unwrap();
    assert!(seen.is_authenticated());
    assert_eq!(seen.token(), Some("tok"));
}

#[test]
fn listener_may_read_the_store_during_notification() {
    let store = SessionStore::new();
    let inner = store.clone();
    let seen = Arc::new(Mutex::new(None));
    let writer = Arc::clone(&seen);
    let _sub = store.subscribe(move |_| {
        *writer.lock().unwrap() = Some(inner.get().status());
    });

    store.set(Session::authenticating());
    assert_eq!(*seen.lock().unwrap(), Some(AuthStatus::Authenticating));
}

// =============================================================================
// unsubscribe
// =============================================================================

#[test]
fn unsubscribe_stops_notifications() {
    let store = SessionStore::new();
    let (log, listener) = status_log();
    let sub = store.subscribe(listener);

    store.set(Session::authenticating());
    sub.unsubscribe();
    store.set(Session::failed("nope"));

    assert_eq!(*log.lock().unwrap(), vec![AuthStatus::Authenticating]);
}

#[test]
fn dropping_the_subscription_unsubscribes() {
    let store = SessionStore::new();
    let (log, listener) = status_log();
    {
        let _sub = store.subscribe(listener);
        store.set(Session::authenticating());
    }
    store.set(Session::failed("nope"));
    assert_eq!(*log.lock().unwrap(), vec![AuthStatus::Authenticating]);
}

#[test]
fn dropping_subscription_after_store_is_gone_is_harmless() {
    let store = SessionStore::new();
    let sub = store.subscribe(|_| {});
    drop(store);
    drop(sub);
}

// =============================================================================
// snapshot semantics
// =============================================================================

#[test]
fn listener_registered_during_notification_misses_that_notification() {
    let store = SessionStore::new();
    let (log, late_listener) = status_log();
    let log_for_assert = Arc::clone(&log);

    let registrar = store.clone();
    let late = Arc::new(Mutex::new(Some(late_listener)));
    let _sub = store.subscribe(move |_| {
        if let Some(listener) = late.lock().unwrap().take() {
            // Keep the late subscription alive for the rest of the test.
            std::mem::forget(registrar.subscribe(listener));
        }
    });

    store.set(Session::authenticating());
    assert!(log_for_assert.lock().unwrap().is_empty());

    store.set(Session::failed("nope"));
    assert_eq!(*log_for_assert.lock().unwrap(), vec![AuthStatus::Failed]);
}
