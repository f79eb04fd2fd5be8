// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session store: exclusivity, persistence and server refresh.

use parking_lot::Mutex;
use reqwest::Method;
use serde_json::json;
use std::sync::{mpsc, Arc, OnceLock};
use std::time::Duration;
use turf_session::error::ClientError;
use turf_session::models::{Role, Session};
use turf_session::services::{
    AuthenticatedClient, FilePersistence, MemoryPersistence, RoleClient, SessionPersistence,
    SessionStore,
};

mod common;
use common::{harness, identity, identity_json, MockTransport};

#[test]
fn test_login_replaces_other_role() {
    let store = SessionStore::in_memory();
    store.login(identity(Role::Client));
    store.login(identity(Role::Admin));

    assert_eq!(store.active_role(), Some(Role::Admin));
    assert!(store.identity(Role::Client).is_none());
    assert_eq!(store.identity(Role::Admin).unwrap().email, "admin@turf.example");
}

#[test]
fn test_logout_only_clears_matching_role() {
    let store = SessionStore::in_memory();
    store.login(identity(Role::Owner));

    assert!(!store.logout(Role::Client));
    assert_eq!(store.active_role(), Some(Role::Owner));

    assert!(store.logout(Role::Owner));
    assert_eq!(store.current(), Session::None);
    assert!(!store.logout(Role::Owner));
}

#[test]
fn test_changes_are_persisted_and_rehydrated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let store = SessionStore::new(Arc::new(FilePersistence::new(&path, "persist:root")));
    store.login(identity(Role::Owner));

    let restored = SessionStore::rehydrate(Arc::new(FilePersistence::new(&path, "persist:root")));
    assert_eq!(restored.current(), store.current());
    assert_eq!(restored.active_role(), Some(Role::Owner));

    store.logout(Role::Owner);
    let restored = SessionStore::rehydrate(Arc::new(FilePersistence::new(&path, "persist:root")));
    assert!(!restored.is_authenticated());
}

#[test]
fn test_rehydrate_legacy_slots() {
    let legacy = json!({
        "client": null,
        "owner": null,
        "admin": identity_json(Role::Admin),
    });
    let store = SessionStore::rehydrate(Arc::new(MemoryPersistence::with_value(legacy.to_string())));
    assert_eq!(store.active_role(), Some(Role::Admin));

    let crowded = json!({
        "client": identity_json(Role::Client),
        "owner": identity_json(Role::Owner),
        "admin": null,
    });
    let store = SessionStore::rehydrate(Arc::new(MemoryPersistence::with_value(crowded.to_string())));
    assert_eq!(store.active_role(), Some(Role::Client));
}

#[test]
fn test_rehydrate_corrupt_data_starts_signed_out() {
    for raw in ["not json", r#"{"kind":"superuser","identity":null}"#, "[1,2,3]"] {
        let store = SessionStore::rehydrate(Arc::new(MemoryPersistence::with_value(raw)));
        assert!(!store.is_authenticated(), "raw: {}", raw);
    }
}

#[test]
fn test_logout_clears_persisted_value() {
    let persistence = Arc::new(MemoryPersistence::new());
    let store = SessionStore::new(persistence.clone());

    store.login(identity(Role::Client));
    let saved: serde_json::Value = serde_json::from_str(&persistence.snapshot().unwrap()).unwrap();
    assert_eq!(saved["kind"], "client");

    store.logout(Role::Client);
    assert_eq!(persistence.load().unwrap(), None);
}

#[tokio::test]
async fn test_refresh_session_repopulates_identity() {
    let transport = MockTransport::new();
    let body = json!({ "data": identity_json(Role::Owner) }).to_string();
    transport.on(Method::GET, "/_ow/turfowner/refresh-session", 200, &body);

    let store = SessionStore::in_memory();
    let client = RoleClient::for_role(transport.clone(), Role::Owner);
    let identity = store.refresh_session(&client).await.unwrap();

    assert_eq!(identity.user_id, "turfOwner-42");
    assert_eq!(store.active_role(), Some(Role::Owner));
    assert!(store.last_refresh_error().is_none());
}

#[tokio::test]
async fn test_refresh_session_accepts_bare_identity() {
    let h = harness();
    let body = identity_json(Role::Admin).to_string();
    h.transport.on(Method::GET, "/_ad/admin/refresh-session", 200, &body);

    let client = AuthenticatedClient::for_role(h.transport.clone(), Role::Admin, h.logout.clone());
    client.refresh_session().await.unwrap();

    assert_eq!(h.store.active_role(), Some(Role::Admin));
}

#[tokio::test]
async fn test_refresh_session_failure_leaves_session_untouched() {
    let transport = MockTransport::new();
    transport.on(Method::GET, "/_cl/client/refresh-session", 500, "boom");

    let store = SessionStore::in_memory();
    store.login(identity(Role::Client));
    let before = store.current();

    let client = RoleClient::for_role(transport.clone(), Role::Client);
    let err = store.refresh_session(&client).await.unwrap_err();

    assert_eq!(err.status().map(|s| s.as_u16()), Some(500));
    assert_eq!(store.current(), before);
    assert!(store.last_refresh_error().is_some());
}

#[tokio::test]
async fn test_refresh_session_rejects_identity_of_other_role() {
    let transport = MockTransport::new();
    let body = identity_json(Role::Admin).to_string();
    transport.on(Method::GET, "/_cl/client/refresh-session", 200, &body);

    let store = SessionStore::in_memory();
    let client = RoleClient::for_role(transport.clone(), Role::Client);

    assert!(store.refresh_session(&client).await.is_err());
    assert!(!store.is_authenticated());
    assert!(store.last_refresh_error().unwrap().contains("admin"));
}

/// Storage that reads the store back while it is being written to.
#[derive(Default)]
struct ReentrantPersistence {
    store: OnceLock<SessionStore>,
    seen: Mutex<Vec<Option<Role>>>,
}

impl SessionPersistence for ReentrantPersistence {
    fn load(&self) -> Result<Option<String>, ClientError> {
        Ok(None)
    }

    fn save(&self, _value: &str) -> Result<(), ClientError> {
        if let Some(store) = self.store.get() {
            self.seen.lock().push(store.active_role());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        self.save("")
    }
}

#[test]
fn test_session_is_readable_while_persisting() {
    let persistence = Arc::new(ReentrantPersistence::default());
    let store = SessionStore::new(persistence.clone());
    let _ = persistence.store.set(store.clone());

    let (done, finished) = mpsc::channel();
    std::thread::spawn(move || {
        store.login(identity(Role::Owner));
        store.logout(Role::Owner);
        let _ = done.send(());
    });

    finished
        .recv_timeout(Duration::from_secs(5))
        .expect("login/logout blocked while persisting");
    assert_eq!(*persistence.seen.lock(), vec![Some(Role::Owner), None]);
}
