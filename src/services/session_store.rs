// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session store: the single source of truth for who is signed in.
//!
//! Handles:
//! - Login/logout per role, with at most one role active at a time
//! - Refreshing the identity from the server
//! - Persisting every change and rehydrating on boot

use super::persistence::{MemoryPersistence, SessionPersistence};
use super::role_client::RoleClient;
use crate::error::ClientError;
use crate::models::{Identity, LegacySlots, Role, Session};
use parking_lot::{Mutex, RwLock};
use serde::Deserialize;
use std::sync::Arc;

/// Shared handle to the session; clones see the same state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    session: RwLock<Session>,
    last_refresh_error: RwLock<Option<String>>,
    persistence: Arc<dyn SessionPersistence>,
    // Orders writes to `persistence`; never taken while `session` is held.
    persist_lock: Mutex<()>,
}

/// Identity as returned by refresh-session, with or without an envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdentityEnvelope {
    Data { data: Identity },
    User { user: Identity },
    Bare(Identity),
}

impl IdentityEnvelope {
    fn into_identity(self) -> Identity {
        match self {
            IdentityEnvelope::Data { data } => data,
            IdentityEnvelope::User { user } => user,
            IdentityEnvelope::Bare(identity) => identity,
        }
    }
}

impl SessionStore {
    /// Empty store backed by `persistence`. Existing persisted state is ignored.
    pub fn new(persistence: Arc<dyn SessionPersistence>) -> Self {
        Self::with_session(persistence, Session::None)
    }

    /// Empty store that is not persisted anywhere.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryPersistence::new()))
    }

    /// Restore the store from `persistence`.
    ///
    /// Unreadable or corrupt data is logged and yields an empty session.
    pub fn rehydrate(persistence: Arc<dyn SessionPersistence>) -> Self {
        let session = match persistence.load() {
            Ok(Some(raw)) => decode_persisted(&raw),
            Ok(None) => Session::None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load persisted session");
                Session::None
            }
        };
        tracing::debug!(role = ?session.role(), "Session rehydrated");
        Self::with_session(persistence, session)
    }

    fn with_session(persistence: Arc<dyn SessionPersistence>, session: Session) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                session: RwLock::new(session),
                last_refresh_error: RwLock::new(None),
                persistence,
                persist_lock: Mutex::new(()),
            }),
        }
    }

    /// Snapshot of the current session.
    pub fn current(&self) -> Session {
        self.inner.session.read().clone()
    }

    pub fn active_role(&self) -> Option<Role> {
        self.inner.session.read().role()
    }

    /// The signed-in identity, if it belongs to `role`.
    pub fn identity(&self, role: Role) -> Option<Identity> {
        self.inner.session.read().identity_for(role).cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        !self.inner.session.read().is_none()
    }

    /// Make `identity` the active session, replacing any other role's.
    pub fn login(&self, identity: Identity) {
        {
            let mut session = self.inner.session.write();
            if let Some(previous) = session.role().filter(|r| *r != identity.role) {
                tracing::info!(previous = %previous, role = %identity.role, "Replacing session of another role");
            }
            *session = Session::active(identity);
        }
        self.persist();
    }

    /// Clear the session if it belongs to `role`. Returns whether anything
    /// was cleared.
    pub fn logout(&self, role: Role) -> bool {
        {
            let mut session = self.inner.session.write();
            if session.role() != Some(role) {
                return false;
            }
            *session = Session::None;
        }
        self.persist();
        true
    }

    /// Most recent refresh-session failure, if the last attempt failed.
    pub fn last_refresh_error(&self) -> Option<String> {
        self.inner.last_refresh_error.read().clone()
    }

    /// Re-read the identity from the role's refresh-session endpoint.
    ///
    /// On failure the session is left as it was; the failure is logged and
    /// kept in [`last_refresh_error`](Self::last_refresh_error).
    pub async fn refresh_session(&self, client: &RoleClient) -> Result<Identity, ClientError> {
        let role = client.role();
        let result = client.refresh_session().await.and_then(|response| {
            let identity = response.json::<IdentityEnvelope>()?.into_identity();
            if identity.role != role {
                return Err(ClientError::Decode(format!(
                    "refresh-session for {} returned a {} identity",
                    role, identity.role
                )));
            }
            Ok(identity)
        });

        match result {
            Ok(identity) => {
                *self.inner.last_refresh_error.write() = None;
                self.login(identity.clone());
                tracing::info!(role = %role, user_id = %identity.user_id, "Session refreshed from server");
                Ok(identity)
            }
            Err(e) => {
                tracing::warn!(role = %role, error = %e, "Session refresh failed");
                *self.inner.last_refresh_error.write() = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Write the current session out. The snapshot is taken under
    /// `persist_lock`, so the last writer always stores the latest state.
    fn persist(&self) {
        let _guard = self.inner.persist_lock.lock();
        let session = self.current();
        let result = match &session {
            Session::None => self.inner.persistence.clear(),
            _ => serde_json::to_string(&session)
                .map_err(|e| ClientError::Persistence(e.into()))
                .and_then(|raw| self.inner.persistence.save(&raw)),
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist session");
        }
    }
}

/// Decode a persisted session, accepting the older one-slot-per-role shape.
fn decode_persisted(raw: &str) -> Session {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Persisted session is not valid JSON, starting signed out");
            return Session::None;
        }
    };

    if value.get("kind").is_some() {
        return serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Persisted session is invalid, starting signed out");
            Session::None
        });
    }

    match serde_json::from_value::<LegacySlots>(value) {
        Ok(slots) => {
            if slots.populated() > 1 {
                tracing::warn!(
                    populated = slots.populated(),
                    "Persisted session has several roles signed in, keeping one"
                );
            }
            slots.into_session()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Persisted session is invalid, starting signed out");
            Session::None
        }
    }
}
