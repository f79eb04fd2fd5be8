// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The active session: at most one authenticated identity.

use super::{Identity, Role};
use serde::{Deserialize, Serialize};

/// Who is signed in, if anyone.
///
/// Serialized as `{"kind": "client"|"turfOwner"|"admin"|"none", "identity": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SessionRecord", into = "SessionRecord")]
pub enum Session {
    #[default]
    None,
    Active { role: Role, identity: Box<Identity> },
}

#[derive(Serialize, Deserialize)]
struct SessionRecord {
    kind: String,
    #[serde(default)]
    identity: Option<Identity>,
}

impl From<Session> for SessionRecord {
    fn from(session: Session) -> Self {
        match session {
            Session::None => SessionRecord {
                kind: "none".to_string(),
                identity: None,
            },
            Session::Active { role, identity } => SessionRecord {
                kind: role.as_str().to_string(),
                identity: Some(*identity),
            },
        }
    }
}

impl TryFrom<SessionRecord> for Session {
    type Error = String;

    fn try_from(record: SessionRecord) -> Result<Self, Self::Error> {
        if record.kind == "none" {
            return Ok(Session::None);
        }
        let role = Role::ALL
            .into_iter()
            .find(|role| role.as_str() == record.kind)
            .ok_or_else(|| format!("unknown session kind: {}", record.kind))?;
        let identity = record
            .identity
            .ok_or_else(|| format!("session kind {} has no identity", role))?;
        if identity.role != role {
            return Err(format!(
                "session kind {} does not match identity role {}",
                role, identity.role
            ));
        }
        Ok(Session::Active {
            role,
            identity: Box::new(identity),
        })
    }
}

impl Session {
    pub fn active(identity: Identity) -> Self {
        Session::Active {
            role: identity.role,
            identity: Box::new(identity),
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            Session::None => None,
            Session::Active { role, .. } => Some(*role),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::None => None,
            Session::Active { identity, .. } => Some(identity.as_ref()),
        }
    }

    /// The identity, but only when it belongs to `role`.
    pub fn identity_for(&self, role: Role) -> Option<&Identity> {
        match self {
            Session::Active { role: r, identity } if *r == role => Some(identity.as_ref()),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Session::None)
    }
}

/// Persisted shape from before the session became a tagged union: one
/// optional slot per role.
#[derive(Debug, Default, Deserialize)]
pub struct LegacySlots {
    #[serde(default)]
    pub client: Option<Identity>,
    #[serde(default, alias = "turfOwner")]
    pub owner: Option<Identity>,
    #[serde(default)]
    pub admin: Option<Identity>,
}

impl LegacySlots {
    pub fn populated(&self) -> usize {
        [&self.client, &self.owner, &self.admin]
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    /// Collapse to a single session; client wins over owner wins over admin.
    pub fn into_session(self) -> Session {
        self.client
            .or(self.owner)
            .or(self.admin)
            .map(Session::active)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn identity_json(role: &str) -> serde_json::Value {
        json!({
            "userId": "u-1",
            "email": "player@example.com",
            "phoneNumber": "9876543210",
            "role": role,
            "status": "active",
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-02T00:00:00Z",
            "turfCount": 3
        })
    }

    #[test]
    fn test_session_round_trip_keeps_tag() {
        let identity: Identity = serde_json::from_value(identity_json("turfOwner")).unwrap();
        assert_eq!(identity.field("turfCount"), Some(&json!(3)));

        let session = Session::active(identity);
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["kind"], "turfOwner");
        assert_eq!(value["identity"]["userId"], "u-1");

        let back: Session = serde_json::from_value(value).unwrap();
        assert_eq!(back, session);
        assert_eq!(back.role(), Some(Role::Owner));
        assert!(back.identity_for(Role::Client).is_none());
    }

    #[test]
    fn test_none_serializes_as_kind_none() {
        let value = serde_json::to_value(Session::None).unwrap();
        assert_eq!(value, json!({ "kind": "none", "identity": null }));
    }

    #[test]
    fn test_kind_must_match_identity_role() {
        let result: Result<Session, _> = serde_json::from_value(json!({
            "kind": "admin",
            "identity": identity_json("client"),
        }));
        assert!(result.is_err());

        let result: Result<Session, _> = serde_json::from_value(json!({ "kind": "client" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_legacy_slots_prefers_client() {
        let slots: LegacySlots = serde_json::from_value(json!({
            "client": null,
            "owner": identity_json("turfOwner"),
            "admin": identity_json("admin"),
        }))
        .unwrap();
        assert_eq!(slots.populated(), 2);
        assert_eq!(slots.into_session().role(), Some(Role::Owner));
    }
}
