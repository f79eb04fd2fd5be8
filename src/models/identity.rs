//! Authenticated user record held by the session store.

use super::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role-tagged user record returned by login and refresh-session endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Backend user ID
    #[serde(alias = "_id")]
    pub user_id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub role: Role,
    /// Account status as reported by the backend (e.g. "active", "blocked")
    #[serde(default)]
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Role-specific fields (turf details for owners, permissions for admins, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Identity {
    /// Look up a role-specific field.
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.extra.get(name)
    }
}
