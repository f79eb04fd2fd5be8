// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Marketplace roles and the API namespace each one talks to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three authenticated audiences of the booking API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "client")]
    Client,
    #[serde(rename = "turfOwner", alias = "owner")]
    Owner,
    #[serde(rename = "admin")]
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Client, Role::Owner, Role::Admin];

    /// API namespace prefix (first path segment) for this role.
    pub fn api_prefix(self) -> &'static str {
        match self {
            Role::Client => "/_cl",
            Role::Owner => "/_ow",
            Role::Admin => "/_ad",
        }
    }

    /// Endpoint that renews the session cookies, relative to the prefix.
    pub fn refresh_token_path(self) -> &'static str {
        match self {
            Role::Client => "/client/refresh-token",
            Role::Owner => "/turfOwner/refresh-token",
            Role::Admin => "/admin/refresh-token",
        }
    }

    /// Endpoint that returns the server-confirmed identity, relative to the prefix.
    pub fn refresh_session_path(self) -> &'static str {
        match self {
            Role::Client => "/client/refresh-session",
            // The backend registers this one in lowercase.
            Role::Owner => "/turfowner/refresh-session",
            Role::Admin => "/admin/refresh-session",
        }
    }

    /// Public page a signed-out user of this role is sent to.
    pub fn entry_path(self) -> &'static str {
        match self {
            Role::Client => "/",
            Role::Owner => "/turfOwner",
            Role::Admin => "/admin",
        }
    }

    /// Wire name, as used in identities and the persisted session.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Owner => "turfOwner",
            Role::Admin => "admin",
        }
    }

    /// Resolve the role from the first segment of an API path.
    ///
    /// `"/_cl/client/bookings"` and `"_cl/client/bookings"` both map to
    /// [`Role::Client`]; anything outside the three namespaces is `None`.
    pub fn from_path_prefix(path: &str) -> Option<Role> {
        let segment = path.trim_start_matches('/').split('/').next()?;
        Role::ALL
            .into_iter()
            .find(|role| &role.api_prefix()[1..] == segment)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything that differs between the three authenticated clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleProfile {
    pub role: Role,
    /// Prefix prepended to every request path.
    pub base_path: String,
    /// Full path of the refresh-token endpoint.
    pub refresh_endpoint: String,
    /// Full path of the refresh-session endpoint.
    pub refresh_session_endpoint: String,
    /// Where the browser goes after a terminal auth failure.
    pub redirect_path: String,
}

impl RoleProfile {
    pub fn new(role: Role) -> Self {
        let base = role.api_prefix();
        Self {
            role,
            base_path: base.to_string(),
            refresh_endpoint: format!("{}{}", base, role.refresh_token_path()),
            refresh_session_endpoint: format!("{}{}", base, role.refresh_session_path()),
            redirect_path: role.entry_path().to_string(),
        }
    }

    /// Join a role-relative path onto the base path.
    ///
    /// Paths that already carry the base prefix are left alone.
    pub fn resolve(&self, path: &str) -> String {
        let trimmed = path.trim_start_matches('/');
        let base = self.base_path.trim_start_matches('/');
        if trimmed == base || trimmed.starts_with(&format!("{}/", base)) {
            return format!("/{}", trimmed);
        }
        format!("{}/{}", self.base_path, trimmed)
    }
}

impl From<Role> for RoleProfile {
    fn from(role: Role) -> Self {
        RoleProfile::new(role)
    }
}
