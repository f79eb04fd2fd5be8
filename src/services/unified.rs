// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Role-aware client for paths that carry their own role prefix.
//!
//! `/_cl/...`, `/_ow/...` and `/_ad/...` are routed to the matching role's
//! authenticated client, so they share its refresh flow. Other paths are sent
//! as is; a 401 on one of them is a terminal auth failure.

use super::authenticated::{AuthenticatedClient, RoleClients};
use super::logout::LogoutDispatcher;
use super::role_client::check_response;
use super::transport::HttpTransport;
use crate::error::ClientError;
use crate::models::{ApiRequest, ApiResponse, Role};
use serde::de::DeserializeOwned;
use std::sync::Arc;

#[derive(Clone)]
pub struct UnifiedClient {
    transport: Arc<dyn HttpTransport>,
    logout: LogoutDispatcher,
    /// Same per-role clients (and refresh state) as the rest of the app.
    clients: RoleClients,
}

impl UnifiedClient {
    pub fn new(transport: Arc<dyn HttpTransport>, logout: LogoutDispatcher, clients: RoleClients) -> Self {
        Self {
            transport,
            logout,
            clients,
        }
    }

    /// Authenticated client that handles `role`'s namespace.
    pub fn client(&self, role: Role) -> &AuthenticatedClient {
        self.clients.get(role)
    }

    /// Send a request whose path starts with a role prefix.
    ///
    /// Paths outside every role namespace are sent unchanged. If one of them
    /// comes back 401 the client-style logout runs and the caller gets
    /// [`ClientError::UnknownRole`]; no refresh is attempted.
    pub async fn request(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        match Role::from_path_prefix(&request.path) {
            Some(role) => self.clients.get(role).request(request).await,
            None => self.request_unscoped(request).await,
        }
    }

    pub async fn request_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, ClientError> {
        self.request(request).await?.json()
    }

    async fn request_unscoped(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let response = self.transport.send(&request).await?;
        match check_response(&request, response) {
            Err(e) if e.is_unauthorized() => {
                tracing::warn!(path = %request.path, "401 outside every role namespace");
                self.logout.dispatch(Role::Client);
                Err(ClientError::UnknownRole { path: request.path })
            }
            result => result,
        }
    }
}
