// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated request API for one role.

use super::logout::LogoutDispatcher;
use super::refresh::RefreshCoordinator;
use super::role_client::RoleClient;
use super::transport::HttpTransport;
use crate::error::ClientError;
use crate::models::{ApiRequest, ApiResponse, Identity, Role, RoleProfile};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Role client wrapped with refresh-and-replay on expired sessions.
///
/// One instance per role; clones share the same refresh state.
#[derive(Clone)]
pub struct AuthenticatedClient {
    client: RoleClient,
    coordinator: RefreshCoordinator,
    logout: LogoutDispatcher,
}

impl AuthenticatedClient {
    pub fn new(client: RoleClient, logout: LogoutDispatcher) -> Self {
        let coordinator = RefreshCoordinator::new(client.role());
        Self {
            client,
            coordinator,
            logout,
        }
    }

    pub fn for_role(transport: Arc<dyn HttpTransport>, role: Role, logout: LogoutDispatcher) -> Self {
        Self::new(RoleClient::new(transport, RoleProfile::new(role)), logout)
    }

    pub fn role(&self) -> Role {
        self.client.role()
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// Send a request whose path is relative to the role base path.
    pub async fn request(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        self.coordinator
            .execute(&self.client, &self.logout, request)
            .await
    }

    /// Send a request and decode the JSON response.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, ClientError> {
        self.request(request).await?.json()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request_json(ApiRequest::get(path)).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        self.request(ApiRequest::post(path).json(body)?).await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        self.request(ApiRequest::put(path).json(body)?).await
    }

    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        self.request(ApiRequest::patch(path).json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ClientError> {
        self.request(ApiRequest::delete(path)).await
    }

    /// Re-read this role's identity from the server into the session store.
    pub async fn refresh_session(&self) -> Result<Identity, ClientError> {
        self.logout.store().refresh_session(&self.client).await
    }
}

/// The three role clients of the marketplace, sharing one session store.
#[derive(Clone)]
pub struct RoleClients {
    pub client: AuthenticatedClient,
    pub owner: AuthenticatedClient,
    pub admin: AuthenticatedClient,
}

impl RoleClients {
    pub fn new(transport: Arc<dyn HttpTransport>, logout: LogoutDispatcher) -> Self {
        Self {
            client: AuthenticatedClient::for_role(transport.clone(), Role::Client, logout.clone()),
            owner: AuthenticatedClient::for_role(transport.clone(), Role::Owner, logout.clone()),
            admin: AuthenticatedClient::for_role(transport, Role::Admin, logout),
        }
    }

    pub fn get(&self, role: Role) -> &AuthenticatedClient {
        match role {
            Role::Client => &self.client,
            Role::Owner => &self.owner,
            Role::Admin => &self.admin,
        }
    }
}
