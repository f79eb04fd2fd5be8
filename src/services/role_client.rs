// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Role-scoped HTTP client.
//!
//! Binds a transport to one role's API namespace. Has no knowledge of the
//! session store or of refresh handling.

use super::transport::HttpTransport;
use crate::error::ClientError;
use crate::models::{ApiRequest, ApiResponse, Role, RoleProfile};
use std::sync::Arc;

#[derive(Clone)]
pub struct RoleClient {
    transport: Arc<dyn HttpTransport>,
    profile: RoleProfile,
}

impl RoleClient {
    pub fn new(transport: Arc<dyn HttpTransport>, profile: RoleProfile) -> Self {
        Self { transport, profile }
    }

    pub fn for_role(transport: Arc<dyn HttpTransport>, role: Role) -> Self {
        Self::new(transport, RoleProfile::new(role))
    }

    pub fn role(&self) -> Role {
        self.profile.role
    }

    pub fn profile(&self) -> &RoleProfile {
        &self.profile
    }

    /// Send a request whose path is relative to the role base path.
    ///
    /// Returns the response on 2xx, otherwise `ClientError::Status` carrying
    /// the original descriptor.
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let resolved = ApiRequest {
            path: self.profile.resolve(&request.path),
            ..request.clone()
        };
        let response = self.transport.send(&resolved).await?;
        check_response(request, response)
    }

    /// Send a request whose path already includes the role prefix.
    pub async fn send_raw(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let response = self.transport.send(request).await?;
        check_response(request, response)
    }

    /// POST the refresh-token endpoint. Success means the server has set
    /// renewed session cookies; the body is not inspected.
    pub async fn refresh_token(&self) -> Result<(), ClientError> {
        let request = ApiRequest::post(self.profile.refresh_endpoint.clone());
        self.send_raw(&request).await.map(|_| ())
    }

    /// GET the refresh-session endpoint, which returns the current identity.
    pub async fn refresh_session(&self) -> Result<ApiResponse, ClientError> {
        let request = ApiRequest::get(self.profile.refresh_session_endpoint.clone());
        self.send_raw(&request).await
    }
}

/// Check response status and return error if not successful.
pub(crate) fn check_response(request: &ApiRequest, response: ApiResponse) -> Result<ApiResponse, ClientError> {
    if response.is_success() {
        return Ok(response);
    }

    Err(ClientError::Status {
        status: response.status,
        request: Box::new(request.clone()),
        body: response.body,
    })
}
