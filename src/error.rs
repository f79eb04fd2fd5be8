// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types.

use crate::models::{ApiRequest, Role};
use crate::services::RefreshFailure;
use reqwest::StatusCode;

/// Error returned by every authenticated request.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Non-2xx response. Carries the request that produced it.
    #[error("HTTP {status} for {} {}", .request.method, .request.path)]
    Status {
        status: StatusCode,
        request: Box<ApiRequest>,
        body: String,
    },

    /// The session could not be refreshed; the user must log in again.
    #[error("Session expired for {role}, please login again")]
    SessionExpired {
        role: Role,
        #[source]
        failure: RefreshFailure,
    },

    /// Request path is outside every role namespace.
    #[error("No role namespace for path: {path}")]
    UnknownRole { path: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Session persistence error: {0:#}")]
    Persistence(#[from] anyhow::Error),
}

impl ClientError {
    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Errors after which the user has to re-authenticate.
    pub fn is_terminal_auth(&self) -> bool {
        match self {
            ClientError::SessionExpired { .. } | ClientError::UnknownRole { .. } => true,
            ClientError::Status {
                status, request, ..
            } => *status == StatusCode::UNAUTHORIZED && request.retried,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

/// Result type alias for client calls
pub type Result<T> = std::result::Result<T, ClientError>;
