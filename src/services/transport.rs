// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP transport used by the role clients.
//!
//! The transport only moves bytes: it returns every response, whatever its
//! status, and leaves status handling to the caller.

use crate::config::Config;
use crate::error::ClientError;
use crate::models::{ApiRequest, ApiResponse};

/// Sends a fully resolved request to the backend.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync + 'static {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError>;
}

/// `reqwest` transport with a cookie store, so session cookies set by login
/// and refresh calls ride along on every later request.
#[derive(Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder().cookie_store(true);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let url = self.url(&request.path);

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .headers(request.headers.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            ClientError::Transport(format!("{} {} failed: {}", request.method, url, e))
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(format!("Failed to read response body: {}", e)))?;

        tracing::debug!(method = %request.method, path = %request.path, status = %status, "HTTP response");

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
