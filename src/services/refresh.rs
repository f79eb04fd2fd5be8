// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session refresh coordination for one role.
//!
//! A request that comes back 401 triggers at most one refresh-then-replay
//! cycle. Concurrent 401s share a single in-flight refresh: the first one
//! starts it, later ones wait on the same shared future, and each replays
//! its own request once it resolves.

use super::logout::LogoutDispatcher;
use super::role_client::RoleClient;
use crate::error::ClientError;
use crate::models::{ApiRequest, ApiResponse, Role};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Why a refresh call failed. Cloned out to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RefreshFailure {
    pub status: Option<StatusCode>,
    pub message: String,
}

impl From<&ClientError> for RefreshFailure {
    fn from(err: &ClientError) -> Self {
        Self {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

pub type RefreshOutcome = Result<(), RefreshFailure>;

type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

enum RefreshState {
    /// No refresh running. `last` is the outcome of the most recent one.
    Idle { last: Option<RefreshOutcome> },
    Refreshing(SharedRefresh),
}

/// Refresh state machine for one role client.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    role: Role,
    state: Mutex<RefreshState>,
    /// Number of settled refreshes, successful or not; only changes under `state`.
    generation: AtomicU64,
    /// Number of refresh calls issued.
    refresh_calls: AtomicU64,
}

impl RefreshCoordinator {
    pub fn new(role: Role) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                role,
                state: Mutex::new(RefreshState::Idle { last: None }),
                generation: AtomicU64::new(0),
                refresh_calls: AtomicU64::new(0),
            }),
        }
    }

    pub fn role(&self) -> Role {
        self.inner.role
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(*self.inner.state.lock(), RefreshState::Refreshing(_))
    }

    /// Completed refreshes so far, successful or not.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    /// Refresh calls issued so far.
    pub fn refresh_calls(&self) -> u64 {
        self.inner.refresh_calls.load(Ordering::SeqCst)
    }

    /// Send `request`, recovering once from an expired session.
    ///
    /// - non-401 results pass through unchanged
    /// - a 401 on a request the caller already marked as retried passes
    ///   through unchanged
    /// - otherwise the session is refreshed (or an in-flight refresh is
    ///   joined) and the request is replayed exactly once
    /// - if the refresh fails the role is logged out and the caller gets
    ///   [`ClientError::SessionExpired`]
    /// - if the replay is rejected with 401 as well, the role is logged out
    ///   and that error is returned
    pub async fn execute(
        &self,
        client: &RoleClient,
        logout: &LogoutDispatcher,
        request: ApiRequest,
    ) -> Result<ApiResponse, ClientError> {
        let observed = self.generation();

        let err = match client.send(&request).await {
            Ok(response) => return Ok(response),
            Err(e) => e,
        };

        if !err.is_unauthorized() {
            return Err(err);
        }

        if request.retried {
            tracing::debug!(
                role = %self.role(),
                path = %request.path,
                "401 on replayed request, not refreshing again"
            );
            return Err(err);
        }

        let replay = request.as_retry();
        self.recover(client, logout, observed).await?;

        tracing::debug!(role = %self.role(), path = %replay.path, "Replaying request after refresh");
        let result = client.send(&replay).await;
        if let Err(e) = &result {
            if e.is_unauthorized() {
                tracing::warn!(
                    role = %self.role(),
                    path = %replay.path,
                    "Replayed request rejected after refresh, logging out"
                );
                logout.dispatch(self.role());
            }
        }
        result
    }

    /// Wait until the session is refreshed, starting the refresh if nobody
    /// else has.
    ///
    /// `observed` is the generation seen when the failed request was sent. If
    /// a refresh completed since then the 401 is stale, and that refresh's
    /// outcome is reused instead of issuing another call. A failed outcome is
    /// not reused once the role has signed in again.
    async fn recover(
        &self,
        client: &RoleClient,
        logout: &LogoutDispatcher,
        observed: u64,
    ) -> Result<(), ClientError> {
        let flight = {
            let mut state = self.inner.state.lock();
            let pending = match &*state {
                RefreshState::Refreshing(flight) => Some(flight.clone()),
                RefreshState::Idle { last } if self.generation() != observed => {
                    let last = last.clone().unwrap_or(Ok(()));
                    if last.is_err() && logout.store().identity(self.role()).is_some() {
                        // The failed refresh logged this role out, so a
                        // session now means a fresh login.
                        tracing::debug!(role = %self.role(), "Signed in again since the last failed refresh");
                        None
                    } else {
                        tracing::debug!(
                            role = %self.role(),
                            observed,
                            generation = self.generation(),
                            "Session refreshed while request was in flight"
                        );
                        return self.settle(last);
                    }
                }
                RefreshState::Idle { .. } => None,
            };

            match pending {
                Some(flight) => {
                    tracing::debug!(role = %self.role(), "Joining in-flight session refresh");
                    flight
                }
                None => {
                    let flight = self.start_refresh(client.clone(), logout.clone());
                    *state = RefreshState::Refreshing(flight.clone());
                    flight
                }
            }
        };

        let outcome = flight.await;
        self.settle(outcome)
    }

    fn settle(&self, outcome: RefreshOutcome) -> Result<(), ClientError> {
        outcome.map_err(|failure| ClientError::SessionExpired {
            role: self.role(),
            failure,
        })
    }

    /// Build the shared refresh future. Nothing is sent until it is polled.
    fn start_refresh(&self, client: RoleClient, logout: LogoutDispatcher) -> SharedRefresh {
        let inner = Arc::clone(&self.inner);

        async move {
            let role = inner.role;
            let call = inner.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::info!(role = %role, call, "Access expired, refreshing session");

            let outcome = client
                .refresh_token()
                .await
                .map_err(|e| RefreshFailure::from(&e));

            {
                let mut state = inner.state.lock();
                let generation = inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
                *state = RefreshState::Idle {
                    last: Some(outcome.clone()),
                };
                tracing::debug!(role = %role, generation, "Refresh settled");
            }

            match &outcome {
                Ok(()) => tracing::info!(role = %role, "Session refreshed"),
                Err(failure) => {
                    tracing::warn!(
                        role = %role,
                        status = ?failure.status,
                        error = %failure.message,
                        "Session refresh failed"
                    );
                    logout.dispatch(role);
                }
            }

            outcome
        }
        .boxed()
        .shared()
    }
}
