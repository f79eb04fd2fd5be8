// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Turf-session: authenticated API access for the turf booking marketplace
//!
//! This crate provides the role-scoped HTTP clients (client, turf owner,
//! admin) with single-flight session refresh, logout on unrecoverable auth
//! failure, and a persisted session store.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

use config::Config;
use services::{
    FilePersistence, HttpTransport, LogoutDispatcher, ReqwestTransport, RoleClients,
    SessionStore, UnifiedClient,
};
use std::sync::Arc;

/// Shared client state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: SessionStore,
    pub logout: LogoutDispatcher,
    pub clients: RoleClients,
    pub unified: UnifiedClient,
}

impl AppState {
    /// Wire everything together around `transport` and `logout`.
    pub fn new(config: Config, transport: Arc<dyn HttpTransport>, logout: LogoutDispatcher) -> Self {
        let clients = RoleClients::new(transport.clone(), logout.clone());
        Self {
            config,
            store: logout.store().clone(),
            unified: UnifiedClient::new(transport, logout.clone(), clients.clone()),
            clients,
            logout,
        }
    }

    /// Production wiring: reqwest transport, file-backed session, and a
    /// logging navigator/notifier.
    pub fn from_config(config: Config) -> error::Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        let persistence = Arc::new(FilePersistence::new(
            config.session_file.clone(),
            config.session_key.clone(),
        ));
        let store = SessionStore::rehydrate(persistence);
        let logout = LogoutDispatcher::logging(store);
        Ok(Self::new(config, transport, logout))
    }
}
