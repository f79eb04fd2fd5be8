// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - HTTP clients, refresh coordination and session state.

pub mod authenticated;
pub mod logout;
pub mod persistence;
pub mod refresh;
pub mod role_client;
pub mod session_store;
pub mod transport;
pub mod unified;

pub use authenticated::{AuthenticatedClient, RoleClients};
pub use logout::{LogNavigator, LogNotifier, LogoutDispatcher, Navigator, Notifier, LOGIN_AGAIN_NOTICE};
pub use persistence::{FilePersistence, MemoryPersistence, SessionPersistence};
pub use refresh::{RefreshCoordinator, RefreshFailure, RefreshOutcome};
pub use role_client::RoleClient;
pub use session_store::SessionStore;
pub use transport::{HttpTransport, ReqwestTransport};
pub use unified::UnifiedClient;
