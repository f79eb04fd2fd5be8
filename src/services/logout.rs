// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Terminal auth failure handling: clear the role's session, tell the user,
//! and send them back to the role's entry page.

use super::session_store::SessionStore;
use crate::models::Role;
use std::sync::Arc;

/// Notice shown when the session cannot be recovered.
pub const LOGIN_AGAIN_NOTICE: &str = "Please login again";

/// Moves the user to another page.
pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, path: &str);
}

/// Shows a transient message to the user.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, message: &str);
}

/// Navigator that only records the redirect in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!(path, "Redirecting to entry page");
    }
}

/// Notifier that logs the notice.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!(notice = message, "User notice");
    }
}

#[derive(Clone)]
pub struct LogoutDispatcher {
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

impl LogoutDispatcher {
    pub fn new(
        store: SessionStore,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            navigator,
            notifier,
        }
    }

    /// Dispatcher that logs instead of driving a UI.
    pub fn logging(store: SessionStore) -> Self {
        Self::new(store, Arc::new(LogNavigator), Arc::new(LogNotifier))
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Sign `role` out and redirect to its entry page.
    ///
    /// Safe to call repeatedly: with nothing to clear the session stays
    /// empty, and the notice and redirect still happen.
    pub fn dispatch(&self, role: Role) {
        let cleared = self.store.logout(role);
        tracing::info!(role = %role, cleared, "Logging out after auth failure");
        self.notifier.notify(LOGIN_AGAIN_NOTICE);
        self.navigator.navigate(role.entry_path());
    }
}
