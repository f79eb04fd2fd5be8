// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use parking_lot::Mutex;
use reqwest::{Method, StatusCode};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Semaphore;
use turf_session::error::ClientError;
use turf_session::models::{ApiRequest, ApiResponse, Identity, Role};
use turf_session::services::{HttpTransport, LogoutDispatcher, Navigator, Notifier, SessionStore};

/// Scripted transport: responses are queued per `METHOD path`, and the last
/// queued response repeats. Unscripted routes answer 404.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, VecDeque<ApiResponse>>>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    calls: Mutex<Vec<ApiRequest>>,
}

fn route_key(method: &Method, path: &str) -> String {
    format!("{} {}", method, path)
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a response for `method path`.
    pub fn on(&self, method: Method, path: &str, status: u16, body: &str) -> &Self {
        let status = StatusCode::from_u16(status).expect("valid status");
        self.routes
            .lock()
            .entry(route_key(&method, path))
            .or_default()
            .push_back(ApiResponse::new(status, body));
        self
    }

    /// Hold every call to `method path` until `release` lets it through.
    pub fn gate(&self, method: Method, path: &str) {
        self.gates
            .lock()
            .insert(route_key(&method, path), Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self, method: Method, path: &str, calls: usize) {
        if let Some(gate) = self.gates.lock().get(&route_key(&method, path)) {
            gate.add_permits(calls);
        }
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Wait until `method path` has been called at least `calls` times.
    pub async fn wait_for(&self, method: Method, path: &str, calls: usize) {
        for _ in 0..10_000 {
            if self.count(method.clone(), path) >= calls {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
        panic!("timed out waiting for {} call(s) to {} {}", calls, method, path);
    }
}

#[async_trait::async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let key = route_key(&request.method, &request.path);
        self.calls.lock().push(request.clone());

        let gate = self.gates.lock().get(&key).cloned();
        if let Some(gate) = gate {
            gate.acquire()
                .await
                .expect("gate closed")
                .forget();
        }

        let mut routes = self.routes.lock();
        let response = match routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(response.unwrap_or_else(|| ApiResponse::new(StatusCode::NOT_FOUND, "not found")))
    }
}

/// Records every redirect.
#[derive(Default)]
pub struct RecordingNavigator {
    pub paths: Mutex<Vec<String>>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.paths.lock().push(path.to_string());
    }
}

#[allow(dead_code)]
impl RecordingNavigator {
    pub fn visited(&self) -> Vec<String> {
        self.paths.lock().clone()
    }
}

/// Records every notice.
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn shown(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

/// Logout dispatcher plus handles to observe it.
#[allow(dead_code)]
pub struct TestHarness {
    pub transport: Arc<MockTransport>,
    pub store: SessionStore,
    pub navigator: Arc<RecordingNavigator>,
    pub notifier: Arc<RecordingNotifier>,
    pub logout: LogoutDispatcher,
}

#[allow(dead_code)]
pub fn harness() -> TestHarness {
    let transport = MockTransport::new();
    let store = SessionStore::in_memory();
    let navigator = Arc::new(RecordingNavigator::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let logout = LogoutDispatcher::new(store.clone(), navigator.clone(), notifier.clone());
    TestHarness {
        transport,
        store,
        navigator,
        notifier,
        logout,
    }
}

#[allow(dead_code)]
pub fn identity_json(role: Role) -> serde_json::Value {
    serde_json::json!({
        "userId": format!("{}-42", role),
        "email": format!("{}@turf.example", role),
        "phoneNumber": "9876543210",
        "role": role,
        "status": "active",
        "createdAt": "2025-03-01T10:00:00Z",
        "updatedAt": "2025-03-02T10:00:00Z"
    })
}

#[allow(dead_code)]
pub fn identity(role: Role) -> Identity {
    serde_json::from_value(identity_json(role)).expect("valid identity")
}
