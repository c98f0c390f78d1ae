//! In-process mock cluster for integration tests.
//!
//! [`MockCluster`] serves the backend's HTTP surface on a random local port
//! and records every request it receives. Without rules it behaves like a
//! healthy, empty cluster; [`MockRule`]s override responses per path.

use crate::records::success_envelope;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub use axum::http::Method;

/// One request as seen by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path plus query string, e.g. `/solr/c/update?commit=true`.
    pub target: String,
    pub content_type: Option<String>,
    pub body: String,
    pub received_at: Instant,
}

impl RecordedRequest {
    /// Body decoded as JSON, `Value::Null` when it is not JSON.
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }

    /// First value of a query parameter.
    pub fn query_param(&self, key: &str) -> Option<String> {
        let (_, query) = self.target.split_once('?')?;
        query.split('&').find_map(|pair| match pair.split_once('=') {
            Some((k, v)) if k == key => Some(v.to_string()),
            _ => None,
        })
    }
}

/// Canned response for requests whose target contains `pattern`.
#[derive(Debug, Clone)]
pub struct MockRule {
    pattern: String,
    method: Option<Method>,
    status: u16,
    body: String,
    remaining: Option<usize>,
    delay: Duration,
}

impl MockRule {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            method: None,
            status: 200,
            body: String::new(),
            remaining: None,
            delay: Duration::ZERO,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = body.to_string();
        self
    }

    pub fn raw(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Apply only to the next `n` matching requests.
    pub fn times(mut self, n: usize) -> Self {
        self.remaining = Some(n);
        self
    }

    /// Sleep before answering.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn matches(&self, method: &Method, target: &str) -> bool {
        self.remaining != Some(0)
            && self.method.as_ref().map_or(true, |m| m == method)
            && target.contains(&self.pattern)
    }
}

#[derive(Default)]
struct MockState {
    requests: Mutex<Vec<RecordedRequest>>,
    rules: Mutex<Vec<MockRule>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Running mock backend. The server stops when this is dropped.
pub struct MockCluster {
    addr: SocketAddr,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockCluster {
    pub async fn start() -> std::io::Result<Self> {
        let state = Arc::new(MockState::default());
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Mock cluster stopped: {e}");
            }
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Register a rule. Rules are tried in registration order.
    pub fn on(&self, rule: MockRule) -> &Self {
        lock(&self.state.rules).push(rule);
        self
    }

    /// Serve `routes` from the routing inventory.
    pub fn with_routes(&self, routes: Value) -> &Self {
        self.on(MockRule::new("/dkubectrlr/routes").json(routes))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state.requests).clone()
    }

    /// Recorded requests whose target contains `pattern`.
    pub fn requests_to(&self, pattern: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.target.contains(pattern))
            .collect()
    }

    pub fn count(&self, pattern: &str) -> usize {
        self.requests_to(pattern).len()
    }

    pub fn clear_requests(&self) {
        lock(&self.state.requests).clear();
    }
}

impl Drop for MockCluster {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: axum::http::HeaderMap,
    body: Bytes,
) -> Response {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    lock(&state.requests).push(RecordedRequest {
        method: method.clone(),
        target: target.clone(),
        content_type: headers
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: String::from_utf8_lossy(&body).into_owned(),
        received_at: Instant::now(),
    });

    let rule = {
        let mut rules = lock(&state.rules);
        rules
            .iter_mut()
            .find(|rule| rule.matches(&method, &target))
            .map(|rule| {
                if let Some(n) = rule.remaining.as_mut() {
                    *n -= 1;
                }
                rule.clone()
            })
    };

    let (status, body) = match rule {
        Some(rule) => {
            if !rule.delay.is_zero() {
                tokio::time::sleep(rule.delay).await;
            }
            (rule.status, rule.body)
        }
        None => default_response(&target),
    };

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [("Content-Type", "application/json")], body).into_response()
}

/// Answers of a healthy cluster with no collections.
fn default_response(target: &str) -> (u16, String) {
    let ok_header = json!({"responseHeader": {"status": 0, "QTime": 0}});
    let path = target.split('?').next().unwrap_or(target);

    let body = if path.starts_with("/solr/servlets/collection")
        || path.starts_with("/solr/api/admin/cvroutes/update")
        || path.starts_with("/dkubectrlr/unloadcollection")
    {
        success_envelope()
    } else if path.ends_with("/admin/ping") || path.ends_with("/update") {
        ok_header
    } else if path.ends_with("/select") {
        json!({
            "responseHeader": {"status": 0, "QTime": 0},
            "response": {"numFound": 0, "start": 0, "docs": []}
        })
    } else if path.starts_with("/dkubectrlr/") {
        json!([])
    } else {
        return (404, String::new());
    };

    (200, body.to_string())
}
