//! Mock megaverse entity service

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

/// One request the mock served
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub method: String,
    pub path: String,
    pub body: Value,
}

/// Shared mock behavior and observations
#[derive(Default)]
pub struct MockState {
    /// Rows served by `GET /map/{id}`
    map_rows: Mutex<Value>,
    /// Rows served by `GET /map/{id}/goal`
    goal_rows: Mutex<Value>,
    /// How many mutation calls to answer 429 before succeeding
    rate_limit_budget: AtomicU32,
    /// Same, for the map endpoints
    map_rate_limit_budget: AtomicU32,
    /// Retry-After seconds attached to 429 responses (0 = no header)
    retry_after_secs: AtomicU32,
    /// Answer every delete with 404
    deletes_miss: AtomicBool,
    /// Answer both map endpoints with 500
    fail_maps: AtomicBool,
    /// Answer mutations on this entity type with 500
    failing_endpoint: Mutex<Option<String>>,
    /// Added latency per mutation call
    latency: Mutex<Duration>,
    /// Every request, in arrival order (retried attempts included)
    calls: Mutex<Vec<RecordedCall>>,
    in_flight: AtomicUsize,
    /// Most simultaneous mutation calls observed
    max_in_flight: AtomicUsize,
}

/// In-process mock of the megaverse entity service
pub struct MockApi {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockApi {
    /// Bind an ephemeral port and start serving
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        *state.map_rows.lock() = json!([]);
        *state.goal_rows.lock() = json!([]);

        let router = Router::new()
            .route("/map/:candidate", get(serve_map))
            .route("/map/:candidate/goal", get(serve_goal))
            .route("/:endpoint", post(mutate).delete(mutate))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        MockApi { addr, state }
    }

    /// Base URL for pointing a client at the mock
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_map(&self, rows: Value) {
        *self.state.map_rows.lock() = rows;
    }

    pub fn set_goal(&self, rows: Value) {
        *self.state.goal_rows.lock() = rows;
    }

    /// Answer the next `budget` mutation calls with 429
    pub fn set_rate_limit_budget(&self, budget: u32) {
        self.state.rate_limit_budget.store(budget, Ordering::SeqCst);
    }

    /// Answer the next `budget` map fetches with 429
    pub fn set_map_rate_limit_budget(&self, budget: u32) {
        self.state
            .map_rate_limit_budget
            .store(budget, Ordering::SeqCst);
    }

    /// Attach a Retry-After header to 429 responses
    pub fn set_retry_after(&self, secs: u32) {
        self.state.retry_after_secs.store(secs, Ordering::SeqCst);
    }

    pub fn set_deletes_miss(&self, miss: bool) {
        self.state.deletes_miss.store(miss, Ordering::SeqCst);
    }

    pub fn set_fail_maps(&self, fail: bool) {
        self.state.fail_maps.store(fail, Ordering::SeqCst);
    }

    /// Answer mutations on one entity type with 500
    pub fn set_failing_endpoint(&self, endpoint: &str) {
        *self.state.failing_endpoint.lock() = Some(endpoint.to_string());
    }

    /// Stretch every mutation call, making concurrency observable
    pub fn set_latency(&self, latency: Duration) {
        *self.state.latency.lock() = latency;
    }

    /// All requests served so far, in arrival order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.lock().clone()
    }

    /// Number of requests matching a method and path
    pub fn calls_to(&self, method: &str, path: &str) -> usize {
        self.state
            .calls
            .lock()
            .iter()
            .filter(|call| call.method == method && call.path == path)
            .count()
    }

    /// Most simultaneous mutation calls observed
    pub fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }
}

async fn serve_map(
    State(state): State<Arc<MockState>>,
    Path(candidate): Path<String>,
) -> Response {
    state.calls.lock().push(RecordedCall {
        method: "GET".to_string(),
        path: format!("/map/{}", candidate),
        body: Value::Null,
    });

    if let Some(response) = map_fault(&state) {
        return response;
    }
    let rows = state.map_rows.lock().clone();
    Json(json!({ "map": rows })).into_response()
}

async fn serve_goal(
    State(state): State<Arc<MockState>>,
    Path(candidate): Path<String>,
) -> Response {
    state.calls.lock().push(RecordedCall {
        method: "GET".to_string(),
        path: format!("/map/{}/goal", candidate),
        body: Value::Null,
    });

    if let Some(response) = map_fault(&state) {
        return response;
    }
    let rows = state.goal_rows.lock().clone();
    Json(json!({ "goal": rows })).into_response()
}

fn map_fault(state: &MockState) -> Option<Response> {
    let limited = state
        .map_rate_limit_budget
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if limited {
        return Some(rate_limited_response(state));
    }
    if state.fail_maps.load(Ordering::SeqCst) {
        return Some(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "map unavailable" })),
            )
                .into_response(),
        );
    }
    None
}

async fn mutate(
    State(state): State<Arc<MockState>>,
    method: Method,
    Path(endpoint): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let now = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state.max_in_flight.fetch_max(now, Ordering::SeqCst);

    let latency = *state.latency.lock();
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }

    state.calls.lock().push(RecordedCall {
        method: method.to_string(),
        path: format!("/{}", endpoint),
        body,
    });

    let response = mutation_response(&state, &method, &endpoint);
    state.in_flight.fetch_sub(1, Ordering::SeqCst);
    response
}

fn mutation_response(state: &MockState, method: &Method, endpoint: &str) -> Response {
    if state
        .failing_endpoint
        .lock()
        .as_deref()
        .is_some_and(|failing| failing == endpoint)
    {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "entity service down" })),
        )
            .into_response();
    }

    let limited = state
        .rate_limit_budget
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if limited {
        return rate_limited_response(state);
    }

    if *method == Method::DELETE && state.deletes_miss.load(Ordering::SeqCst) {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "no entity" }))).into_response();
    }

    Json(json!({})).into_response()
}

fn rate_limited_response(state: &MockState) -> Response {
    let mut headers = HeaderMap::new();
    let secs = state.retry_after_secs.load(Ordering::SeqCst);
    if secs > 0 {
        if let Ok(value) = secs.to_string().parse() {
            headers.insert("Retry-After", value);
        }
    }
    (
        StatusCode::TOO_MANY_REQUESTS,
        headers,
        Json(json!({ "error": "rate limited" })),
    )
        .into_response()
}
