//! Stub `/data` server for poller integration tests.
//!
//! Replies are served in request arrival order; once the queue is empty the
//! fallback reply is repeated. Every request's query string is recorded.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use serde_json::{json, Value};

use taskboard::config::PollerConfig;

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
    pub delay: Duration,
}

impl Reply {
    pub fn json(value: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: value.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn raw(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }
}

/// A snapshot with `n` map tasks named after `tag`, `m` workers and the given progress.
pub fn snapshot(tag: &str, n: usize, m: usize, progress: f64) -> Value {
    let tasks: Vec<Value> = (0..n)
        .map(|i| json!({"id": format!("{tag}-{i}"), "type": "map", "status": "idle"}))
        .collect();
    let workers: Vec<Value> = (0..m)
        .map(|i| json!({"id": format!("worker-{i}"), "tasks_assigned": i}))
        .collect();
    json!({"tasks": tasks, "workers": workers, "progress": progress})
}

pub struct StubState {
    replies: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    queries: Mutex<Vec<HashMap<String, String>>>,
}

#[derive(Clone)]
pub struct StubServer {
    pub addr: SocketAddr,
    state: Arc<StubState>,
}

impl StubServer {
    pub async fn start(replies: Vec<Reply>, fallback: Reply) -> Self {
        let state = Arc::new(StubState {
            replies: Mutex::new(replies.into()),
            fallback,
            queries: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/data", get(data_handler))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn config(&self) -> PollerConfig {
        PollerConfig::new(self.base_url())
    }

    pub fn requests(&self) -> usize {
        self.state.queries.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<HashMap<String, String>> {
        self.state.queries.lock().unwrap().clone()
    }
}

async fn data_handler(
    State(state): State<Arc<StubState>>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    let reply = {
        let next = state.replies.lock().unwrap().pop_front();
        state.queries.lock().unwrap().push(params);
        next.unwrap_or_else(|| state.fallback.clone())
    };

    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }
    (reply.status, reply.body)
}
