//! In-process fakes of the Workflows Executions API, the scoring API and the
//! generative model API, served by axum on random ports.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Workflows Executions API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Submission {
    /// Path after `/v1/`, e.g. `projects/p/locations/l/workflows/w/executions`.
    pub path: String,
    pub authorization: Option<String>,
    /// The decoded `argument` string.
    pub argument: Value,
}

/// Serves executions whose state advances one script step per GET. The last
/// step repeats once the script runs out.
pub struct FakeWorkflows {
    script: Vec<Value>,
    submit_failure: Option<(StatusCode, String)>,
    polls: AtomicUsize,
    submissions: Mutex<Vec<Submission>>,
}

impl FakeWorkflows {
    pub fn new(script: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            script,
            submit_failure: None,
            polls: AtomicUsize::new(0),
            submissions: Mutex::new(Vec::new()),
        })
    }

    pub fn rejecting(status: StatusCode, body: &str) -> Arc<Self> {
        Arc::new(Self {
            script: vec![json!({"state": "ACTIVE"})],
            submit_failure: Some((status, body.to_string())),
            polls: AtomicUsize::new(0),
            submissions: Mutex::new(Vec::new()),
        })
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }
}

async fn create_execution(
    State(fake): State<Arc<FakeWorkflows>>,
    Path(path): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let argument = body["argument"]
        .as_str()
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or(Value::Null);
    fake.submissions.lock().unwrap().push(Submission {
        path: path.clone(),
        authorization: headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        argument,
    });

    if let Some((status, message)) = &fake.submit_failure {
        return (*status, message.clone()).into_response();
    }
    Json(json!({
        "name": format!("{}/exec-1", path),
        "state": "ACTIVE"
    }))
    .into_response()
}

async fn get_execution(
    State(fake): State<Arc<FakeWorkflows>>,
    Path(path): Path<String>,
) -> Response {
    let index = fake.polls.fetch_add(1, Ordering::SeqCst);
    let step = fake
        .script
        .get(index)
        .or_else(|| fake.script.last())
        .cloned()
        .unwrap_or_else(|| json!({"state": "ACTIVE"}));

    let mut execution = json!({ "name": path });
    if let (Some(target), Some(fields)) = (execution.as_object_mut(), step.as_object()) {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }
    Json(execution).into_response()
}

/// Start the fake Executions API and return its base URL.
pub async fn spawn_workflows(fake: Arc<FakeWorkflows>) -> String {
    let router = Router::new()
        .route("/v1/{*path}", post(create_execution).get(get_execution))
        .with_state(fake);
    spawn(router).await
}

// ---------------------------------------------------------------------------
// Scoring API
// ---------------------------------------------------------------------------

pub struct FakeScoring {
    status: StatusCode,
    body: Value,
    claims: Mutex<Vec<String>>,
}

impl FakeScoring {
    pub fn new(status: StatusCode, body: Value) -> Arc<Self> {
        Arc::new(Self {
            status,
            body,
            claims: Mutex::new(Vec::new()),
        })
    }

    pub fn claims(&self) -> Vec<String> {
        self.claims.lock().unwrap().clone()
    }
}

async fn score(State(fake): State<Arc<FakeScoring>>, Json(body): Json<Value>) -> Response {
    if let Some(claim) = body["claim"].as_str() {
        fake.claims.lock().unwrap().push(claim.to_string());
    }
    (fake.status, Json(fake.body.clone())).into_response()
}

/// Start the fake scoring API and return the full scoring URL.
pub async fn spawn_scoring(fake: Arc<FakeScoring>) -> String {
    let router = Router::new().route("/score", post(score)).with_state(fake);
    format!("{}/score", spawn(router).await)
}

// ---------------------------------------------------------------------------
// Generative model API (generateContent)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ModelCall {
    /// Last path segment, e.g. `gemini-2.5-flash:generateContent`.
    pub target: String,
    pub api_key: Option<String>,
    pub mime_type: Option<String>,
    pub data: Option<String>,
}

pub struct FakeModel {
    status: StatusCode,
    reply: String,
    calls: Mutex<Vec<ModelCall>>,
}

impl FakeModel {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            status: StatusCode::OK,
            reply: text.to_string(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(status: StatusCode) -> Arc<Self> {
        Arc::new(Self {
            status,
            reply: String::new(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<ModelCall> {
        self.calls.lock().unwrap().clone()
    }
}

async fn generate_content(
    State(fake): State<Arc<FakeModel>>,
    Path(target): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let inline = &body["contents"][0]["parts"][1]["inline_data"];
    fake.calls.lock().unwrap().push(ModelCall {
        target,
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        mime_type: inline["mime_type"].as_str().map(str::to_string),
        data: inline["data"].as_str().map(str::to_string),
    });

    if !fake.status.is_success() {
        return (fake.status, Json(json!({"error": {"message": "internal"}}))).into_response();
    }
    Json(json!({
        "candidates": [{"content": {"parts": [{"text": fake.reply}]}}]
    }))
    .into_response()
}

/// Start the fake model API and return its base URL.
pub async fn spawn_model(fake: Arc<FakeModel>) -> String {
    let router = Router::new()
        .route("/v1beta/models/{target}", post(generate_content))
        .with_state(fake);
    spawn(router).await
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Serve `router` on a random local port and return its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind to random port");
    let addr = listener.local_addr().expect("get local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{}", addr)
}
