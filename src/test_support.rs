//! In-process document backend for binary tests.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::Multipart;
use axum::routing::{get, post};
use client::net::api::{HttpBackend, HttpBackendConfig};
use client::state::session::Session;
use serde_json::{Value, json};

pub const SKY_TEXT: &str = "The sky is blue. The report was written by Ada.";

/// Serves every route with canned answers and returns its base URL.
pub async fn spawn_backend() -> String {
    let router = Router::new()
        .route("/", get(|| async { Json(json!({ "status": "ok" })) }))
        .route("/upload", post(upload))
        .route("/ask", post(ask))
        .route("/challenge", post(challenge));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn session_for(base_url: String) -> Session {
    let backend = HttpBackend::new(HttpBackendConfig { base_url, ..HttpBackendConfig::default() }).unwrap();
    Session::new(Arc::new(backend))
}

async fn upload(mut multipart: Multipart) -> Json<Value> {
    let field = multipart.next_field().await.unwrap().unwrap();
    let file_name = field.file_name().unwrap_or_default().to_owned();
    let body = String::from_utf8(field.bytes().await.unwrap().to_vec()).unwrap();
    Json(json!({
        "documentText": body,
        "summary": format!("A short summary of {file_name}."),
    }))
}

async fn ask(Json(body): Json<Value>) -> Json<Value> {
    let question = body["question"].as_str().unwrap_or_default();
    let last_line = question.lines().last().unwrap_or_default();
    Json(json!({
        "answer": format!("Answer to: {last_line}"),
        "justification": "Paragraph 1.",
    }))
}

/// Question generation and grading share this route; grading bodies carry
/// `answers`.
async fn challenge(Json(body): Json<Value>) -> Json<Value> {
    if body.get("answers").is_none() {
        return Json(json!({
            "questions": ["Q1: What colour is the sky?", "Q2. Who wrote the report?"],
        }));
    }
    Json(json!({
        "score": 50,
        "feedback": {
            "q1": { "correct": true, "explanation": "The text says blue." },
            "q2": { "correct": false, "explanation": "See the last sentence.", "correctAnswer": "Ada" },
        },
    }))
}
