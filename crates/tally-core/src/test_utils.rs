//! Test utilities for tally-core
//!
//! A mock Ollama server that answers the three prompt shapes in `prompts/`
//! with canned text, for backend and end-to-end tests.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Mock Ollama server for testing and development
pub struct MockOllamaServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

#[derive(Clone, Default)]
struct MockState {
    rejected_model: Option<Arc<str>>,
}

impl MockOllamaServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        Self::spawn(MockState::default()).await
    }

    /// Start a server that answers 500 for one model name
    pub async fn start_rejecting_model(model: &str) -> Self {
        Self::spawn(MockState {
            rejected_model: Some(model.into()),
        })
        .await
    }

    async fn spawn(state: MockState) -> Self {
        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOllamaServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ollama tags endpoint response (health check)
async fn handle_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        models: vec![ModelInfo {
            name: "llama3.2:latest".to_string(),
            modified_at: "2024-01-01T00:00:00Z".to_string(),
            size: 2_000_000_000,
        }],
    })
}

/// Ollama generate endpoint
///
/// The prompt shape decides the answer; these phrases come from `prompts/*.md`.
async fn handle_generate(
    State(state): State<MockState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, StatusCode> {
    if state
        .rejected_model
        .as_deref()
        .is_some_and(|m| m == request.model)
    {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let response = if request.prompt.contains("categorize it into one of the following") {
        classify_mock(&request.prompt).to_string()
    } else if request.prompt.contains("monthly budget amount") {
        suggest_mock(&request.prompt)
    } else {
        "Great job tracking your money! Food & Dining and Groceries are your biggest \
         categories. Cooking at home two more nights a week could save you a lot."
            .to_string()
    };

    Ok(Json(GenerateResponse {
        model: request.model,
        response,
        done: true,
    }))
}

/// Text between the first pair of double quotes
fn quoted(prompt: &str) -> &str {
    prompt.split('"').nth(1).unwrap_or_default()
}

fn classify_mock(prompt: &str) -> &'static str {
    let d = quoted(prompt).to_uppercase();

    if d.contains("UBER") || d.contains("LYFT") {
        "Transportation"
    } else if d.contains("WHOLE FOODS") || d.contains("TRADER JOE") {
        "Groceries"
    } else if d.contains("NETFLIX") {
        " Entertainment\n"
    } else if d.contains("PAYROLL") {
        "Income"
    } else if d.contains("RAMBLE") {
        // Off-list chatter to exercise the fallback
        "I think this is probably Shopping!"
    } else {
        "Other"
    }
}

/// Suggest 90% of the quoted spend, rounded down to a multiple of ten
fn suggest_mock(prompt: &str) -> String {
    let spent = prompt
        .split('$')
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|n| n.parse::<f64>().ok())
        .unwrap_or(0.0);
    let target = ((spent * 0.9) / 10.0).floor() * 10.0;
    format!("A good starting point could be ${:.0}.", target)
}

#[derive(Debug, Serialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    name: String,
    modified_at: String,
    size: u64,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}
