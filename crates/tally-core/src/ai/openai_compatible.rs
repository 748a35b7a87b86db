//! OpenAI-compatible backend implementation
//!
//! Works with any server that implements the OpenAI chat completions API:
//! - vLLM (http://localhost:8000)
//! - LocalAI (http://localhost:8080)
//! - llama-server / llama.cpp (http://localhost:8080)
//! - Docker Model Runner (http://localhost:12434)
//!
//! # Configuration
//!
//! Environment variables:
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-3.5-turbo)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model_router::{ModelRouter, TaskType};

use super::types::RouterInfo;
use super::AIBackend;

/// OpenAI-compatible backend
///
/// Talks to `/v1/chat/completions`, sending the rendered prompt as a single
/// user message.
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    router: Arc<RwLock<ModelRouter>>,
}

impl OpenAICompatibleBackend {
    /// Create a new OpenAI-compatible backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
            router: Arc::new(RwLock::new(ModelRouter::default())),
        }
    }

    /// Create with a custom router
    pub fn with_router(base_url: &str, model: &str, router: ModelRouter) -> Self {
        Self {
            router: Arc::new(RwLock::new(router)),
            ..Self::new(base_url, model)
        }
    }

    /// Create with an API key
    pub fn with_api_key(base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            api_key: Some(api_key.to_string()),
            ..Self::new(base_url, model)
        }
    }

    /// Create from environment variables
    ///
    /// Required: `OPENAI_COMPATIBLE_HOST`
    /// Optional: `OPENAI_COMPATIBLE_MODEL` (default: gpt-3.5-turbo)
    /// Optional: `OPENAI_COMPATIBLE_API_KEY`
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OPENAI_COMPATIBLE_HOST").ok()?;
        let model = std::env::var("OPENAI_COMPATIBLE_MODEL")
            .unwrap_or_else(|_| "gpt-3.5-turbo".to_string());

        let mut backend = Self::new(&host, &model);
        backend.api_key = std::env::var("OPENAI_COMPATIBLE_API_KEY").ok();
        Some(backend)
    }

    fn plan(&self, task: TaskType) -> Result<(String, Duration, u32)> {
        let router = self
            .router
            .read()
            .map_err(|_| Error::InvalidData("Failed to acquire model router lock".into()))?;
        Ok((
            router.resolve_model(task, &self.model),
            router.timeout_for_task(task),
            router.retries_for_task(task),
        ))
    }

    fn record_success(&self, model: &str) {
        if let Ok(mut router) = self.router.write() {
            router.record_success(model);
        }
    }

    /// Record the failure and return the model for the next attempt
    fn next_model(&self, task: TaskType, failed: &str) -> String {
        match self.router.write() {
            Ok(mut router) => router.next_after_failure(task, &self.model, failed),
            Err(_) => failed.to_string(),
        }
    }

    /// Make a chat completion request
    async fn chat_completion(&self, model: &str, prompt: &str, timeout: Duration) -> Result<String> {
        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: Some(0.1),
            stream: false,
        };

        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .timeout(timeout)
            .json(&request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Ai(format!("OpenAI API error {}: {}", status, body)));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;
        debug!(model = %model, "Chat completion received");

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Ai("No response from OpenAI API".into()))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl AIBackend for OpenAICompatibleBackend {
    async fn generate(&self, task: TaskType, prompt: &str) -> Result<String> {
        let (mut model, timeout, retries) = self.plan(task)?;
        let mut attempt = 0;

        loop {
            match self.chat_completion(&model, prompt, timeout).await {
                Ok(text) => {
                    self.record_success(&model);
                    return Ok(text);
                }
                Err(e) => {
                    warn!(
                        model = %model,
                        task = task.as_str(),
                        attempt,
                        "Chat completion failed: {}",
                        e
                    );
                    let next = self.next_model(task, &model);
                    if attempt >= retries {
                        return Err(e);
                    }
                    model = next;
                    attempt += 1;
                }
            }
        }
    }

    async fn health_check(&self) -> bool {
        // /v1/models is standard; /health covers LocalAI and Docker Model Runner
        for path in ["/v1/models", "/health"] {
            if let Ok(resp) = self
                .http_client
                .get(format!("{}{}", self.base_url, path))
                .send()
                .await
            {
                if resp.status().is_success() {
                    return true;
                }
            }
        }
        false
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }

    fn router_info(&self) -> RouterInfo {
        match self.router.read() {
            Ok(router) => RouterInfo::from_router(&router, &self.model),
            Err(_) => RouterInfo {
                default_model: self.model.clone(),
                fallback_model: None,
                task_models: vec![],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_router::RouterConfig;
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    async fn start_chat_server(reply: &'static str) -> String {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |Json(body): Json<Value>| async move {
                assert_eq!(body["messages"][0]["role"], "user");
                Json(json!({
                    "choices": [{ "message": { "role": "assistant", "content": reply } }]
                }))
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_chat_completion_roundtrip() {
        let url = start_chat_server(" Groceries ").await;
        let backend = OpenAICompatibleBackend::with_api_key(&url, "local-model", "sk-test");

        let text = backend
            .generate(TaskType::FastClassification, "classify this")
            .await
            .unwrap();
        assert_eq!(text, " Groceries ");
        assert_eq!(backend.model(), "local-model");
    }

    async fn start_chat_server_rejecting(model: &'static str) -> String {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |Json(body): Json<Value>| async move {
                if body["model"] == model {
                    return Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
                }
                Ok(Json(json!({
                    "choices": [{ "message": { "role": "assistant", "content": body["model"] } }]
                })))
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_retry_switches_to_fallback_before_threshold() {
        let url = start_chat_server_rejecting("broken").await;
        let backend = OpenAICompatibleBackend::with_router(
            &url,
            "broken",
            ModelRouter::with_config(RouterConfig {
                fallback_model: Some("backup".to_string()),
                default_retries: 1,
                failure_threshold: 3,
                ..Default::default()
            }),
        );

        let text = backend
            .generate(TaskType::FastClassification, "classify this")
            .await
            .unwrap();
        assert_eq!(text, "backup");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_ai_failure() {
        let backend = OpenAICompatibleBackend::new("http://127.0.0.1:1", "m");
        let err = backend
            .generate(TaskType::Narrative, "hello")
            .await
            .unwrap_err();
        assert!(err.is_ai_failure());
        assert!(!backend.health_check().await);
    }
}
