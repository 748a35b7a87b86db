//! Ollama backend implementation
//!
//! HTTP client for the Ollama generate API. Uses the model router to pick a
//! model and timeout per task, and to fall back when a model keeps failing.

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

/// Ollama backend with model router integration
///
/// # Configuration
///
/// Pin models or timeouts per task in `~/.local/share/tally/config/models.toml`:
///
/// ```toml
/// [models.fast_classification]
/// model = "qwen2.5:1.5b"
/// timeout_secs = 10
///
/// [models.narrative]
/// model = "llama3.1:8b"
/// timeout_secs = 90
/// ```
#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    router: Arc<RwLock<ModelRouter>>,
    default_model: String,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    pub fn new(base_url: &str, default_model: &str) -> Self {
        Self::with_router(base_url, default_model, ModelRouter::default())
    }

    /// Create with a custom router
    pub fn with_router(base_url: &str, default_model: &str, router: ModelRouter) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            router: Arc::new(RwLock::new(router)),
            default_model: default_model.to_string(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OLLAMA_HOST").ok()?;
        let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
        Some(Self::new(&host, &model))
    }

    fn plan(&self, task: TaskType) -> Result<(String, Duration, u32)> {
        let router = self
            .router
            .read()
            .map_err(|_| Error::InvalidData("Failed to acquire model router lock".into()))?;
        Ok((
            router.resolve_model(task, &self.default_model),
            router.timeout_for_task(task),
            router.retries_for_task(task),
        ))
    }

    /// Record the failure and return the model for the next attempt
    fn next_model(&self, task: TaskType, failed: &str) -> String {
        match self.router.write() {
            Ok(mut router) => router.next_after_failure(task, &self.default_model, failed),
            Err(_) => failed.to_string(),
        }
    }

    fn record_success(&self, model: &str) {
        if let Ok(mut router) = self.router.write() {
            router.record_success(model);
        }
    }

    async fn send(&self, model: &str, prompt: &str, timeout: Duration) -> Result<String> {
        let request = OllamaRequest {
            model: model.to_string(),
            prompt: prompt.to_string(),
            stream: false,
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .timeout(timeout)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let ollama_response: OllamaResponse = response.json().await?;
        debug!(model = %model, "Ollama response: {}", ollama_response.response);

        Ok(ollama_response.response)
    }
}

/// Request to Ollama API
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
}

/// Response from Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[async_trait]
impl AIBackend for OllamaBackend {
    async fn generate(&self, task: TaskType, prompt: &str) -> Result<String> {
        let (mut model, timeout, retries) = self.plan(task)?;
        let mut attempt = 0;

        loop {
            match self.send(&model, prompt, timeout).await {
                Ok(text) => {
                    self.record_success(&model);
                    return Ok(text);
                }
                Err(e) => {
                    warn!(
                        model = %model,
                        task = task.as_str(),
                        attempt,
                        "Ollama request failed: {}",
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
        match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.default_model
    }

    fn host(&self) -> &str {
        &self.base_url
    }

    fn router_info(&self) -> RouterInfo {
        match self.router.read() {
            Ok(router) => RouterInfo::from_router(&router, &self.default_model),
            Err(_) => RouterInfo {
                default_model: self.default_model.clone(),
                fallback_model: None,
                task_models: vec![],
            },
        }
    }
}
