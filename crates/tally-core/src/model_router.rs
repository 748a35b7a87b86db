//! Model Router for task-based model selection
//!
//! Routes each kind of text-generation call to a configured model:
//! - Task-based routing (a small fast model for classification, a larger one for narrative)
//! - Per-task timeouts (an exceeded timeout counts as a backend failure)
//! - Health tracking (consecutive failures trigger fallback)
//! - Config-driven customization via override files
//!
//! ## Configuration Resolution
//!
//! 1. Check for override in data dir (~/.local/share/tally/config/models.toml)
//! 2. Fall back to embedded defaults (compiled into binary)

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/models.toml");

/// Task types for model routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskType {
    /// One-label answers (transaction category)
    FastClassification,
    /// Free text for people to read (budget suggestions, spending analysis)
    Narrative,
}

impl TaskType {
    /// Get the config key for this task type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FastClassification => "fast_classification",
            Self::Narrative => "narrative",
        }
    }

    pub fn all() -> &'static [TaskType] {
        &[Self::FastClassification, Self::Narrative]
    }

    fn from_config_key(key: &str) -> Option<Self> {
        match key {
            "fast_classification" => Some(Self::FastClassification),
            "narrative" => Some(Self::Narrative),
            _ => None,
        }
    }
}

/// Configuration for a specific task type
#[derive(Debug, Clone)]
pub struct TaskConfig {
    /// Model pinned for this task; `None` uses the backend's own model
    pub model: Option<String>,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            model: None,
            timeout: Duration::from_secs(30),
            max_retries: 1,
        }
    }
}

/// Health status of a model
#[derive(Debug, Default)]
struct ModelHealth {
    failures: u32,
    unhealthy_since: Option<Instant>,
}

/// Router configuration
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub default_model: String,
    pub default_timeout: Duration,
    pub default_retries: u32,
    /// Fallback model if primary fails
    pub fallback_model: Option<String>,
    pub tasks: HashMap<TaskType, TaskConfig>,
    /// Failure threshold before marking unhealthy
    pub failure_threshold: u32,
    /// Time to wait before retrying unhealthy model
    pub recovery_wait: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            default_model: "gemma3".to_string(),
            default_timeout: Duration::from_secs(30),
            default_retries: 1,
            fallback_model: Some("llama3.2".to_string()),
            tasks: HashMap::new(),
            failure_threshold: 3,
            recovery_wait: Duration::from_secs(300),
        }
    }
}

/// Model Router for task-based model selection
pub struct ModelRouter {
    config: RouterConfig,
    health: HashMap<String, ModelHealth>,
}

impl ModelRouter {
    /// Create a new model router, honouring the override file if present
    pub fn new() -> Result<Self> {
        let config = load_config(None)?;
        Ok(Self {
            config,
            health: HashMap::new(),
        })
    }

    /// Create with a custom config path
    pub fn with_config_path(path: PathBuf) -> Result<Self> {
        let config = load_config(Some(&path))?;
        Ok(Self {
            config,
            health: HashMap::new(),
        })
    }

    /// Create with an explicit configuration (for testing)
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            config,
            health: HashMap::new(),
        }
    }

    /// Get the model to use for a task type, using the configured default model
    pub fn model_for_task(&self, task: TaskType) -> String {
        self.resolve_model(task, &self.config.default_model)
    }

    /// Pick a model for a task given the backend's preferred model
    ///
    /// Order: the task's pinned model, then `preferred`, then the fallback.
    /// Unhealthy models are skipped; if nothing is healthy `preferred` is returned.
    pub fn resolve_model(&self, task: TaskType, preferred: &str) -> String {
        let pinned = self
            .config
            .tasks
            .get(&task)
            .and_then(|c| c.model.as_deref());

        if let Some(model) = pinned {
            if self.is_healthy(model) {
                return model.to_string();
            }
        }

        if self.is_healthy(preferred) {
            return preferred.to_string();
        }

        if let Some(ref fallback) = self.config.fallback_model {
            if self.is_healthy(fallback) {
                return fallback.clone();
            }
        }

        preferred.to_string()
    }

    /// Get the full task configuration
    pub fn config_for_task(&self, task: TaskType) -> TaskConfig {
        self.config
            .tasks
            .get(&task)
            .cloned()
            .unwrap_or_else(|| TaskConfig {
                model: None,
                timeout: self.config.default_timeout,
                max_retries: self.config.default_retries,
            })
    }

    pub fn timeout_for_task(&self, task: TaskType) -> Duration {
        self.config
            .tasks
            .get(&task)
            .map(|c| c.timeout)
            .unwrap_or(self.config.default_timeout)
    }

    pub fn retries_for_task(&self, task: TaskType) -> u32 {
        self.config
            .tasks
            .get(&task)
            .map(|c| c.max_retries)
            .unwrap_or(self.config.default_retries)
    }

    /// Record a successful call
    pub fn record_success(&mut self, model: &str) {
        let health = self.health.entry(model.to_string()).or_default();
        health.failures = 0;
        health.unhealthy_since = None;
    }

    /// Record a failed call, returns true if model is now unhealthy
    pub fn record_failure(&mut self, model: &str) -> bool {
        let threshold = self.config.failure_threshold;
        let health = self.health.entry(model.to_string()).or_default();
        health.failures += 1;

        if health.failures >= threshold {
            health.unhealthy_since.get_or_insert_with(Instant::now);
            true
        } else {
            false
        }
    }

    /// Record a failure of `failed` and pick the model for the next attempt
    ///
    /// When routing would land on the same model again, the fallback is used
    /// straight away; without a fallback the same model is retried.
    pub fn next_after_failure(&mut self, task: TaskType, preferred: &str, failed: &str) -> String {
        self.record_failure(failed);
        let next = self.resolve_model(task, preferred);
        if next != failed {
            return next;
        }
        self.config
            .fallback_model
            .clone()
            .unwrap_or(next)
    }

    /// Check if a model is considered healthy
    ///
    /// An unhealthy model becomes eligible again once `recovery_wait` has passed.
    pub fn is_healthy(&self, model: &str) -> bool {
        match self.health.get(model) {
            Some(health) if health.failures >= self.config.failure_threshold => health
                .unhealthy_since
                .is_some_and(|since| since.elapsed() >= self.config.recovery_wait),
            _ => true,
        }
    }

    pub fn fallback_model(&self) -> Option<&str> {
        self.config.fallback_model.as_deref()
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}

impl Default for ModelRouter {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::with_config(RouterConfig::default()))
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("config").join("models.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&PathBuf>) -> Result<RouterConfig> {
    let path = override_path.cloned().or_else(default_config_path);

    let content = match path {
        Some(path) if path.exists() => fs::read_to_string(&path)
            .map_err(|e| Error::InvalidData(format!("Failed to read config: {}", e)))?,
        _ => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    defaults: Option<RawDefaults>,
    models: Option<HashMap<String, RawTaskConfig>>,
    health: Option<RawHealth>,
}

#[derive(Debug, Deserialize)]
struct RawDefaults {
    model: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    fallback_model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTaskConfig {
    model: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawHealth {
    failure_threshold: Option<u32>,
    recovery_wait_secs: Option<u64>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<RouterConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::InvalidData(format!("Invalid config TOML: {}", e)))?;

    let mut config = RouterConfig::default();

    if let Some(defaults) = raw.defaults {
        if let Some(model) = defaults.model {
            config.default_model = model;
        }
        if let Some(timeout) = defaults.timeout_secs {
            config.default_timeout = Duration::from_secs(timeout);
        }
        if let Some(retries) = defaults.max_retries {
            config.default_retries = retries;
        }
        if let Some(fallback) = defaults.fallback_model {
            config.fallback_model = Some(fallback);
        }
    }

    if let Some(models) = raw.models {
        for (task_name, task_config) in models {
            let Some(task) = TaskType::from_config_key(&task_name) else {
                tracing::debug!(task = %task_name, "Ignoring unknown task type in model config");
                continue;
            };

            config.tasks.insert(
                task,
                TaskConfig {
                    model: task_config.model,
                    timeout: task_config
                        .timeout_secs
                        .map(Duration::from_secs)
                        .unwrap_or(config.default_timeout),
                    max_retries: task_config.max_retries.unwrap_or(config.default_retries),
                },
            );
        }
    }

    if let Some(health) = raw.health {
        if let Some(threshold) = health.failure_threshold {
            config.failure_threshold = threshold;
        }
        if let Some(wait) = health.recovery_wait_secs {
            config.recovery_wait = Duration::from_secs(wait);
        }
    }

    Ok(config)
}
