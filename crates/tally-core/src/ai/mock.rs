//! Mock backend for testing
//!
//! Answers from simple keyword heuristics, or from a scripted response or
//! failure. Counts calls so tests can check the backend was never reached.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::model_router::TaskType;

use super::types::RouterInfo;
use super::AIBackend;

#[derive(Clone, Debug, Default)]
enum Script {
    #[default]
    Heuristic,
    Respond(String),
    Fail(String),
}

/// Mock AI backend for testing
#[derive(Clone, Debug)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    script: Script,
    calls: Arc<AtomicUsize>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend (healthy, heuristic answers)
    pub fn new() -> Self {
        Self {
            healthy: true,
            script: Script::Heuristic,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Always answer with `text`, whatever the prompt
    pub fn with_response(text: &str) -> Self {
        Self {
            script: Script::Respond(text.to_string()),
            ..Self::new()
        }
    }

    /// Fail every call with an AI error
    pub fn failing(message: &str) -> Self {
        Self {
            script: Script::Fail(message.to_string()),
            ..Self::new()
        }
    }

    /// Number of `generate` calls so far (shared between clones)
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// The first double-quoted span of a prompt, or the whole prompt
fn quoted(prompt: &str) -> &str {
    prompt
        .split('"')
        .nth(1)
        .filter(|_| prompt.matches('"').count() >= 2)
        .unwrap_or(prompt)
}

/// Pick a label by well-known merchant keywords in the quoted description
fn heuristic_category(prompt: &str) -> &'static str {
    let upper = quoted(prompt).to_uppercase();
    let has = |words: &[&str]| words.iter().any(|w| upper.contains(w));

    if has(&["PAYROLL", "SALARY", "DIRECT DEP"]) {
        "Income"
    } else if has(&["WHOLE FOODS", "WHOLEFDS", "TRADER JOE", "KROGER", "SAFEWAY"]) {
        "Groceries"
    } else if has(&["UBER", "LYFT", "SHELL", "CHEVRON", "METRO"]) {
        "Transportation"
    } else if has(&["NETFLIX", "SPOTIFY", "CINEMA", "STEAM"]) {
        "Entertainment"
    } else if has(&["STARBUCKS", "CHIPOTLE", "RESTAURANT", "PIZZA"]) {
        "Food & Dining"
    } else if has(&["RENT", "ELECTRIC", "COMCAST", "WATER BILL"]) {
        "Housing & Utilities"
    } else if has(&["AMAZON", "TARGET", "IKEA"]) {
        "Shopping"
    } else if has(&["PHARMACY", "CVS", "GYM", "DENTAL"]) {
        "Health & Wellness"
    } else {
        "Other"
    }
}

fn heuristic_narrative(prompt: &str) -> String {
    if prompt.contains("monthly budget amount") {
        "A good starting point could be $450.".to_string()
    } else {
        "Nice work keeping track of your spending! Most of your money went to a couple of \
         categories. Try setting a weekly limit on the biggest one."
            .to_string()
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn generate(&self, task: TaskType, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.script {
            Script::Respond(text) => Ok(text.clone()),
            Script::Fail(message) => Err(Error::Ai(message.clone())),
            Script::Heuristic => Ok(match task {
                TaskType::FastClassification => heuristic_category(prompt).to_string(),
                TaskType::Narrative => heuristic_narrative(prompt),
            }),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }

    fn router_info(&self) -> RouterInfo {
        RouterInfo {
            default_model: "mock".to_string(),
            fallback_model: None,
            task_models: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_heuristic_classification() {
        let mock = MockBackend::new();
        let label = mock
            .generate(
                TaskType::FastClassification,
                "Based on the transaction description \"WHOLEFDS MKT 10234\"",
            )
            .await
            .unwrap();
        assert_eq!(label, "Groceries");

        let label = mock
            .generate(TaskType::FastClassification, "\"ACME PAYROLL\"")
            .await
            .unwrap();
        assert_eq!(label, "Income");
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_mock_failing() {
        let mock = MockBackend::failing("quota exceeded");
        let err = mock
            .generate(TaskType::Narrative, "prompt")
            .await
            .unwrap_err();
        assert!(err.is_ai_failure());
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_call_count_shared_between_clones() {
        let mock = MockBackend::with_response("ok");
        let clone = mock.clone();
        clone.generate(TaskType::Narrative, "x").await.unwrap();
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        assert!(MockBackend::new().health_check().await);
        assert!(!MockBackend::unhealthy().health_check().await);
    }
}
