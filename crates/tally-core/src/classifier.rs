//! Transaction category classifier
//!
//! Asks the text-generation backend to pick one label from the category set.
//! Classification never fails from the caller's point of view: anything other
//! than an exact label match degrades to the fallback category, so recording a
//! transaction does not depend on the backend being up.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::ai::{AIBackend, AIClient};
use crate::categories::CategorySet;
use crate::model_router::TaskType;
use crate::prompts::{render_shared, PromptId, PromptLibrary, SharedPrompts};

/// Outcome of a classification attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The backend answered with an exact label from the set
    Classified(String),
    /// No usable answer; carries the reason for logging
    Failed(String),
}

impl Classification {
    /// The label to store, using `fallback` when classification failed
    pub fn label_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            Self::Classified(label) => label,
            Self::Failed(_) => fallback,
        }
    }
}

/// Maps free-text descriptions to category labels
#[derive(Clone)]
pub struct Classifier {
    ai: Option<AIClient>,
    categories: CategorySet,
    prompts: SharedPrompts,
}

impl Classifier {
    pub fn new(ai: Option<AIClient>, categories: CategorySet) -> Self {
        Self::with_prompts(
            ai,
            categories,
            Arc::new(RwLock::new(PromptLibrary::new())),
        )
    }

    /// Share a prompt library with the other engine components
    pub fn with_prompts(ai: Option<AIClient>, categories: CategorySet, prompts: SharedPrompts) -> Self {
        Self {
            ai,
            categories,
            prompts,
        }
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    /// Classify a description, reporting why when no label was chosen
    pub async fn classify(&self, description: &str) -> Classification {
        let Some(ref ai) = self.ai else {
            return Classification::Failed("no AI backend configured".into());
        };

        let categories = self.categories.joined();
        let mut vars = HashMap::new();
        vars.insert("description", description);
        vars.insert("categories", categories.as_str());

        let prompt = match render_shared(&self.prompts, PromptId::ClassifyTransaction, &vars) {
            Ok(p) => p,
            Err(e) => return Classification::Failed(format!("prompt error: {}", e)),
        };

        match ai.generate(TaskType::FastClassification, &prompt).await {
            Ok(text) => {
                let answer = text.trim();
                if self.categories.contains(answer) {
                    debug!(description, category = answer, "Classified transaction");
                    Classification::Classified(answer.to_string())
                } else {
                    Classification::Failed(format!("unexpected answer: {:?}", answer))
                }
            }
            Err(e) => Classification::Failed(e.to_string()),
        }
    }

    /// Category label for a description; always a member of the set
    pub async fn category_for(&self, description: &str) -> String {
        match self.classify(description).await {
            Classification::Classified(label) => label,
            Classification::Failed(reason) => {
                warn!(
                    description,
                    fallback = self.categories.fallback(),
                    "Classification failed: {}",
                    reason
                );
                self.categories.fallback().to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;

    fn classifier(mock: MockBackend) -> Classifier {
        Classifier::with_prompts(
            Some(mock.into()),
            CategorySet::default(),
            Arc::new(RwLock::new(PromptLibrary::embedded_only())),
        )
    }

    #[tokio::test]
    async fn test_exact_label_is_accepted() {
        let c = classifier(MockBackend::new());
        assert_eq!(
            c.classify("WHOLEFDS MKT #10234").await,
            Classification::Classified("Groceries".into())
        );
    }

    #[tokio::test]
    async fn test_response_is_trimmed() {
        let c = classifier(MockBackend::with_response("\n  Health & Wellness  \n"));
        assert_eq!(c.category_for("CVS").await, "Health & Wellness");
    }

    #[tokio::test]
    async fn test_out_of_set_answer_falls_back() {
        for answer in ["Travel", "groceries", "Groceries.", "I think Shopping", ""] {
            let c = classifier(MockBackend::with_response(answer));
            assert!(matches!(c.classify("x").await, Classification::Failed(_)));
            assert_eq!(c.category_for("x").await, "Other");
        }
    }

    #[tokio::test]
    async fn test_backend_failure_falls_back() {
        let c = classifier(MockBackend::failing("timeout"));
        assert_eq!(c.category_for("NETFLIX.COM").await, "Other");
    }

    #[tokio::test]
    async fn test_no_backend_falls_back() {
        let c = Classifier::new(None, CategorySet::default());
        let result = c.classify("anything").await;
        assert!(matches!(result, Classification::Failed(_)));
        assert_eq!(result.label_or("Other"), "Other");
    }

    #[tokio::test]
    async fn test_garbled_input_always_yields_member() {
        let c = classifier(MockBackend::new());
        let inputs = ["", "   ", "\u{0}\u{1}", "💸💸💸", "\"", "{{description}}", "a\nb\tc"];
        for input in inputs {
            let label = c.category_for(input).await;
            assert!(c.categories().contains(&label), "{:?} -> {:?}", input, label);
        }
    }

    #[tokio::test]
    async fn test_custom_set_is_respected() {
        let c = Classifier::with_prompts(
            Some(MockBackend::with_response("Groceries").into()),
            CategorySet::new(["Rent", "Fun"], "Misc"),
            Arc::new(RwLock::new(PromptLibrary::embedded_only())),
        );
        assert_eq!(c.category_for("Kroger").await, "Misc");
    }
}
