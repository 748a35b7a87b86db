//! Budget suggestions from past spending
//!
//! Backend failures propagate to the caller here, unlike analysis which
//! degrades to a canned sentence.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::ai::{AIBackend, AIClient};
use crate::aggregate::spent_in_category;
use crate::error::{Error, Result};
use crate::model_router::TaskType;
use crate::models::Transaction;
use crate::prompts::{render_shared, PromptId, PromptLibrary, SharedPrompts};

/// Message returned when a category has no expenses to learn from
pub fn no_history_message(category: &str) -> String {
    format!(
        "No spending history for {}. Set a budget manually to start!",
        category
    )
}

/// Suggests a monthly budget for a category
#[derive(Clone)]
pub struct BudgetAdvisor {
    ai: Option<AIClient>,
    prompts: SharedPrompts,
}

impl BudgetAdvisor {
    pub fn new(ai: Option<AIClient>) -> Self {
        Self::with_prompts(ai, Arc::new(RwLock::new(PromptLibrary::new())))
    }

    pub fn with_prompts(ai: Option<AIClient>, prompts: SharedPrompts) -> Self {
        Self { ai, prompts }
    }

    /// Suggest a budget from the expenses recorded for `category`
    ///
    /// Returns the backend's trimmed text as-is. With no matching expenses the
    /// backend is not called at all.
    pub async fn suggest_budget(&self, category: &str, transactions: &[Transaction]) -> Result<String> {
        let has_history = transactions
            .iter()
            .any(|t| t.category == category && t.is_expense());
        if !has_history {
            debug!(category, "No spending history, skipping suggestion");
            return Ok(no_history_message(category));
        }

        let ai = self
            .ai
            .as_ref()
            .ok_or_else(|| Error::Ai("AI backend not configured".into()))?;

        let total_spent = format!("{:.2}", spent_in_category(transactions, category));
        let mut vars = HashMap::new();
        vars.insert("category", category);
        vars.insert("total_spent", total_spent.as_str());
        let prompt = render_shared(&self.prompts, PromptId::SuggestBudget, &vars)?;

        let text = ai.generate(TaskType::Narrative, &prompt).await?;
        Ok(text.trim().to_string())
    }
}
