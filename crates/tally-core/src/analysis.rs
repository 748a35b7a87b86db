//! Narrative spending analysis
//!
//! Best effort: if the backend fails the caller gets a fixed apology instead
//! of an error. Only an empty input is rejected.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::warn;

use crate::ai::{AIBackend, AIClient};
use crate::error::{Error, Result};
use crate::model_router::TaskType;
use crate::models::Transaction;
use crate::prompts::{render_shared, PromptId, PromptLibrary, SharedPrompts};

/// Returned when the backend cannot produce an analysis
pub const ANALYSIS_FALLBACK: &str = "Sorry, I was unable to analyze your spending at this time.";

/// One prompt line per transaction: `- description: $amount`
pub fn transaction_lines(transactions: &[Transaction]) -> String {
    transactions
        .iter()
        .map(|t| format!("- {}: ${:.2}", t.description, t.amount))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Writes short coaching summaries of a transaction list
#[derive(Clone)]
pub struct SpendingAnalyst {
    ai: Option<AIClient>,
    prompts: SharedPrompts,
}

impl SpendingAnalyst {
    pub fn new(ai: Option<AIClient>) -> Self {
        Self::with_prompts(ai, Arc::new(RwLock::new(PromptLibrary::new())))
    }

    pub fn with_prompts(ai: Option<AIClient>, prompts: SharedPrompts) -> Self {
        Self { ai, prompts }
    }

    pub async fn analyze_spending(&self, transactions: &[Transaction]) -> Result<String> {
        if transactions.is_empty() {
            return Err(Error::Validation(
                "No transactions provided for analysis.".into(),
            ));
        }

        match self.generate(transactions).await {
            Ok(text) => Ok(text.trim().to_string()),
            Err(e) => {
                warn!(count = transactions.len(), "Spending analysis failed: {}", e);
                Ok(ANALYSIS_FALLBACK.to_string())
            }
        }
    }

    async fn generate(&self, transactions: &[Transaction]) -> Result<String> {
        let ai = self
            .ai
            .as_ref()
            .ok_or_else(|| Error::Ai("AI backend not configured".into()))?;

        let lines = transaction_lines(transactions);
        let mut vars = HashMap::new();
        vars.insert("transactions", lines.as_str());
        let prompt = render_shared(&self.prompts, PromptId::AnalyzeSpending, &vars)?;

        ai.generate(TaskType::Narrative, &prompt).await
    }
}
