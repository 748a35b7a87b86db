//! Tracker service
//!
//! Ties the store to the engine: classify on insert, aggregate on read,
//! suggestions and analysis over the current snapshot. The CLI and the HTTP
//! server both go through this type.

use std::sync::{Arc, RwLock};

use chrono::Utc;
use tracing::info;

use crate::aggregate;
use crate::ai::AIClient;
use crate::analysis::SpendingAnalyst;
use crate::budgets;
use crate::categories::CategorySet;
use crate::classifier::Classifier;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{
    Budget, BudgetProgress, DashboardData, NewTransaction, Transaction, TransactionRecord,
};
use crate::prompts::{PromptLibrary, SharedPrompts};
use crate::suggest::BudgetAdvisor;

/// Which transactions to hand to the analyst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisScope {
    /// Only negative amounts
    #[default]
    ExpensesOnly,
    All,
}

#[derive(Clone)]
pub struct Tracker {
    db: Database,
    ai: Option<AIClient>,
    categories: CategorySet,
    classifier: Classifier,
    advisor: BudgetAdvisor,
    analyst: SpendingAnalyst,
}

impl Tracker {
    /// Build a tracker with the default category set and prompt library
    pub fn new(db: Database, ai: Option<AIClient>) -> Self {
        Self::with_parts(
            db,
            ai,
            CategorySet::default(),
            Arc::new(RwLock::new(PromptLibrary::new())),
        )
    }

    pub fn with_parts(
        db: Database,
        ai: Option<AIClient>,
        categories: CategorySet,
        prompts: SharedPrompts,
    ) -> Self {
        Self {
            classifier: Classifier::with_prompts(ai.clone(), categories.clone(), prompts.clone()),
            advisor: BudgetAdvisor::with_prompts(ai.clone(), prompts.clone()),
            analyst: SpendingAnalyst::with_prompts(ai.clone(), prompts),
            db,
            ai,
            categories,
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn ai(&self) -> Option<&AIClient> {
        self.ai.as_ref()
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    /// Validate, classify and store a new transaction
    pub async fn add_transaction(&self, input: NewTransaction) -> Result<Transaction> {
        let description = input.description.trim();
        if description.is_empty() {
            return Err(Error::Validation("Description is required".into()));
        }
        if !input.amount.is_finite() {
            return Err(Error::Validation("Amount must be a finite number".into()));
        }

        let category = self.classifier.category_for(description).await;

        let record = TransactionRecord {
            description: description.to_string(),
            amount: input.amount,
            category,
            notes: input
                .notes
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            date: input.date.unwrap_or_else(Utc::now),
        };

        let tx = self.db.insert_transaction(&record)?;
        info!(id = tx.id, category = %tx.category, "Transaction added");
        Ok(tx)
    }

    /// All transactions, newest first
    pub fn list_transactions(&self) -> Result<Vec<Transaction>> {
        self.db.list_transactions()
    }

    /// Permanently delete a transaction
    pub fn delete_transaction(&self, id: i64) -> Result<()> {
        if !self.db.delete_transaction(id)? {
            return Err(Error::NotFound(format!("Transaction {} not found", id)));
        }
        info!(id, "Transaction deleted");
        Ok(())
    }

    pub fn set_budget(&self, category: &str, amount: f64) -> Result<Budget> {
        budgets::set_budget(&self.db, category, amount)
    }

    pub fn list_budgets(&self) -> Result<Vec<Budget>> {
        self.db.list_budgets()
    }

    /// Progress for every stored budget against all transactions
    pub fn budget_progress(&self) -> Result<Vec<BudgetProgress>> {
        let budgets = self.db.list_budgets()?;
        let transactions = self.db.list_transactions()?;
        Ok(aggregate::all_budget_progress(&budgets, &transactions))
    }

    pub fn dashboard(&self) -> Result<DashboardData> {
        let transactions = self.db.list_transactions()?;
        Ok(aggregate::dashboard(&transactions, &self.categories))
    }

    /// Suggest a budget for a category from all recorded expenses
    pub async fn suggest_budget(&self, category: &str) -> Result<String> {
        let category = budgets::normalize_category(category)?;
        let transactions = self.db.list_transactions()?;
        self.advisor.suggest_budget(category, &transactions).await
    }

    /// Narrative analysis over the stored transactions
    pub async fn analyze_spending(&self, scope: AnalysisScope) -> Result<String> {
        let mut transactions = self.db.list_transactions()?;
        if scope == AnalysisScope::ExpensesOnly {
            transactions.retain(Transaction::is_expense);
        }
        self.analyst.analyze_spending(&transactions).await
    }
}
