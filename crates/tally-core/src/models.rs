//! Domain models for Tally

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::categories::FALLBACK_CATEGORY;

/// A single money movement. Negative amounts are expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub notes: String,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }
}

/// Input for creating a transaction (before classification)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTransaction {
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub notes: Option<String>,
    /// Defaults to the insertion time
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl NewTransaction {
    pub fn new(description: &str, amount: f64) -> Self {
        Self {
            description: description.to_string(),
            amount,
            notes: None,
            date: None,
        }
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}

/// A validated, classified transaction ready for insertion
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub notes: String,
    pub date: DateTime<Utc>,
}

impl TransactionRecord {
    /// Record with the default category, for callers that skip classification
    pub fn unclassified(description: &str, amount: f64) -> Self {
        Self {
            description: description.trim().to_string(),
            amount,
            category: FALLBACK_CATEGORY.to_string(),
            notes: String::new(),
            date: Utc::now(),
        }
    }
}

/// Spending ceiling for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub category: String,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Total spend in one category (always positive)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Income and expense totals across all transactions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeExpenseSummary {
    pub income: f64,
    pub expenses: f64,
}

/// Spend against a budget for one category
///
/// `progress_percent` is not clamped and may exceed 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetProgress {
    pub category: String,
    pub spent: f64,
    pub budget_amount: f64,
    pub progress_percent: f64,
    pub is_over_budget: bool,
}

/// Everything the dashboard charts need
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub spending_by_category: Vec<CategoryTotal>,
    pub income_vs_expense: IncomeExpenseSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transaction_builder() {
        let tx = NewTransaction::new("Coffee", -4.5).with_notes("oat milk");
        assert_eq!(tx.description, "Coffee");
        assert_eq!(tx.notes.as_deref(), Some("oat milk"));
        assert!(tx.date.is_none());
    }

    #[test]
    fn test_new_transaction_deserialize_defaults() {
        let tx: NewTransaction =
            serde_json::from_str(r#"{"description": "Salary", "amount": 2500}"#).unwrap();
        assert_eq!(tx.amount, 2500.0);
        assert!(tx.notes.is_none());
        assert!(tx.date.is_none());
    }

    #[test]
    fn test_unclassified_record() {
        let record = TransactionRecord::unclassified("  Bus fare ", -2.75);
        assert_eq!(record.description, "Bus fare");
        assert_eq!(record.category, "Other");
        assert!(record.notes.is_empty());
    }
}
