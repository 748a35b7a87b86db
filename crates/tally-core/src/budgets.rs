//! Budget store rules
//!
//! One budget per category, created on first set and overwritten in place
//! after that. Validation runs before the store is touched.

use tracing::info;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::Budget;

/// Reject amounts that are negative or not finite
pub fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() {
        return Err(Error::Validation("Budget amount must be a finite number".into()));
    }
    if amount < 0.0 {
        return Err(Error::Validation("Budget amount cannot be negative".into()));
    }
    Ok(())
}

/// Normalise a category key, rejecting blanks
pub fn normalize_category(category: &str) -> Result<&str> {
    let category = category.trim();
    if category.is_empty() {
        return Err(Error::Validation("Budget category is required".into()));
    }
    Ok(category)
}

/// Create or replace the budget for a category
///
/// The write is a single upsert keyed on the category, so concurrent callers
/// on the same category cannot interleave; the last writer wins.
pub fn set_budget(db: &Database, category: &str, amount: f64) -> Result<Budget> {
    validate_amount(amount)?;
    let category = normalize_category(category)?;

    let budget = db.upsert_budget(category, amount)?;
    info!(category, amount, "Budget set");
    Ok(budget)
}
