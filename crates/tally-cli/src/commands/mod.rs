//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `budgets` - Budget commands (list, set, suggest, progress)
//! - `core` - Init and shared utilities (open_db, open_tracker)
//! - `export` - Transaction export
//! - `prompts` - Prompt library management commands
//! - `reports` - Dashboard, analysis and category listing
//! - `serve` - Web server command
//! - `status` - Database and AI backend status
//! - `transactions` - Transaction commands (add, list, delete)

pub mod budgets;
pub mod core;
pub mod export;
pub mod prompts;
pub mod reports;
pub mod serve;
pub mod status;
pub mod transactions;

// Re-export command functions for main.rs
pub use budgets::*;
pub use core::*;
pub use export::*;
pub use prompts::*;
pub use reports::*;
pub use serve::*;
pub use status::*;
pub use transactions::*;

use anyhow::{Context, Result};
use chrono::NaiveDate;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Colored amount: red for expenses, green for income
pub fn format_amount(amount: f64) -> String {
    if amount < 0.0 {
        format!("\x1b[31m${:.2}\x1b[0m", amount.abs())
    } else {
        format!("\x1b[32m+${:.2}\x1b[0m", amount)
    }
}

/// Parse a YYYY-MM-DD date argument
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}' (expected YYYY-MM-DD)", s))
}
