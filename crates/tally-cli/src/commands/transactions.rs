//! Transaction command implementations

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use tally_core::{NewTransaction, Transaction, Tracker};

use super::{format_amount, parse_date, truncate};

/// Classify and store a transaction
pub async fn cmd_add(
    tracker: &Tracker,
    description: &str,
    amount: f64,
    notes: Option<&str>,
    date: Option<&str>,
) -> Result<Transaction> {
    let mut input = NewTransaction::new(description, amount);
    if let Some(notes) = notes {
        input = input.with_notes(notes);
    }
    if let Some(date) = date {
        let day = parse_date(date)?;
        // Midday keeps the calendar date stable across time zones
        let at = day.and_hms_opt(12, 0, 0).context("Invalid time of day")?;
        input = input.with_date(Utc.from_utc_datetime(&at));
    }

    let tx = tracker.add_transaction(input).await?;

    println!(
        "✅ Added #{} {} │ {} │ {}",
        tx.id,
        tx.date.format("%Y-%m-%d"),
        format_amount(tx.amount),
        tx.category
    );
    if tx.category == tracker.categories().fallback() && tracker.ai().is_none() {
        println!("   💡 Tip: Set OLLAMA_HOST for automatic categorization");
    }

    Ok(tx)
}

pub fn cmd_transactions_list(tracker: &Tracker, limit: usize) -> Result<()> {
    let transactions = tracker.list_transactions()?;

    if transactions.is_empty() {
        println!("No transactions found. Add one with:");
        println!("  tally add \"WHOLE FOODS\" -- -54.20");
        return Ok(());
    }

    println!();
    println!("📝 Recent Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions.iter().take(limit) {
        println!(
            "   [{:>4}] {} │ {:>10} │ {:<20} │ {}",
            tx.id,
            tx.date.format("%Y-%m-%d"),
            format_amount(tx.amount),
            truncate(&tx.category, 20),
            truncate(&tx.description, 35)
        );
    }

    if transactions.len() > limit {
        println!();
        println!(
            "   ... {} more (use --limit to show more)",
            transactions.len() - limit
        );
    }

    Ok(())
}

pub fn cmd_transactions_delete(tracker: &Tracker, id: i64) -> Result<()> {
    tracker.delete_transaction(id)?;
    println!("🗑️  Deleted transaction {}", id);
    Ok(())
}
