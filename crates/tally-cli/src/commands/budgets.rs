//! Budget command implementations

use anyhow::Result;
use tally_core::Tracker;

pub fn cmd_budgets_list(tracker: &Tracker) -> Result<()> {
    let budgets = tracker.list_budgets()?;

    if budgets.is_empty() {
        println!("No budgets set. Create one with:");
        println!("  tally budgets set Groceries 400");
        return Ok(());
    }

    println!();
    println!("💰 Budgets");
    println!("   ─────────────────────────────────────────");
    for budget in &budgets {
        println!("   {:<22} ${:>10.2}", budget.category, budget.amount);
    }

    Ok(())
}

pub fn cmd_budgets_set(tracker: &Tracker, category: &str, amount: f64) -> Result<()> {
    let budget = tracker.set_budget(category, amount)?;

    if !tracker.categories().contains(&budget.category) {
        println!(
            "   ⚠️  '{}' is not one of the standard categories (see 'tally categories')",
            budget.category
        );
    }
    println!(
        "✅ Budget for {} set to ${:.2}",
        budget.category, budget.amount
    );

    Ok(())
}

pub async fn cmd_budgets_suggest(tracker: &Tracker, category: &str) -> Result<()> {
    let suggestion = tracker.suggest_budget(category).await?;
    println!("💡 {}", suggestion);
    Ok(())
}

pub fn cmd_budgets_progress(tracker: &Tracker) -> Result<()> {
    let progress = tracker.budget_progress()?;

    if progress.is_empty() {
        println!("No budgets set.");
        return Ok(());
    }

    println!();
    println!("📊 Budget Progress");
    println!("   ─────────────────────────────────────────────────────────────");

    for p in &progress {
        let bar = progress_bar(p.progress_percent, 20);
        let status = if p.is_over_budget { "⚠️ " } else { "  " };
        println!(
            "   {}{:<22} {} {:>6.1}%  ${:.2} / ${:.2}",
            status, p.category, bar, p.progress_percent, p.spent, p.budget_amount
        );
    }

    Ok(())
}

/// Text bar, full at 100% or more
fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(width - filled))
}
