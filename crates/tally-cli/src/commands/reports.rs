//! Dashboard, analysis and category commands

use anyhow::Result;
use tally_core::{AnalysisScope, CategorySet, Tracker};

pub fn cmd_dashboard(tracker: &Tracker, json: bool) -> Result<()> {
    let data = tracker.dashboard()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    let summary = data.income_vs_expense;

    println!();
    println!("📊 Tally Dashboard");
    println!("   ─────────────────────────────────────────");
    println!("   Income:   \x1b[32m${:>12.2}\x1b[0m", summary.income);
    println!("   Expenses: \x1b[31m${:>12.2}\x1b[0m", summary.expenses);
    println!("   Net:      ${:>12.2}", summary.income - summary.expenses);

    if data.spending_by_category.is_empty() {
        println!();
        println!("   No expenses recorded yet.");
        return Ok(());
    }

    println!();
    println!("   Spending by category");
    for row in &data.spending_by_category {
        let share = if summary.expenses > 0.0 {
            row.total / summary.expenses * 100.0
        } else {
            0.0
        };
        println!(
            "   {:<22} ${:>10.2}  {:>5.1}%",
            row.category, row.total, share
        );
    }

    Ok(())
}

pub async fn cmd_analyze(tracker: &Tracker, include_income: bool) -> Result<()> {
    let scope = if include_income {
        AnalysisScope::All
    } else {
        AnalysisScope::ExpensesOnly
    };

    println!("🤖 Analyzing your spending...");
    let analysis = tracker.analyze_spending(scope).await?;

    println!();
    println!("{}", analysis);

    Ok(())
}

pub fn cmd_categories() -> Result<()> {
    let categories = CategorySet::default();

    println!("Categories:");
    for label in categories.labels() {
        let marker = if label == categories.fallback() {
            " (fallback)"
        } else {
            ""
        };
        println!("  - {}{}", label, marker);
    }

    Ok(())
}
