//! Spending aggregation
//!
//! Pure functions over a transaction snapshot. Amounts are signed: negative is
//! an expense, positive is income, zero counts as neither.

use std::collections::HashMap;

use crate::categories::CategorySet;
use crate::models::{
    Budget, BudgetProgress, CategoryTotal, DashboardData, IncomeExpenseSummary, Transaction,
};

/// Expense totals per category, as positive numbers
///
/// Categories without expenses are omitted. Order follows the category set;
/// labels outside the set come last, alphabetically.
pub fn spending_by_category(
    transactions: &[Transaction],
    categories: &CategorySet,
) -> Vec<CategoryTotal> {
    let mut sums: HashMap<&str, f64> = HashMap::new();
    for tx in transactions.iter().filter(|t| t.is_expense()) {
        *sums.entry(tx.category.as_str()).or_insert(0.0) += tx.amount;
    }

    let mut totals: Vec<CategoryTotal> = sums
        .into_iter()
        .map(|(category, sum)| CategoryTotal {
            category: category.to_string(),
            total: sum.abs(),
        })
        .collect();

    totals.sort_by(|a, b| {
        let pa = categories.position(&a.category).unwrap_or(usize::MAX);
        let pb = categories.position(&b.category).unwrap_or(usize::MAX);
        pa.cmp(&pb).then_with(|| a.category.cmp(&b.category))
    });
    totals
}

/// Total income and total expenses (both non-negative)
pub fn income_vs_expense(transactions: &[Transaction]) -> IncomeExpenseSummary {
    let (income, expenses) =
        transactions
            .iter()
            .fold((0.0, 0.0), |(income, expenses), tx| match tx.amount {
                a if a > 0.0 => (income + a, expenses),
                a if a < 0.0 => (income, expenses + a),
                _ => (income, expenses),
            });

    IncomeExpenseSummary {
        income,
        expenses: f64::abs(expenses),
    }
}

/// Total spent in one category, as a positive number
pub fn spent_in_category(transactions: &[Transaction], category: &str) -> f64 {
    transactions
        .iter()
        .filter(|t| t.category == category && t.is_expense())
        .map(|t| t.amount.abs())
        .sum()
}

/// Spend against a budget amount for one category
///
/// A zero (or negative) budget reports 0% rather than dividing by zero. The
/// percentage is not clamped.
pub fn budget_progress(
    category: &str,
    transactions: &[Transaction],
    budget_amount: f64,
) -> BudgetProgress {
    let spent = spent_in_category(transactions, category);
    let progress_percent = if budget_amount > 0.0 {
        spent / budget_amount * 100.0
    } else {
        0.0
    };

    BudgetProgress {
        category: category.to_string(),
        spent,
        budget_amount,
        progress_percent,
        is_over_budget: progress_percent > 100.0,
    }
}

/// Progress for every stored budget, in budget order
pub fn all_budget_progress(budgets: &[Budget], transactions: &[Transaction]) -> Vec<BudgetProgress> {
    budgets
        .iter()
        .map(|b| budget_progress(&b.category, transactions, b.amount))
        .collect()
}

/// Everything the dashboard shows
pub fn dashboard(transactions: &[Transaction], categories: &CategorySet) -> DashboardData {
    DashboardData {
        spending_by_category: spending_by_category(transactions, categories),
        income_vs_expense: income_vs_expense(transactions),
    }
}
