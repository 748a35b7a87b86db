//! Integration tests for tally-core
//!
//! These exercise the add → aggregate → budget → suggest → analyze workflow
//! through the public API, with the mock backend standing in for a model.

use std::sync::{Arc, RwLock};

use tally_core::{
    aggregate, AnalysisScope, CategorySet, Database, Error, MockBackend, NewTransaction,
    PromptLibrary, Tracker,
};

fn tracker_with(mock: &MockBackend) -> Tracker {
    Tracker::with_parts(
        Database::in_memory().expect("Failed to create in-memory database"),
        Some(mock.clone().into()),
        CategorySet::default(),
        Arc::new(RwLock::new(PromptLibrary::embedded_only())),
    )
}

async fn seed(tracker: &Tracker) {
    for (description, amount) in [
        ("ACME PAYROLL", 3200.0),
        ("WHOLE FOODS MARKET", -142.17),
        ("TRADER JOE'S #552", -63.40),
        ("UBER *TRIP", -18.20),
        ("NETFLIX.COM", -15.49),
        ("Corner store", -4.00),
    ] {
        tracker
            .add_transaction(NewTransaction::new(description, amount))
            .await
            .expect("Failed to add transaction");
    }
}

// =============================================================================
// Workflow
// =============================================================================

#[tokio::test]
async fn test_full_budget_workflow() {
    let mock = MockBackend::new();
    let tracker = tracker_with(&mock);
    seed(&tracker).await;

    let transactions = tracker.list_transactions().unwrap();
    assert_eq!(transactions.len(), 6);
    let categories = CategorySet::default();
    assert!(transactions.iter().all(|t| categories.contains(&t.category)));

    let dashboard = tracker.dashboard().unwrap();
    assert_eq!(dashboard.income_vs_expense.income, 3200.0);
    assert!((dashboard.income_vs_expense.expenses - 243.26).abs() < 1e-9);

    let labels: Vec<&str> = dashboard
        .spending_by_category
        .iter()
        .map(|t| t.category.as_str())
        .collect();
    assert_eq!(
        labels,
        vec!["Groceries", "Transportation", "Entertainment", "Other"]
    );

    tracker.set_budget("Groceries", 180.0).unwrap();
    tracker.set_budget("Groceries", 250.0).unwrap();
    tracker.set_budget("Entertainment", 10.0).unwrap();

    let budgets = tracker.list_budgets().unwrap();
    assert_eq!(budgets.len(), 2);

    let progress = tracker.budget_progress().unwrap();
    let groceries = progress.iter().find(|p| p.category == "Groceries").unwrap();
    assert_eq!(groceries.budget_amount, 250.0);
    assert!(!groceries.is_over_budget);
    let entertainment = progress
        .iter()
        .find(|p| p.category == "Entertainment")
        .unwrap();
    assert!(entertainment.is_over_budget);
    assert!(entertainment.progress_percent > 150.0);

    let suggestion = tracker.suggest_budget("Groceries").await.unwrap();
    assert_eq!(suggestion, "A good starting point could be $450.");

    let analysis = tracker
        .analyze_spending(AnalysisScope::ExpensesOnly)
        .await
        .unwrap();
    assert!(!analysis.is_empty());
}

#[tokio::test]
async fn test_suggest_without_history_never_calls_backend() {
    let mock = MockBackend::failing("backend must not be called");
    let tracker = tracker_with(&mock);

    let text = tracker.suggest_budget("Travel").await.unwrap();
    assert_eq!(
        text,
        "No spending history for Travel. Set a budget manually to start!"
    );
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn test_suggestion_and_analysis_failure_asymmetry() {
    let mock = MockBackend::failing("quota exceeded");
    let tracker = tracker_with(&mock);
    seed(&tracker).await;

    // Classification absorbed the failures
    let transactions = tracker.list_transactions().unwrap();
    assert!(transactions.iter().all(|t| t.category == "Other"));

    let err = tracker.suggest_budget("Other").await.unwrap_err();
    assert!(err.is_ai_failure());

    let text = tracker
        .analyze_spending(AnalysisScope::All)
        .await
        .unwrap();
    assert_eq!(
        text,
        "Sorry, I was unable to analyze your spending at this time."
    );
}

#[tokio::test]
async fn test_analysis_of_empty_store_is_rejected() {
    let mock = MockBackend::new();
    let tracker = tracker_with(&mock);

    let err = tracker
        .analyze_spending(AnalysisScope::All)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(mock.calls(), 0);
}

// =============================================================================
// Store round trip
// =============================================================================

#[tokio::test]
async fn test_insert_list_delete_leaves_store_unchanged() {
    let tracker = tracker_with(&MockBackend::new());
    seed(&tracker).await;
    let before = tracker.list_transactions().unwrap();

    let tx = tracker
        .add_transaction(NewTransaction::new("Chipotle", -12.5))
        .await
        .unwrap();
    assert_eq!(tracker.list_transactions().unwrap().len(), before.len() + 1);

    tracker.delete_transaction(tx.id).unwrap();
    assert_eq!(tracker.list_transactions().unwrap(), before);

    assert!(matches!(
        tracker.delete_transaction(tx.id),
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_negative_budget_leaves_store_untouched() {
    let tracker = tracker_with(&MockBackend::new());
    tracker.set_budget("Shopping", 75.0).unwrap();

    assert!(matches!(
        tracker.set_budget("Shopping", -5.0),
        Err(Error::Validation(_))
    ));
    let budgets = tracker.list_budgets().unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].amount, 75.0);
}

#[test]
fn test_aggregation_is_pure_over_snapshot() {
    let progress = aggregate::budget_progress("Groceries", &[], 0.0);
    assert_eq!(progress.spent, 0.0);
    assert_eq!(progress.progress_percent, 0.0);
    assert!(!progress.is_over_budget);
}
