//! Budget handlers

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::read_json;
use crate::{get_actor, AppError, AppState};
use tally_core::{Budget, BudgetProgress};

/// Request body for creating or updating a budget
#[derive(Debug, Deserialize)]
pub struct SetBudgetRequest {
    pub category: String,
    pub amount: f64,
}

/// Request body for a budget suggestion
#[derive(Debug, Deserialize)]
pub struct SuggestBudgetRequest {
    pub category: String,
}

#[derive(Serialize)]
pub struct SuggestBudgetResponse {
    pub suggestion: String,
}

/// GET /api/budgets - All budgets, by category
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Budget>>, AppError> {
    Ok(Json(state.tracker.list_budgets()?))
}

/// POST /api/budgets - Create or replace the budget for a category
pub async fn set_budget(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<Budget>), AppError> {
    let actor = get_actor(request.headers());
    let req: SetBudgetRequest = read_json(request).await?;

    let budget = state.tracker.set_budget(&req.category, req.amount)?;

    state.db.log_audit(
        &actor,
        "upsert",
        Some("budget"),
        Some(budget.id),
        Some(&format!("category={}, amount={:.2}", budget.category, budget.amount)),
    )?;

    Ok((StatusCode::CREATED, Json(budget)))
}

/// GET /api/budgets/progress - Spend against every budget
pub async fn budget_progress(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BudgetProgress>>, AppError> {
    Ok(Json(state.tracker.budget_progress()?))
}

/// POST /api/budgets/suggest - Ask the AI backend for a monthly budget
///
/// Backend failures surface as 502; a category with no spending answers
/// without calling the backend.
pub async fn suggest_budget(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<SuggestBudgetResponse>, AppError> {
    let actor = get_actor(request.headers());
    let req: SuggestBudgetRequest = read_json(request).await?;

    let suggestion = state.tracker.suggest_budget(&req.category).await?;

    state.db.log_audit(
        &actor,
        "suggest",
        Some("budget"),
        None,
        Some(&format!("category={}", req.category.trim())),
    )?;

    Ok(Json(SuggestBudgetResponse { suggestion }))
}
