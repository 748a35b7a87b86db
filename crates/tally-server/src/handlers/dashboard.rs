//! Dashboard and spending analysis handlers

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::read_optional_json;
use crate::{get_actor, AppError, AppState};
use tally_core::{AnalysisScope, DashboardData};

/// GET /api/dashboard-data - Category totals and income vs. expenses
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardData>, AppError> {
    Ok(Json(state.tracker.dashboard()?))
}

/// Optional request body for analysis
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisRequest {
    /// Include income rows in the analysed set (default: expenses only)
    #[serde(default)]
    pub include_income: bool,
}

#[derive(Serialize)]
pub struct AnalysisResponse {
    pub success: bool,
    pub analysis: String,
}

/// POST /api/analysis - Narrative coaching over stored transactions
///
/// An empty set is a 400. Backend failures still answer 200 with a fixed
/// apology sentence.
pub async fn analyze_spending(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<AnalysisResponse>, AppError> {
    let actor = get_actor(request.headers());
    let req: AnalysisRequest = read_optional_json(request).await?;

    let scope = if req.include_income {
        AnalysisScope::All
    } else {
        AnalysisScope::ExpensesOnly
    };
    let analysis = state.tracker.analyze_spending(scope).await?;

    state.db.log_audit(
        &actor,
        "analyze",
        Some("transaction"),
        None,
        Some(&format!("include_income={}", req.include_income)),
    )?;

    Ok(Json(AnalysisResponse {
        success: true,
        analysis,
    }))
}
