//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use super::read_json;
use crate::{get_actor, AppError, AppState};
use tally_core::{NewTransaction, Transaction};

/// GET /api/transactions - All transactions, newest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    Ok(Json(state.tracker.list_transactions()?))
}

/// POST /api/transactions - Classify and store a transaction
///
/// Classification failures never fail the request; the transaction is filed
/// under the fallback category instead.
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    let actor = get_actor(request.headers());
    let input: NewTransaction = read_json(request).await?;

    let tx = state.tracker.add_transaction(input).await?;

    state.db.log_audit(
        &actor,
        "create",
        Some("transaction"),
        Some(tx.id),
        Some(&format!("category={}, amount={:.2}", tx.category, tx.amount)),
    )?;

    Ok((StatusCode::CREATED, Json(tx)))
}

/// DELETE /api/transactions/:id - Permanently delete a transaction
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    state.tracker.delete_transaction(id)?;

    state
        .db
        .log_audit(&get_actor(&headers), "delete", Some("transaction"), Some(id), None)?;

    Ok(Json(serde_json::json!({ "success": true, "data": {} })))
}
