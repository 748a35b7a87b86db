//! Category set handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
    pub fallback: String,
}

/// GET /api/categories - The fixed label set, in display order
pub async fn list_categories(State(state): State<Arc<AppState>>) -> Json<CategoriesResponse> {
    let categories = state.tracker.categories();
    Json(CategoriesResponse {
        categories: categories.labels().to_vec(),
        fallback: categories.fallback().to_string(),
    })
}
