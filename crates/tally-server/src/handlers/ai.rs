//! AI backend status handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use tally_core::{AIBackend, RouterInfo};

/// AI backend status
#[derive(Serialize)]
pub struct AiHealthResponse {
    pub configured: bool,
    pub available: bool,
    pub backend: Option<String>,
    pub host: Option<String>,
    pub model: Option<String>,
    pub router: Option<RouterInfo>,
}

/// GET /api/ai/health - Live health check of the configured backend
pub async fn ai_health(State(state): State<Arc<AppState>>) -> Json<AiHealthResponse> {
    let Some(client) = state.tracker.ai() else {
        return Json(AiHealthResponse {
            configured: false,
            available: false,
            backend: None,
            host: None,
            model: None,
            router: None,
        });
    };

    Json(AiHealthResponse {
        configured: true,
        available: client.health_check().await,
        backend: Some(client.kind().to_string()),
        host: Some(client.host().to_string()),
        model: Some(client.model().to_string()),
        router: Some(client.router_info()),
    })
}
