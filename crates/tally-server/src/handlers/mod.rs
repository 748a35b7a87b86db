//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod ai;
pub mod audit;
pub mod budgets;
pub mod categories;
pub mod dashboard;
pub mod transactions;

// Re-export all handlers for use in router
pub use ai::*;
pub use audit::*;
pub use budgets::*;
pub use categories::*;
pub use dashboard::*;
pub use transactions::*;

use axum::extract::Request;
use serde::de::DeserializeOwned;

use crate::{AppError, MAX_BODY_SIZE};

/// Read and parse a JSON request body
pub(crate) async fn read_json<T: DeserializeOwned>(request: Request) -> Result<T, AppError> {
    let bytes = body_bytes(request).await?;
    serde_json::from_slice(&bytes).map_err(|_| AppError::bad_request("Invalid JSON"))
}

/// Like `read_json`, but an empty body means `T::default()`
pub(crate) async fn read_optional_json<T>(request: Request) -> Result<T, AppError>
where
    T: DeserializeOwned + Default,
{
    let bytes = body_bytes(request).await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(&bytes).map_err(|_| AppError::bad_request("Invalid JSON"))
}

async fn body_bytes(request: Request) -> Result<axum::body::Bytes, AppError> {
    axum::body::to_bytes(request.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))
}
