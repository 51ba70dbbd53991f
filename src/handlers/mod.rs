//! HTTP surface. Routers are versioned under `/api/v1` and share state
//! through `Arc<AppState>`.

pub mod addresses;
pub mod checkout;
pub mod common;

use crate::errors::ApiError;
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/checkout", checkout::router())
        .nest("/addresses", addresses::router())
        .route("/pincode/:pincode", get(probe_pincode))
        .route("/health", get(health))
}

/// Serviceability probe. Indeterminate results tell the caller to retry;
/// they are never reported as invalid.
async fn probe_pincode(
    State(state): State<Arc<AppState>>,
    Path(pincode): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let status = state.location.validate_pincode(&pincode).await;
    Ok(common::success_response(
        json!({ "pincode": pincode, "status": status }),
    ))
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
