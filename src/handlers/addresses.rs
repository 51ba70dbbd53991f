//! Saved delivery address endpoints (normalized passthrough to the
//! commerce backend).

use crate::clients::NewDeliveryAddress;
use crate::errors::ApiError;
use crate::handlers::common::{created_response, success_response, validate_input};
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_addresses).post(create_address))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListAddressesQuery {
    #[validate(range(min = 1))]
    pub user_id: i64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddressRequest {
    #[validate(range(min = 1))]
    pub user_id: i64,
    #[serde(flatten)]
    pub address: NewDeliveryAddress,
}

async fn list_addresses(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListAddressesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&query)?;
    let addresses = state.addresses.list_addresses(query.user_id).await?;
    Ok(success_response(addresses))
}

async fn create_address(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateAddressRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&req)?;
    let created = state
        .addresses
        .create_address(req.user_id, &req.address)
        .await?;
    Ok(created_response(created))
}
