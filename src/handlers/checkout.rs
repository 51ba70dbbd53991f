//! Checkout flow endpoints.

use crate::errors::ApiError;
use crate::handlers::common::{created_response, success_response, validate_input};
use crate::models::{
    CartItem, CheckoutForm, CheckoutMode, DeliveryAddress, PaymentMethod, PromoApplication,
};
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(start_checkout))
        .route("/:id", get(get_checkout))
        .route("/:id/address", put(set_address))
        .route("/:id/mode", put(set_mode))
        .route("/:id/advance", post(advance))
        .route("/:id/back", post(back))
        .route("/:id/quote", get(quote))
        .route("/:id/promo", post(apply_promo))
        .route("/:id/wallet/reserve", post(reserve_wallet))
        .route("/:id/wallet/release", post(release_wallet))
        .route("/:id/wallet/affiliate", post(apply_affiliate_wallet))
        .route("/:id/pincode/:pincode", get(check_pincode))
        .route("/:id/submit", post(submit))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartCheckoutRequest {
    #[validate(range(min = 1))]
    pub user_id: i64,
    pub items: Vec<CartItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAddressRequest {
    pub form: CheckoutForm,
    #[serde(default)]
    pub selected_address: Option<DeliveryAddress>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplyPromoRequest {
    #[validate(length(min = 1))]
    pub code: String,
    pub discount_amount: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveWalletRequest {
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub payment_method: PaymentMethod,
}

async fn start_checkout(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartCheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&req)?;
    let snapshot = state.checkout.start(req.user_id, req.items).await?;
    Ok(created_response(snapshot))
}

async fn get_checkout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.checkout.snapshot(&id).await?;
    Ok(success_response(snapshot))
}

async fn set_address(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SetAddressRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .checkout
        .set_address(&id, req.form, req.selected_address)
        .await?;
    Ok(success_response(json!({ "sessionId": id })))
}

async fn set_mode(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(mode): Json<CheckoutMode>,
) -> Result<impl IntoResponse, ApiError> {
    state.checkout.set_mode(&id, mode).await?;
    Ok(success_response(json!({ "sessionId": id })))
}

async fn advance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.checkout.advance(&id).await?;
    Ok(success_response(outcome))
}

async fn back(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let step = state.checkout.back(&id).await?;
    Ok(success_response(json!({ "step": step })))
}

async fn quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let quote = state.checkout.quote(&id).await?;
    Ok(success_response(quote))
}

async fn apply_promo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ApplyPromoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&req)?;
    state
        .checkout
        .apply_promo(
            &id,
            PromoApplication {
                code: req.code,
                discount_amount: req.discount_amount,
            },
        )
        .await?;
    Ok(success_response(json!({ "sessionId": id })))
}

async fn reserve_wallet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ReserveWalletRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = state.checkout.user_id(&id).await?;
    let reservation = state
        .checkout
        .wallet()
        .reserve(&id, user_id, req.amount)
        .await?;
    Ok(success_response(reservation))
}

async fn release_wallet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.checkout.wallet().release(&id).await?;
    Ok(success_response(json!({ "sessionId": id })))
}

async fn apply_affiliate_wallet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let amount = state.checkout.apply_affiliate_wallet(&id).await?;
    Ok(success_response(json!({ "sessionId": id, "amount": amount })))
}

/// Debounced per-session serviceability check. A superseded check reports
/// itself as such instead of publishing a stale status.
async fn check_pincode(
    State(state): State<Arc<AppState>>,
    Path((id, pincode)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let status = state
        .checkout
        .check_pincode(&state.location, &id, &pincode)
        .await?;
    let body = match status {
        Some(status) => json!({ "pincode": pincode, "status": status }),
        None => json!({ "pincode": pincode, "superseded": true }),
    };
    Ok(success_response(body))
}

async fn submit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SubmitRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.payments.submit(&id, req.payment_method).await?;
    Ok(created_response(result))
}
