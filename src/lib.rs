//! glowcart-api: checkout pricing and multi-address order assembly for the
//! GlowCart beauty storefront.
//!
//! The crate owns the checkout pipeline: discount aggregation, wallet
//! redemption with timed expiry, shipping resolution, multi-address order
//! expansion, the three-step orchestrator, and payment submission (Cashfree
//! or cash on delivery). Product, address, wallet, milestone, and order
//! persistence live in the commerce backend and are reached through typed
//! collaborator clients.

pub mod clients;
pub mod config;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod models;
pub mod services;
pub mod session;

use crate::clients::AddressApi;
use crate::config::AppConfig;
use crate::services::{CheckoutService, LocationService, PaymentSubmission};
use std::sync::Arc;

/// Shared application state for handlers.
pub struct AppState {
    pub config: AppConfig,
    pub checkout: CheckoutService,
    pub payments: PaymentSubmission,
    pub location: LocationService,
    pub addresses: Arc<dyn AddressApi>,
}
