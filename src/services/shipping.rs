//! Shipping cost and courier routing.
//!
//! Anti-stacking rule: any active affiliate/promo/milestone discount forfeits
//! the free-shipping waiver and the courier rate is always charged.
//! Otherwise shipping is free above the threshold. Serviceability failures
//! degrade to a flat rate with manual dispatch, never abort checkout.

use crate::clients::ServiceabilityApi;
use crate::models::money;
use crate::services::discounts::PricingBreakdown;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{instrument, warn};

const MANUAL_DISPATCH_ADVISORY: &str =
    "Delivery in 5-7 days. Tracking is not available for this destination.";

/// How the parcel reaches the destination.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Courier {
    Partner { name: String },
    /// No courier reaches this pincode; fulfillment is routed manually.
    ManualDispatch,
}

impl Courier {
    pub fn label(&self) -> String {
        match self {
            Courier::Partner { name } => name.clone(),
            Courier::ManualDispatch => "Manual Dispatch".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingQuote {
    pub amount: Decimal,
    pub courier: Courier,
    /// User-facing delivery note for degraded routing.
    pub advisory: Option<String>,
}

#[derive(Clone)]
pub struct ShippingResolver {
    serviceability: Arc<dyn ServiceabilityApi>,
    free_shipping_threshold: Decimal,
    fallback_rate: Decimal,
    weight_per_unit: Decimal,
}

impl ShippingResolver {
    pub fn new(
        serviceability: Arc<dyn ServiceabilityApi>,
        free_shipping_threshold: u32,
        fallback_rate: u32,
        weight_per_unit: f64,
    ) -> Self {
        Self {
            serviceability,
            free_shipping_threshold: Decimal::from(free_shipping_threshold),
            fallback_rate: Decimal::from(fallback_rate),
            weight_per_unit: money::decimal_from_f64(weight_per_unit),
        }
    }

    /// Cheapest courier for the destination, or the flat-rate manual
    /// fallback when nothing is available.
    #[instrument(skip(self))]
    async fn resolve_courier(
        &self,
        pincode: &str,
        total_quantity: u32,
        cod: bool,
    ) -> (Decimal, Courier, Option<String>) {
        let weight = self.weight_per_unit * Decimal::from(total_quantity);

        let reachable = match self.serviceability.check_pincode(pincode).await {
            Ok(available) => available,
            Err(e) => {
                warn!("Pincode reachability check failed for {}: {}", pincode, e);
                false
            }
        };

        if reachable {
            match self.serviceability.courier_options(pincode, weight, cod).await {
                Ok(options) => {
                    if let Some(cheapest) = options.iter().min_by_key(|o| o.rate) {
                        return (
                            cheapest.rate,
                            Courier::Partner {
                                name: cheapest.courier_name.clone(),
                            },
                            None,
                        );
                    }
                    warn!("No couriers quoted for pincode {}", pincode);
                }
                Err(e) => {
                    warn!("Courier rate lookup failed for {}: {}", pincode, e);
                }
            }
        }

        (
            self.fallback_rate,
            Courier::ManualDispatch,
            Some(MANUAL_DISPATCH_ADVISORY.to_string()),
        )
    }

    /// Resolves the shipping charge and routing for a priced cart.
    #[instrument(skip(self, pricing))]
    pub async fn resolve(
        &self,
        pincode: &str,
        total_quantity: u32,
        cod: bool,
        pricing: &PricingBreakdown,
    ) -> ShippingQuote {
        let (rate, courier, advisory) = self.resolve_courier(pincode, total_quantity, cod).await;

        let amount = if pricing.has_active_discount() {
            rate
        } else if pricing.subtotal_after_product_discount > self.free_shipping_threshold {
            Decimal::ZERO
        } else {
            rate
        };

        ShippingQuote {
            amount,
            courier,
            advisory,
        }
    }
}
