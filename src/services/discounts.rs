//! Discount aggregation.
//!
//! Four independent discount sources (product original-vs-sale price,
//! affiliate referral, promo code, gift milestone) fold into a single
//! subtotal adjustment in a fixed order. Discounts are additive
//! conveniences: a missing or unparseable source contributes zero, never an
//! error.

use crate::clients::MilestoneApi;
use crate::models::{money, promo, CartItem, GiftMilestone, PromoApplication};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Every intermediate pricing figure, carried through to the Review step and
/// the order payload.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    pub cart_subtotal: Decimal,
    pub product_discount: Decimal,
    pub subtotal_after_product_discount: Decimal,
    pub affiliate_discount: Decimal,
    pub promo_code: Option<String>,
    pub promo_discount: Decimal,
    pub gift_milestone_min_amount: Option<Decimal>,
    pub gift_milestone_discount: Decimal,
    pub gift_milestone_cashback: Decimal,
    pub subtotal_after_discount: Decimal,
}

impl PricingBreakdown {
    /// True when any percentage/flat discount beyond the product sale price
    /// is active. Drives the anti-stacking shipping rule.
    pub fn has_active_discount(&self) -> bool {
        self.affiliate_discount > Decimal::ZERO
            || self.promo_discount > Decimal::ZERO
            || self.gift_milestone_discount > Decimal::ZERO
    }
}

/// Fallback affiliate discount: per-item price × quantity × commission
/// percentage, summed and rounded to the nearest rupee. Used only when no
/// stored figure exists from cart assembly.
fn recompute_affiliate_discount(items: &[CartItem]) -> Decimal {
    let raw: Decimal = items
        .iter()
        .filter_map(|item| {
            item.affiliate_commission.map(|pct| {
                item.unit_price() * Decimal::from(item.quantity) * pct / Decimal::from(100)
            })
        })
        .sum();
    money::round_rupees(money::clamp_non_negative(raw))
}

/// Pure pricing fold over a cart snapshot. Steps run in a fixed order;
/// the milestone is selected against the subtotal net of the other
/// discounts.
pub fn compute_pricing(
    items: &[CartItem],
    stored_affiliate_discount: Option<Decimal>,
    promo: Option<&PromoApplication>,
    milestones: &[GiftMilestone],
) -> PricingBreakdown {
    let cart_subtotal: Decimal = items.iter().map(CartItem::line_subtotal).sum();
    let product_discount: Decimal = items.iter().map(CartItem::line_product_discount).sum();
    let subtotal_after_product_discount = cart_subtotal - product_discount;

    let affiliate_discount = stored_affiliate_discount
        .map(money::clamp_non_negative)
        .unwrap_or_else(|| recompute_affiliate_discount(items));

    let promo_discount = promo
        .map(|p| money::clamp_non_negative(p.discount_amount))
        .unwrap_or(Decimal::ZERO);

    let milestone_base = money::clamp_non_negative(
        subtotal_after_product_discount - affiliate_discount - promo_discount,
    );
    let milestone = promo::select_milestone(milestones, milestone_base);
    let gift_milestone_discount = milestone
        .map(|m| m.discount_for(milestone_base))
        .unwrap_or(Decimal::ZERO);
    let gift_milestone_cashback = milestone
        .map(|m| m.cashback_for(milestone_base))
        .unwrap_or(Decimal::ZERO);

    // Upstream selection should keep this non-negative; clamp anyway.
    let subtotal_after_discount = money::clamp_non_negative(
        subtotal_after_product_discount
            - affiliate_discount
            - promo_discount
            - gift_milestone_discount,
    );

    PricingBreakdown {
        cart_subtotal,
        product_discount,
        subtotal_after_product_discount,
        affiliate_discount,
        promo_code: promo.map(|p| p.code.clone()),
        promo_discount,
        gift_milestone_min_amount: milestone.map(|m| m.min_amount),
        gift_milestone_discount,
        gift_milestone_cashback,
        subtotal_after_discount,
    }
}

/// Discount aggregation service; fetches milestone tiers from the
/// collaborator and degrades to no milestone when that fails.
#[derive(Clone)]
pub struct DiscountAggregator {
    milestones: Arc<dyn MilestoneApi>,
}

impl DiscountAggregator {
    pub fn new(milestones: Arc<dyn MilestoneApi>) -> Self {
        Self { milestones }
    }

    #[instrument(skip(self, items, promo))]
    pub async fn price(
        &self,
        items: &[CartItem],
        stored_affiliate_discount: Option<Decimal>,
        promo: Option<&PromoApplication>,
    ) -> PricingBreakdown {
        let milestones = match self.milestones.gift_milestones().await {
            Ok(tiers) => tiers,
            Err(e) => {
                warn!("Gift milestone lookup failed; pricing without tiers: {}", e);
                Vec::new()
            }
        };

        compute_pricing(items, stored_affiliate_discount, promo, &milestones)
    }
}
