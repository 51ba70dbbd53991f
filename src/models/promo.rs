use crate::models::money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A promo code applied to the session. The discount amount is resolved at
/// application time against the promo backend and carried as a flat figure;
/// it is never recomputed during pricing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromoApplication {
    pub code: String,
    pub discount_amount: Decimal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneDiscountType {
    #[default]
    None,
    Percentage,
    Flat,
}

/// A subtotal-threshold tier unlocking a discount and/or bonus cashback
/// and/or free gifts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GiftMilestone {
    pub min_amount: Decimal,
    pub discount_type: MilestoneDiscountType,
    pub discount_value: Decimal,
    pub cashback_percentage: Decimal,
    pub gift_count: u32,
}

impl Default for GiftMilestone {
    fn default() -> Self {
        Self {
            min_amount: Decimal::ZERO,
            discount_type: MilestoneDiscountType::None,
            discount_value: Decimal::ZERO,
            cashback_percentage: Decimal::ZERO,
            gift_count: 0,
        }
    }
}

impl GiftMilestone {
    /// Discount granted at the given subtotal, rounded to the nearest rupee.
    pub fn discount_for(&self, subtotal: Decimal) -> Decimal {
        let raw = match self.discount_type {
            MilestoneDiscountType::None => Decimal::ZERO,
            MilestoneDiscountType::Flat => self.discount_value,
            MilestoneDiscountType::Percentage => {
                subtotal * self.discount_value / Decimal::from(100)
            }
        };
        money::round_rupees(money::clamp_non_negative(raw))
    }

    /// Bonus cashback earned at the given subtotal, rounded to the nearest
    /// rupee.
    pub fn cashback_for(&self, subtotal: Decimal) -> Decimal {
        let raw = subtotal * self.cashback_percentage / Decimal::from(100);
        money::round_rupees(money::clamp_non_negative(raw))
    }
}

/// Selects the milestone to apply: the highest `min_amount` not exceeding
/// the discount-adjusted subtotal. At most one milestone applies.
pub fn select_milestone(milestones: &[GiftMilestone], subtotal: Decimal) -> Option<&GiftMilestone> {
    milestones
        .iter()
        .filter(|m| m.min_amount <= subtotal)
        .max_by_key(|m| m.min_amount)
}
