use crate::models::money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A cart line item as snapshotted from the storefront cart.
///
/// Prices are carried as currency-formatted display strings and parsed on
/// demand; `original_price` is the pre-discount price when the product is on
/// sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartItem {
    pub id: i64,
    /// Stable per-line key used for per-instance address mapping. Falls back
    /// to the numeric id when absent.
    pub item_key: Option<String>,
    pub name: String,
    pub price: String,
    pub original_price: Option<String>,
    pub quantity: u32,
    pub is_combo: bool,
    pub is_offer_item: bool,
    pub selected_shade: Option<String>,
    pub selected_shades: Option<Vec<String>>,
    /// Percentage points of this item's price attributable to an affiliate
    pub affiliate_commission: Option<Decimal>,
    pub affiliate_user_discount: Option<Decimal>,
    pub cashback_price: Option<String>,
    pub cashback_percentage: Option<Decimal>,
}

impl Default for CartItem {
    fn default() -> Self {
        Self {
            id: 0,
            item_key: None,
            name: String::new(),
            price: String::new(),
            original_price: None,
            quantity: 1,
            is_combo: false,
            is_offer_item: false,
            selected_shade: None,
            selected_shades: None,
            affiliate_commission: None,
            affiliate_user_discount: None,
            cashback_price: None,
            cashback_percentage: None,
        }
    }
}

impl CartItem {
    /// Current unit price, parsed from the display string.
    pub fn unit_price(&self) -> Decimal {
        money::parse_amount(&self.price)
    }

    /// Pre-discount unit price when the item carries one.
    pub fn unit_original_price(&self) -> Option<Decimal> {
        self.original_price
            .as_deref()
            .map(money::parse_amount)
            .filter(|p| *p > Decimal::ZERO)
    }

    /// Key used for address-mapping lookups: the item key when present,
    /// else the numeric id.
    pub fn base_key(&self) -> String {
        match &self.item_key {
            Some(key) if !key.is_empty() => key.clone(),
            _ => self.id.to_string(),
        }
    }

    /// Line subtotal at the original-or-current unit price.
    pub fn line_subtotal(&self) -> Decimal {
        let unit = self.unit_original_price().unwrap_or_else(|| self.unit_price());
        unit * Decimal::from(self.quantity)
    }

    /// Per-line product discount: (original − current) × quantity, zero when
    /// no original price is present or the sale price is not lower.
    pub fn line_product_discount(&self) -> Decimal {
        match self.unit_original_price() {
            Some(original) => {
                let diff = original - self.unit_price();
                money::clamp_non_negative(diff) * Decimal::from(self.quantity)
            }
            None => Decimal::ZERO,
        }
    }
}

/// Total number of physical units across the cart.
pub fn total_quantity(items: &[CartItem]) -> u32 {
    items.iter().map(|item| item.quantity).sum()
}
