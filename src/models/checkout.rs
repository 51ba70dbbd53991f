use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Terminal payment paths.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cashfree,
    Cod,
}

/// Mutable checkout form state: recipient/contact fields plus the derived
/// address fields and delivery preferences. Reconstructed per session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub landmark: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
    pub delivery_instructions: Option<String>,
    pub saturday_delivery: bool,
    pub sunday_delivery: bool,
    pub payment_method: Option<PaymentMethod>,
    pub affiliate_code: Option<String>,
    pub affiliate_discount: Option<Decimal>,
}

impl CheckoutForm {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
