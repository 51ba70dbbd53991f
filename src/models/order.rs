use crate::models::{AddressMapping, PaymentMethod};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One fulfillment record of an order. Single-address orders carry one unit
/// per cart line with quantity preserved; multi-address orders carry one
/// unit per physical item with quantity fixed at 1.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentUnit {
    pub item_id: i64,
    pub item_key: Option<String>,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub selected_shade: Option<String>,
    pub recipient_name: String,
    pub phone_number: String,
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
}

/// Contact fields the payment gateway and order backend always receive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// The full order submission payload, shared by the gateway and COD paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub order_reference: String,
    pub user_id: i64,
    pub payment_method: PaymentMethod,
    pub customer: ContactDetails,
    pub items: Vec<FulfillmentUnit>,
    pub multi_address: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_mapping: Option<AddressMapping>,

    // Pricing snapshot
    pub cart_subtotal: Decimal,
    pub product_discount: Decimal,
    pub affiliate_discount: Decimal,
    pub promo_code: Option<String>,
    pub promo_discount: Decimal,
    pub gift_milestone_discount: Decimal,
    pub gift_milestone_cashback: Decimal,
    pub shipping: Decimal,
    pub cashback_wallet_amount: Decimal,
    pub affiliate_wallet_amount: Decimal,
    pub total: Decimal,

    /// Courier routing for fulfillment; manual dispatch when unserviceable.
    pub courier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_advisory: Option<String>,
}

/// Client-persisted descriptor for resuming a gateway-redirect order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingOrder {
    pub order_reference: String,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}
