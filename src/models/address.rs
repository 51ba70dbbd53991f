use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Sentinel id for the pseudo-address synthesized from the user's profile
/// record. Collaborator-created rows always carry positive ids.
pub const PROFILE_ADDRESS_ID: i64 = 0;

/// A saved delivery address, normalized from the collaborator schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryAddress {
    pub id: i64,
    pub recipient_name: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub landmark: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
    pub phone_number: String,
    pub delivery_instructions: Option<String>,
    pub saturday_delivery: bool,
    pub sunday_delivery: bool,
    pub is_default: bool,
}

impl DeliveryAddress {
    pub fn is_profile_derived(&self) -> bool {
        self.id == PROFILE_ADDRESS_ID
    }
}

/// Mapping from an instance key (`{itemKeyOrId}-{unitIndex}`) or base item
/// key to a delivery address id.
pub type AddressMapping = HashMap<String, i64>;

/// How the checkout delivers: one address for the whole cart, or a per-unit
/// mapping. The mapping only exists inside the multi-address variant, so a
/// mapping without the mode is unrepresentable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CheckoutMode {
    SingleAddress,
    MultiAddress { mapping: AddressMapping },
}

impl Default for CheckoutMode {
    fn default() -> Self {
        CheckoutMode::SingleAddress
    }
}

impl CheckoutMode {
    pub fn is_multi(&self) -> bool {
        matches!(self, CheckoutMode::MultiAddress { .. })
    }
}

fn pick_str(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| raw.get(*k))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

fn pick_i64(raw: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter().filter_map(|k| raw.get(*k)).find_map(|v| match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    })
}

fn pick_bool(raw: &Value, keys: &[&str]) -> bool {
    keys.iter()
        .filter_map(|k| raw.get(*k))
        .find_map(Value::as_bool)
        .unwrap_or(false)
}

/// Normalizes a collaborator address record into a [`DeliveryAddress`].
///
/// The address backend has historically emitted both camelCase and
/// snake_case payloads; this adapter is the single place that knows about
/// both. The core never branches on field-name variants.
pub fn normalize_address(raw: &Value) -> DeliveryAddress {
    DeliveryAddress {
        id: pick_i64(raw, &["id", "addressId", "address_id"]).unwrap_or(PROFILE_ADDRESS_ID),
        recipient_name: pick_str(raw, &["recipientName", "recipient_name", "name"])
            .unwrap_or_default(),
        address_line1: pick_str(
            raw,
            &["addressLine1", "address_line1", "address_line_1", "address"],
        )
        .unwrap_or_default(),
        address_line2: pick_str(raw, &["addressLine2", "address_line2", "address_line_2"]),
        landmark: pick_str(raw, &["landmark"]),
        city: pick_str(raw, &["city"]).unwrap_or_default(),
        state: pick_str(raw, &["state"]).unwrap_or_default(),
        pincode: pick_str(raw, &["pincode", "pin_code", "postalCode", "postal_code"])
            .unwrap_or_default(),
        country: pick_str(raw, &["country"]).unwrap_or_else(|| "India".to_string()),
        phone_number: pick_str(raw, &["phoneNumber", "phone_number", "phone", "mobile"])
            .unwrap_or_default(),
        delivery_instructions: pick_str(
            raw,
            &["deliveryInstructions", "delivery_instructions"],
        ),
        saturday_delivery: pick_bool(raw, &["saturdayDelivery", "saturday_delivery"]),
        sunday_delivery: pick_bool(raw, &["sundayDelivery", "sunday_delivery"]),
        is_default: pick_bool(raw, &["isDefault", "is_default"]),
    }
}
