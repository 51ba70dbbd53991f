//! Multi-address order expansion.
//!
//! Explodes cart lines into per-unit fulfillment records, each bound to its
//! own delivery address through the instance mapping. Key resolution order
//! per unit is fixed: instance key, then the index-prefixed reciprocal form,
//! then the base item key. Items mapped only at the base level ship as one
//! unit at full quantity.

use crate::models::{
    AddressMapping, CartItem, CheckoutForm, DeliveryAddress, FulfillmentUnit,
};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum ExpansionOutcome {
    Assigned(Vec<FulfillmentUnit>),
    /// Some units have no resolvable address. The orchestrator must redirect
    /// to the assignment flow, never default silently.
    NeedsAssignment { missing: Vec<String> },
}

fn unit_from_address(item: &CartItem, quantity: u32, address: &DeliveryAddress) -> FulfillmentUnit {
    FulfillmentUnit {
        item_id: item.id,
        item_key: item.item_key.clone(),
        name: item.name.clone(),
        quantity,
        unit_price: item.unit_price(),
        selected_shade: item.selected_shade.clone(),
        recipient_name: address.recipient_name.clone(),
        phone_number: address.phone_number.clone(),
        address_line1: address.address_line1.clone(),
        address_line2: address.address_line2.clone(),
        landmark: address.landmark.clone(),
        city: address.city.clone(),
        state: address.state.clone(),
        pincode: address.pincode.clone(),
        country: address.country.clone(),
        delivery_instructions: address.delivery_instructions.clone(),
        saturday_delivery: address.saturday_delivery,
        sunday_delivery: address.sunday_delivery,
    }
}

/// Resolves the address id for one unit. Priority: instance key,
/// reciprocal form, base key. Preserve this order exactly.
fn resolve_unit_address(
    mapping: &AddressMapping,
    base_key: &str,
    unit_index: u32,
) -> Option<i64> {
    let instance_key = format!("{}-{}", base_key, unit_index);
    let reciprocal_key = format!("{}-{}", unit_index, base_key);

    mapping
        .get(&instance_key)
        .or_else(|| mapping.get(&reciprocal_key))
        .or_else(|| mapping.get(base_key))
        .copied()
}

fn has_instance_keys(mapping: &AddressMapping, base_key: &str, quantity: u32) -> bool {
    (0..quantity).any(|i| {
        mapping.contains_key(&format!("{}-{}", base_key, i))
            || mapping.contains_key(&format!("{}-{}", i, base_key))
    })
}

/// Expands a cart against an instance mapping and the user's saved
/// addresses. Unmapped units, and units mapped to an unknown address id,
/// surface in `NeedsAssignment`.
pub fn expand_multi_address(
    items: &[CartItem],
    mapping: &AddressMapping,
    addresses: &HashMap<i64, DeliveryAddress>,
) -> ExpansionOutcome {
    let mut units = Vec::new();
    let mut missing = Vec::new();

    for item in items {
        let base_key = item.base_key();

        // Base-level-only mapping: the whole quantity ships as one unit
        if !has_instance_keys(mapping, &base_key, item.quantity) {
            match mapping.get(&base_key).and_then(|id| addresses.get(id)) {
                Some(address) => units.push(unit_from_address(item, item.quantity, address)),
                None => missing.push(base_key.clone()),
            }
            continue;
        }

        for unit_index in 0..item.quantity {
            let resolved = resolve_unit_address(mapping, &base_key, unit_index)
                .and_then(|id| addresses.get(&id));
            match resolved {
                Some(address) => units.push(unit_from_address(item, 1, address)),
                None => missing.push(format!("{}-{}", base_key, unit_index)),
            }
        }
    }

    if missing.is_empty() {
        ExpansionOutcome::Assigned(units)
    } else {
        ExpansionOutcome::NeedsAssignment { missing }
    }
}

/// Single-address orders: no expansion, every line inherits the checkout
/// form's contact and address fields with quantity preserved.
pub fn build_single_address_units(items: &[CartItem], form: &CheckoutForm) -> Vec<FulfillmentUnit> {
    items
        .iter()
        .map(|item| FulfillmentUnit {
            item_id: item.id,
            item_key: item.item_key.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price(),
            selected_shade: item.selected_shade.clone(),
            recipient_name: form.full_name(),
            phone_number: form.phone.clone(),
            address_line1: form.address_line1.clone(),
            address_line2: form.address_line2.clone(),
            landmark: form.landmark.clone(),
            city: form.city.clone(),
            state: form.state.clone(),
            pincode: form.pincode.clone(),
            country: form.country.clone(),
            delivery_instructions: form.delivery_instructions.clone(),
            saturday_delivery: form.saturday_delivery,
            sunday_delivery: form.sunday_delivery,
        })
        .collect()
}
