//! Pricing calculator using rust_decimal for the fee-rate arithmetic
//!
//! All monetary values are integer cents; only the service-fee percentage
//! passes through `Decimal`, rounded half-up back to cents. Pure and
//! deterministic: catalog records go in, a priced snapshot comes out.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{AddOnSelection, MenuItem, OrderItem, Pricing};
use std::collections::HashMap;
use thiserror::Error;

/// Flat delivery fee in cents
pub const DELIVERY_FEE_CENTS: i64 = 200;

/// Platform service fee rate applied to the subtotal (5%)
const SERVICE_FEE_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Maximum quantity per line / per add-on selection
const MAX_QUANTITY: i32 = 999;

/// Requested add-on selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOnRequest {
    pub add_on_id: String,
    pub quantity: i32,
}

/// Requested order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub menu_item_id: String,
    pub quantity: i32,
    #[serde(default)]
    pub add_ons: Vec<AddOnRequest>,
}

/// Pricing validation failures; each message names the offending id
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    #[error("menu item {0} does not resolve to an available item of this vendor")]
    InvalidItem(String),

    #[error("add-on {add_on_id} does not belong to menu item {menu_item_id}")]
    InvalidAddOn {
        menu_item_id: String,
        add_on_id: String,
    },

    #[error("required add-on {add_on_id} missing for menu item {menu_item_id}")]
    MissingRequiredAddOn {
        menu_item_id: String,
        add_on_id: String,
    },

    #[error(
        "add-on {add_on_id} quantity {quantity} exceeds maximum {max_quantity} on menu item {menu_item_id}"
    )]
    AddOnQuantityExceeded {
        menu_item_id: String,
        add_on_id: String,
        quantity: i32,
        max_quantity: i32,
    },

    #[error("quantity {quantity} out of range for {field}")]
    InvalidQuantity { field: String, quantity: i32 },
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        let message = err.to_string();
        match err {
            PricingError::InvalidItem(id) => {
                AppError::with_message(ErrorCode::InvalidItem, message).with_detail("menuItemId", id)
            }
            PricingError::InvalidAddOn {
                menu_item_id,
                add_on_id,
            } => AppError::with_message(ErrorCode::InvalidAddOn, message)
                .with_detail("menuItemId", menu_item_id)
                .with_detail("addOnId", add_on_id),
            PricingError::MissingRequiredAddOn {
                menu_item_id,
                add_on_id,
            } => AppError::with_message(ErrorCode::MissingRequiredAddOn, message)
                .with_detail("menuItemId", menu_item_id)
                .with_detail("addOnId", add_on_id),
            PricingError::AddOnQuantityExceeded {
                menu_item_id,
                add_on_id,
                ..
            } => AppError::with_message(ErrorCode::AddOnQuantityExceeded, message)
                .with_detail("menuItemId", menu_item_id)
                .with_detail("addOnId", add_on_id),
            PricingError::InvalidQuantity { field, .. } => {
                AppError::with_message(ErrorCode::ValidationFailed, message)
                    .with_detail("field", field)
            }
        }
    }
}

/// Result of pricing: the item snapshots plus the breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    pub items: Vec<OrderItem>,
    pub pricing: Pricing,
}

/// Price a set of requested items against the vendor's catalog records
///
/// Validation order: item resolution, add-on membership, required add-ons,
/// add-on quantity limits. `menu` holds the authoritative records for the
/// target vendor, keyed by menu item id.
pub fn price_order(
    vendor_id: &str,
    requests: &[OrderItemRequest],
    menu: &HashMap<String, MenuItem>,
) -> Result<PricedOrder, PricingError> {
    let mut items = Vec::with_capacity(requests.len());
    let mut subtotal: i64 = 0;

    for request in requests {
        let item = price_item(vendor_id, request, menu)?;
        subtotal += item.total_price;
        items.push(item);
    }

    let service_fee = service_fee(subtotal);
    let pricing = Pricing::new(subtotal, DELIVERY_FEE_CENTS, service_fee);

    Ok(PricedOrder { items, pricing })
}

/// Price a single requested line
fn price_item(
    vendor_id: &str,
    request: &OrderItemRequest,
    menu: &HashMap<String, MenuItem>,
) -> Result<OrderItem, PricingError> {
    if request.quantity < 1 || request.quantity > MAX_QUANTITY {
        return Err(PricingError::InvalidQuantity {
            field: format!("items[{}].quantity", request.menu_item_id),
            quantity: request.quantity,
        });
    }

    // 1. The item must resolve to an available item of the target vendor
    let menu_item = menu
        .get(&request.menu_item_id)
        .filter(|m| m.vendor_id == vendor_id && m.available)
        .ok_or_else(|| PricingError::InvalidItem(request.menu_item_id.clone()))?;

    // 2. Every selected add-on must belong to this menu item
    let mut add_ons = Vec::with_capacity(request.add_ons.len());
    for selection in &request.add_ons {
        let add_on = menu_item.add_on(&selection.add_on_id).ok_or_else(|| {
            PricingError::InvalidAddOn {
                menu_item_id: menu_item.id.clone(),
                add_on_id: selection.add_on_id.clone(),
            }
        })?;

        if selection.quantity < 1 || selection.quantity > MAX_QUANTITY {
            return Err(PricingError::InvalidQuantity {
                field: format!("addOns[{}].quantity", add_on.id),
                quantity: selection.quantity,
            });
        }

        add_ons.push(AddOnSelection {
            add_on_id: add_on.id.clone(),
            name: add_on.name.clone(),
            quantity: selection.quantity,
            price: add_on.price,
        });
    }

    // 3. Every required add-on must appear with quantity ≥ 1
    for add_on in menu_item.add_ons.iter().filter(|a| a.required) {
        let selected = request
            .add_ons
            .iter()
            .any(|s| s.add_on_id == add_on.id && s.quantity >= 1);
        if !selected {
            return Err(PricingError::MissingRequiredAddOn {
                menu_item_id: menu_item.id.clone(),
                add_on_id: add_on.id.clone(),
            });
        }
    }

    // 4. No selection may exceed its add-on's quantity limit
    for selection in &add_ons {
        let max_quantity = menu_item
            .add_on(&selection.add_on_id)
            .map(|a| a.max_quantity)
            .unwrap_or(i32::MAX);
        if selection.quantity > max_quantity {
            return Err(PricingError::AddOnQuantityExceeded {
                menu_item_id: menu_item.id.clone(),
                add_on_id: selection.add_on_id.clone(),
                quantity: selection.quantity,
                max_quantity,
            });
        }
    }

    // per-item total = (unit_price + Σ add_on_price · add_on_qty) × quantity
    let add_on_total: i64 = add_ons
        .iter()
        .map(|a| a.price * i64::from(a.quantity))
        .sum();
    let total_price = (menu_item.price + add_on_total) * i64::from(request.quantity);

    Ok(OrderItem {
        menu_item_id: menu_item.id.clone(),
        name: menu_item.name.clone(),
        quantity: request.quantity,
        unit_price: menu_item.price,
        total_price,
        add_ons,
    })
}

/// Service fee = round(subtotal × rate), half-up on cents
fn service_fee(subtotal: i64) -> i64 {
    (Decimal::from(subtotal) * SERVICE_FEE_RATE)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::AddOn;

    fn menu_item(id: &str, price: i64, add_ons: Vec<AddOn>) -> MenuItem {
        MenuItem {
            id: id.to_string(),
            vendor_id: "v-1".to_string(),
            name: format!("Item {}", id),
            price,
            available: true,
            add_ons,
        }
    }

    fn add_on(id: &str, price: i64, required: bool, max_quantity: i32) -> AddOn {
        AddOn {
            id: id.to_string(),
            name: format!("AddOn {}", id),
            price,
            required,
            max_quantity,
        }
    }

    fn menu(items: Vec<MenuItem>) -> HashMap<String, MenuItem> {
        items.into_iter().map(|m| (m.id.clone(), m)).collect()
    }

    fn request(menu_item_id: &str, quantity: i32, add_ons: Vec<(&str, i32)>) -> OrderItemRequest {
        OrderItemRequest {
            menu_item_id: menu_item_id.to_string(),
            quantity,
            add_ons: add_ons
                .into_iter()
                .map(|(id, quantity)| AddOnRequest {
                    add_on_id: id.to_string(),
                    quantity,
                })
                .collect(),
        }
    }

    #[test]
    fn test_example_totals() {
        // Two items totalling 3000; fee 200; service round(3000×0.05)=150; total 3350
        let menu = menu(vec![
            menu_item("m-1", 1000, vec![]),
            menu_item("m-2", 500, vec![]),
        ]);
        let priced = price_order(
            "v-1",
            &[request("m-1", 2, vec![]), request("m-2", 2, vec![])],
            &menu,
        )
        .unwrap();

        assert_eq!(priced.pricing.subtotal, 3000);
        assert_eq!(priced.pricing.delivery_fee, 200);
        assert_eq!(priced.pricing.service_fee, 150);
        assert_eq!(priced.pricing.total, 3350);
    }

    #[test]
    fn test_add_ons_multiply_into_line_total() {
        let menu = menu(vec![menu_item(
            "m-1",
            1000,
            vec![add_on("a-1", 150, false, 3)],
        )]);
        let priced = price_order("v-1", &[request("m-1", 2, vec![("a-1", 2)])], &menu).unwrap();

        // (1000 + 150·2) × 2 = 2600
        assert_eq!(priced.items[0].total_price, 2600);
        assert_eq!(priced.pricing.subtotal, 2600);
    }

    #[test]
    fn test_service_fee_rounds_half_up() {
        // 1030 × 0.05 = 51.5 → 52
        let menu = menu(vec![menu_item("m-1", 1030, vec![])]);
        let priced = price_order("v-1", &[request("m-1", 1, vec![])], &menu).unwrap();
        assert_eq!(priced.pricing.service_fee, 52);
    }

    #[test]
    fn test_unknown_item_rejected() {
        let menu = menu(vec![]);
        let err = price_order("v-1", &[request("m-9", 1, vec![])], &menu).unwrap_err();
        assert_eq!(err, PricingError::InvalidItem("m-9".to_string()));
    }

    #[test]
    fn test_unavailable_item_rejected() {
        let mut item = menu_item("m-1", 1000, vec![]);
        item.available = false;
        let menu = menu(vec![item]);
        let err = price_order("v-1", &[request("m-1", 1, vec![])], &menu).unwrap_err();
        assert_eq!(err, PricingError::InvalidItem("m-1".to_string()));
    }

    #[test]
    fn test_foreign_vendor_item_rejected() {
        let mut item = menu_item("m-1", 1000, vec![]);
        item.vendor_id = "v-2".to_string();
        let menu = menu(vec![item]);
        let err = price_order("v-1", &[request("m-1", 1, vec![])], &menu).unwrap_err();
        assert!(matches!(err, PricingError::InvalidItem(_)));
    }

    #[test]
    fn test_foreign_add_on_rejected() {
        let menu = menu(vec![menu_item("m-1", 1000, vec![])]);
        let err = price_order("v-1", &[request("m-1", 1, vec![("a-9", 1)])], &menu).unwrap_err();
        assert!(matches!(err, PricingError::InvalidAddOn { .. }));
    }

    #[test]
    fn test_missing_required_add_on_rejected() {
        let menu = menu(vec![menu_item(
            "m-1",
            1000,
            vec![add_on("a-1", 100, true, 2)],
        )]);
        let err = price_order("v-1", &[request("m-1", 1, vec![])], &menu).unwrap_err();
        assert!(matches!(err, PricingError::MissingRequiredAddOn { .. }));
    }

    #[test]
    fn test_add_on_quantity_cap() {
        let menu = menu(vec![menu_item(
            "m-1",
            1000,
            vec![add_on("a-1", 100, false, 2)],
        )]);
        let err = price_order("v-1", &[request("m-1", 1, vec![("a-1", 3)])], &menu).unwrap_err();
        assert!(matches!(
            err,
            PricingError::AddOnQuantityExceeded {
                quantity: 3,
                max_quantity: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_required_reported_before_quantity_cap() {
        // Both violations present: the required-add-on check fires first
        let menu = menu(vec![menu_item(
            "m-1",
            1000,
            vec![add_on("a-req", 100, true, 2), add_on("a-opt", 50, false, 1)],
        )]);
        let err = price_order("v-1", &[request("m-1", 1, vec![("a-opt", 5)])], &menu).unwrap_err();
        assert!(matches!(err, PricingError::MissingRequiredAddOn { .. }));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let menu = menu(vec![menu_item("m-1", 1000, vec![])]);
        let err = price_order("v-1", &[request("m-1", 0, vec![])], &menu).unwrap_err();
        assert!(matches!(err, PricingError::InvalidQuantity { .. }));
    }
}
