//! Order model - the aggregate tracked through the fulfillment lifecycle
//!
//! Monetary amounts are integer minor units (cents). The pricing invariant
//! `total == subtotal + delivery_fee + service_fee` is established by the
//! pricing calculator and must survive every mutation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order lifecycle status
///
/// Forward pipeline:
/// `PENDING → CONFIRMED → PREPARING → READY_FOR_PICKUP → ASSIGNED →
/// PICKED_UP → OUT_FOR_DELIVERY → DELIVERED`, with `CANCELLED` reachable
/// from the cancellable subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    ReadyForPickup,
    Assigned,
    PickedUp,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Terminal statuses admit no further transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Statuses from which an order may still be cancelled
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending
                | OrderStatus::Confirmed
                | OrderStatus::Preparing
                | OrderStatus::Assigned
        )
    }

    /// Statuses during which `rider_id` must be set
    pub fn requires_rider(&self) -> bool {
        matches!(
            self,
            OrderStatus::Assigned
                | OrderStatus::PickedUp
                | OrderStatus::OutForDelivery
                | OrderStatus::Delivered
        )
    }

    /// Position in the forward pipeline; `None` for CANCELLED
    pub fn rank(&self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Confirmed => Some(1),
            OrderStatus::Preparing => Some(2),
            OrderStatus::ReadyForPickup => Some(3),
            OrderStatus::Assigned => Some(4),
            OrderStatus::PickedUp => Some(5),
            OrderStatus::OutForDelivery => Some(6),
            OrderStatus::Delivered => Some(7),
            OrderStatus::Cancelled => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::ReadyForPickup => "READY_FOR_PICKUP",
            OrderStatus::Assigned => "ASSIGNED",
            OrderStatus::PickedUp => "PICKED_UP",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{}", s)
    }
}

/// WGS84 coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Delivery destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    /// Short label chosen by the customer ("Home", "Office")
    pub label: String,
    /// Free-text address line
    pub text: String,
    pub location: GeoPoint,
}

/// Selected add-on, snapshotted at order time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOnSelection {
    pub add_on_id: String,
    /// Name snapshot for receipts
    pub name: String,
    pub quantity: i32,
    /// Unit price in cents at order time
    pub price: i64,
}

/// Order line item - immutable snapshot of the catalog item at order time
///
/// Invariant: `total_price == (unit_price + Σ add_on.price · add_on.quantity) · quantity`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub menu_item_id: String,
    /// Name snapshot at order time
    pub name: String,
    pub quantity: i32,
    /// Unit price in cents at order time
    pub unit_price: i64,
    /// Line total in cents, add-ons included
    pub total_price: i64,
    #[serde(default)]
    pub add_ons: Vec<AddOnSelection>,
}

/// Pricing breakdown in cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    pub subtotal: i64,
    pub delivery_fee: i64,
    pub service_fee: i64,
    pub total: i64,
}

impl Pricing {
    /// Build a breakdown; `total` is always derived, never supplied
    pub fn new(subtotal: i64, delivery_fee: i64, service_fee: i64) -> Self {
        Self {
            subtotal,
            delivery_fee,
            service_fee,
            total: subtotal + delivery_fee + service_fee,
        }
    }
}

/// The order aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    /// Human-readable order number (server-generated, e.g. PEL20250808-10001)
    pub order_number: String,
    pub status: OrderStatus,
    pub vendor_id: String,
    pub customer_id: String,
    /// Set only while status ∈ {ASSIGNED, PICKED_UP, OUT_FOR_DELIVERY, DELIVERED}
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rider_id: Option<String>,
    pub items: Vec<OrderItem>,
    pub pricing: Pricing,
    pub delivery_address: DeliveryAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    /// Estimated delivery time (unix millis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_delivery_time: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// One-line item summary for dispatch job cards ("2x Pad Thai, 1x Satay")
    pub fn item_summary(&self) -> String {
        self.items
            .iter()
            .map(|i| format!("{}x {}", i.quantity, i.name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
