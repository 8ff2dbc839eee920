//! Wire payloads for push events
//!
//! Field names are camelCase on the wire; payloads stay minimal so mobile
//! clients can decode them without the full order model.

use crate::models::{OrderStatus, RiderContact};
use serde::{Deserialize, Serialize};

/// Event name constants
///
/// Uppercase names address apps (vendor/courier fleet screens); lowercase
/// names address the customer-facing overlay stream.
pub mod event_names {
    pub const NEW_ORDER: &str = "NEW_ORDER";
    pub const ORDER_UPDATED: &str = "ORDER_UPDATED";
    pub const ORDER_AVAILABLE_FOR_PICKUP: &str = "ORDER_AVAILABLE_FOR_PICKUP";
    pub const ORDER_STATUS_UPDATE: &str = "order_status_update";
    pub const RIDER_ASSIGNED: &str = "rider_assigned";
    pub const ORDER_CANCELLED: &str = "order_cancelled";
    pub const ETA_UPDATE: &str = "eta_update";
}

/// Minimal status push to the customer channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusUpdatePayload {
    pub order_id: String,
    pub status: OrderStatus,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rider_id: Option<String>,
}

/// Rider contact push after assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiderAssignedPayload {
    pub order_id: String,
    pub rider: RiderContact,
    pub timestamp: i64,
}

/// Cancellation push on the order channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCancelledPayload {
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub timestamp: i64,
}

/// ETA refresh push
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtaUpdatePayload {
    pub order_id: String,
    /// Estimated delivery time (unix millis)
    pub eta: i64,
    pub timestamp: i64,
}

/// Re-broadcast to the courier fleet when an order becomes available again
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAvailablePayload {
    pub order_id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
