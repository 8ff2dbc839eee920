//! Wire projection of an order - the shape every order-reading endpoint
//! returns and clients cache as their authoritative snapshot

use super::order::{DeliveryAddress, OrderItem, OrderStatus, Pricing};
use super::rider::RiderContact;
use serde::{Deserialize, Serialize};

/// Vendor display fields embedded in the projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorSummary {
    pub id: String,
    pub name: String,
    pub address: String,
}

/// The formatted order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: String,
    pub order_number: String,
    pub status: OrderStatus,
    pub vendor: VendorSummary,
    pub customer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rider: Option<RiderContact>,
    pub items: Vec<OrderItem>,
    pub pricing: Pricing,
    pub delivery_address: DeliveryAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_delivery_time: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A page of projections
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    pub orders: Vec<OrderView>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}
