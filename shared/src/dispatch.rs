//! Delivery job - the ephemeral dispatch card offered to couriers
//!
//! Jobs live only in the dispatch queue; they are never persisted. A job
//! not claimed before `expires_at` is simply dropped by the consumer.

use crate::models::{DeliveryAddress, GeoPoint};
use serde::{Deserialize, Serialize};

/// Job lifetime: 5 minutes from creation
pub const JOB_TTL_MILLIS: i64 = 5 * 60 * 1000;

/// A dispatch offer for one ready order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryJob {
    pub order_id: String,
    pub order_number: String,
    pub vendor_id: String,
    pub vendor_name: String,
    pub customer_id: String,
    pub customer_name: String,
    /// Vendor's registered address
    pub pickup_address: String,
    pub pickup_location: GeoPoint,
    pub delivery_address: DeliveryAddress,
    /// Fee the rider earns, in cents
    pub delivery_fee: i64,
    /// Great-circle vendor→customer distance in km
    pub distance_km: f64,
    /// One-line item summary ("2x Pad Thai, 1x Satay")
    pub item_summary: String,
    pub created_at: i64,
    pub expires_at: i64,
}

impl DeliveryJob {
    /// Whether the job has outlived its offer window
    pub fn is_expired(&self, now_millis: i64) -> bool {
        now_millis >= self.expires_at
    }
}
