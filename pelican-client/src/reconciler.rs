//! Client realtime reconciler
//!
//! Keeps two layers per order:
//!
//! - the **snapshot**: the last authoritative [`OrderView`] fetched over
//!   REST; replaced wholesale by a re-fetch, never merged into
//! - the **overlay**: the most recently pushed value of each individual
//!   field (status, rider, eta), each stamped with its local arrival time
//!
//! Merging is last-write-wins **per field**, not per record: an event
//! carrying only `status` never clobbers a previously known rider. The
//! effective view for display substitutes present overlay fields into the
//! snapshot; without an overlay the snapshot passes through unchanged.

use parking_lot::RwLock;
use serde_json::Value;
use shared::models::{OrderStatus, OrderView, RiderContact};
use shared::realtime::payload::event_names;
use shared::realtime::PushEvent;
use std::collections::HashMap;

/// A field value plus the local time it arrived
#[derive(Debug, Clone, PartialEq)]
pub struct Stamped<T> {
    pub value: T,
    pub received_at: i64,
}

impl<T> Stamped<T> {
    fn new(value: T, received_at: i64) -> Self {
        Self { value, received_at }
    }
}

/// Per-order overlay of push-updated fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderOverlay {
    pub status: Option<Stamped<OrderStatus>>,
    pub rider: Option<Stamped<RiderContact>>,
    pub eta: Option<Stamped<i64>>,
}

impl OrderOverlay {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.rider.is_none() && self.eta.is_none()
    }
}

/// The typed partial update decoded from one push event
///
/// Only the fields present in the event are set; everything else stays
/// `None` and leaves the overlay untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialOrderUpdate {
    pub order_id: String,
    pub status: Option<OrderStatus>,
    pub rider: Option<RiderContact>,
    pub eta: Option<i64>,
}

impl PartialOrderUpdate {
    /// Decode a push event into a partial update
    ///
    /// Unknown events and undecodable payloads yield `None` - the stream
    /// may carry event types this client version does not know.
    pub fn from_event(event: &PushEvent) -> Option<Self> {
        let payload = &event.payload;
        let order_id = payload.get("orderId")?.as_str()?.to_string();

        let mut update = PartialOrderUpdate {
            order_id,
            ..Default::default()
        };

        match event.event.as_str() {
            event_names::ORDER_STATUS_UPDATE => {
                let status = decode_status(payload.get("status")?)?;
                update.status = Some(status);
            }
            event_names::RIDER_ASSIGNED => {
                let rider: RiderContact =
                    serde_json::from_value(payload.get("rider")?.clone()).ok()?;
                update.rider = Some(rider);
            }
            event_names::ETA_UPDATE => {
                update.eta = Some(payload.get("eta")?.as_i64()?);
            }
            event_names::ORDER_CANCELLED => {
                update.status = Some(OrderStatus::Cancelled);
            }
            event_names::ORDER_UPDATED => {
                // Full-order push: only the overlay fields are lifted; the
                // snapshot stays authoritative until the client re-fetches
                let order = payload.get("order")?;
                update.status = decode_status(order.get("status")?);
                update.eta = order
                    .get("estimatedDeliveryTime")
                    .and_then(Value::as_i64);
                if let Some(rider) = order.get("rider") {
                    update.rider = serde_json::from_value(rider.clone()).ok();
                }
            }
            _ => return None,
        }

        Some(update)
    }
}

fn decode_status(value: &Value) -> Option<OrderStatus> {
    serde_json::from_value(value.clone()).ok()
}

/// The merged view handed to the UI
#[derive(Debug, Clone, PartialEq)]
pub struct LiveOrder {
    pub order: OrderView,
    /// Whether any overlay field is substituted in
    pub is_realtime: bool,
}

/// Snapshot + overlay store for all orders this client observes
#[derive(Debug, Default)]
pub struct OrderReconciler {
    snapshots: RwLock<HashMap<String, OrderView>>,
    overlays: RwLock<HashMap<String, OrderOverlay>>,
}

impl OrderReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or replace) the authoritative snapshot for an order
    ///
    /// A re-fetch replaces the snapshot wholesale; the overlay persists
    /// until newer events supersede each field.
    pub fn replace_snapshot(&self, view: OrderView) {
        self.snapshots.write().insert(view.id.clone(), view);
    }

    /// Apply one push event; only the fields it carries move
    ///
    /// Returns the decoded partial update when the event was relevant.
    pub fn apply_event(&self, event: &PushEvent) -> Option<PartialOrderUpdate> {
        let update = PartialOrderUpdate::from_event(event)?;
        let received_at = shared::util::now_millis();

        let mut overlays = self.overlays.write();
        let overlay = overlays.entry(update.order_id.clone()).or_default();
        if let Some(status) = update.status {
            overlay.status = Some(Stamped::new(status, received_at));
        }
        if let Some(rider) = update.rider.clone() {
            overlay.rider = Some(Stamped::new(rider, received_at));
        }
        if let Some(eta) = update.eta {
            overlay.eta = Some(Stamped::new(eta, received_at));
        }

        Some(update)
    }

    /// The view for display: snapshot with overlay fields substituted
    ///
    /// `None` when no snapshot is cached yet (overlay-only orders are not
    /// renderable). Without an overlay the snapshot is returned unchanged
    /// with `is_realtime = false`.
    pub fn effective_view(&self, order_id: &str) -> Option<LiveOrder> {
        let mut order = self.snapshots.read().get(order_id)?.clone();

        let overlays = self.overlays.read();
        let Some(overlay) = overlays.get(order_id).filter(|o| !o.is_empty()) else {
            return Some(LiveOrder {
                order,
                is_realtime: false,
            });
        };

        if let Some(status) = &overlay.status {
            order.status = status.value;
        }
        if let Some(rider) = &overlay.rider {
            order.rider = Some(rider.value.clone());
        }
        if let Some(eta) = &overlay.eta {
            order.estimated_delivery_time = Some(eta.value);
        }

        Some(LiveOrder {
            order,
            is_realtime: true,
        })
    }

    /// Current overlay for an order, if any
    pub fn overlay(&self, order_id: &str) -> Option<OrderOverlay> {
        self.overlays.read().get(order_id).cloned()
    }

    /// Drop both layers for an order (stale-order eviction)
    pub fn evict(&self, order_id: &str) {
        self.snapshots.write().remove(order_id);
        self.overlays.write().remove(order_id);
    }

    /// Number of cached snapshots
    pub fn len(&self) -> usize {
        self.snapshots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::models::{DeliveryAddress, GeoPoint, Pricing, VendorSummary};
    use shared::realtime::Channel;

    fn snapshot(order_id: &str, status: OrderStatus) -> OrderView {
        OrderView {
            id: order_id.to_string(),
            order_number: "PEL2025080810001".to_string(),
            status,
            vendor: VendorSummary {
                id: "v-1".to_string(),
                name: "Thai Corner".to_string(),
                address: "1 Vendor St".to_string(),
            },
            customer_id: "c-1".to_string(),
            rider: None,
            items: vec![],
            pricing: Pricing::new(3000, 200, 150),
            delivery_address: DeliveryAddress {
                label: "Home".to_string(),
                text: "2 Customer Ave".to_string(),
                location: GeoPoint { lat: 0.0, lng: 0.0 },
            },
            special_instructions: None,
            cancelled_at: None,
            cancellation_reason: None,
            estimated_delivery_time: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn push(event: &str, payload: Value) -> PushEvent {
        PushEvent::new(&Channel::order("o-1"), event, payload)
    }

    fn rider_json() -> Value {
        json!({
            "id": "r-1",
            "name": "Marta",
            "phone": "+34600000000",
            "vehicleType": "motorbike"
        })
    }

    #[test]
    fn test_status_only_event_keeps_rider_overlay() {
        let reconciler = OrderReconciler::new();
        reconciler.replace_snapshot(snapshot("o-1", OrderStatus::Preparing));

        // Rider arrives first
        reconciler.apply_event(&push(
            event_names::RIDER_ASSIGNED,
            json!({"orderId": "o-1", "rider": rider_json(), "timestamp": 1}),
        ));

        // Then a status-only event - it must not clobber the rider field
        reconciler.apply_event(&push(
            event_names::ORDER_STATUS_UPDATE,
            json!({"orderId": "o-1", "status": "READY_FOR_PICKUP", "timestamp": 2}),
        ));

        let live = reconciler.effective_view("o-1").unwrap();
        assert!(live.is_realtime);
        assert_eq!(live.order.status, OrderStatus::ReadyForPickup);
        assert_eq!(live.order.rider.as_ref().unwrap().name, "Marta");
    }

    #[test]
    fn test_no_overlay_passes_snapshot_through() {
        let reconciler = OrderReconciler::new();
        reconciler.replace_snapshot(snapshot("o-1", OrderStatus::Preparing));

        let live = reconciler.effective_view("o-1").unwrap();
        assert!(!live.is_realtime);
        assert_eq!(live.order.status, OrderStatus::Preparing);
    }

    #[test]
    fn test_no_snapshot_yields_nothing() {
        let reconciler = OrderReconciler::new();
        reconciler.apply_event(&push(
            event_names::ORDER_STATUS_UPDATE,
            json!({"orderId": "o-1", "status": "CONFIRMED", "timestamp": 1}),
        ));
        assert!(reconciler.effective_view("o-1").is_none());
    }

    #[test]
    fn test_refetch_replaces_snapshot_but_overlay_persists() {
        let reconciler = OrderReconciler::new();
        reconciler.replace_snapshot(snapshot("o-1", OrderStatus::Pending));

        reconciler.apply_event(&push(
            event_names::ETA_UPDATE,
            json!({"orderId": "o-1", "eta": 1234, "timestamp": 1}),
        ));

        // Authoritative re-fetch: newer snapshot, replaced not merged
        reconciler.replace_snapshot(snapshot("o-1", OrderStatus::Confirmed));

        let live = reconciler.effective_view("o-1").unwrap();
        assert_eq!(live.order.status, OrderStatus::Confirmed);
        // The eta overlay outlives the snapshot swap
        assert_eq!(live.order.estimated_delivery_time, Some(1234));
        assert!(live.is_realtime);
    }

    #[test]
    fn test_later_event_wins_per_field() {
        let reconciler = OrderReconciler::new();
        reconciler.replace_snapshot(snapshot("o-1", OrderStatus::Pending));

        reconciler.apply_event(&push(
            event_names::ORDER_STATUS_UPDATE,
            json!({"orderId": "o-1", "status": "CONFIRMED", "timestamp": 1}),
        ));
        reconciler.apply_event(&push(
            event_names::ORDER_STATUS_UPDATE,
            json!({"orderId": "o-1", "status": "PREPARING", "timestamp": 2}),
        ));

        let live = reconciler.effective_view("o-1").unwrap();
        assert_eq!(live.order.status, OrderStatus::Preparing);
    }

    #[test]
    fn test_cancellation_event_maps_to_status() {
        let reconciler = OrderReconciler::new();
        reconciler.replace_snapshot(snapshot("o-1", OrderStatus::Pending));

        reconciler.apply_event(&push(
            event_names::ORDER_CANCELLED,
            json!({"orderId": "o-1", "reason": "out of stock", "timestamp": 1}),
        ));

        let live = reconciler.effective_view("o-1").unwrap();
        assert_eq!(live.order.status, OrderStatus::Cancelled);
    }

    #[test]
    fn test_unknown_event_ignored() {
        let reconciler = OrderReconciler::new();
        reconciler.replace_snapshot(snapshot("o-1", OrderStatus::Pending));

        let ignored = reconciler.apply_event(&push(
            "SOMETHING_NEW",
            json!({"orderId": "o-1", "whatever": true}),
        ));
        assert!(ignored.is_none());
        assert!(reconciler.overlay("o-1").is_none());
    }

    #[test]
    fn test_order_updated_lifts_overlay_fields() {
        let reconciler = OrderReconciler::new();
        reconciler.replace_snapshot(snapshot("o-1", OrderStatus::Pending));

        let mut order = snapshot("o-1", OrderStatus::OutForDelivery);
        order.estimated_delivery_time = Some(9999);
        reconciler.apply_event(&push(
            event_names::ORDER_UPDATED,
            json!({"orderId": "o-1", "order": order, "timestamp": 5}),
        ));

        let live = reconciler.effective_view("o-1").unwrap();
        assert_eq!(live.order.status, OrderStatus::OutForDelivery);
        assert_eq!(live.order.estimated_delivery_time, Some(9999));
    }

    #[test]
    fn test_evict_drops_both_layers() {
        let reconciler = OrderReconciler::new();
        reconciler.replace_snapshot(snapshot("o-1", OrderStatus::Pending));
        reconciler.apply_event(&push(
            event_names::ETA_UPDATE,
            json!({"orderId": "o-1", "eta": 1, "timestamp": 1}),
        ));

        reconciler.evict("o-1");
        assert!(reconciler.effective_view("o-1").is_none());
        assert!(reconciler.overlay("o-1").is_none());
        assert!(reconciler.is_empty());
    }
}
