//! Delivery Dispatch Broadcaster
//!
//! Turns a READY_FOR_PICKUP order into a [`DeliveryJob`] on the dispatch
//! queue and tells the courier fleet about it. Runs in two modes:
//!
//! - synchronously after a status transition (spawned, never awaited by the
//!   request path)
//! - as the backlog sweep, re-offering unmatched ready orders with a
//!   throttle between broadcasts
//!
//! Zero available couriers does NOT abort a broadcast: the job is queued
//! anyway so a courier coming online later can still be matched. Per-order
//! failures are logged with order identifiers and never stop the sweep.

use super::geo::haversine_km;
use super::queue::{DispatchQueue, EnqueueError};
use crate::catalog::CatalogService;
use crate::orders::{OrderStorage, StorageError};
use crate::realtime::RealtimeHub;
use shared::dispatch::{DeliveryJob, JOB_TTL_MILLIS};
use shared::models::Order;
use shared::realtime::payload::{event_names, OrderAvailablePayload};
use shared::realtime::Channel;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Broadcast failures - always caught and logged, never propagated to the
/// transition that triggered the broadcast
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Vendor {0} not found in catalog")]
    VendorNotFound(String),

    #[error(transparent)]
    Enqueue(#[from] EnqueueError),
}

/// Outcome of one backlog sweep
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Ready-unassigned orders found
    pub found: usize,
    /// Successfully broadcast
    pub broadcast: usize,
    /// Per-order failures: (order_id, error)
    pub errors: Vec<(String, String)>,
}

/// The broadcaster service
#[derive(Clone, Debug)]
pub struct DispatchBroadcaster {
    storage: OrderStorage,
    catalog: Arc<CatalogService>,
    queue: DispatchQueue,
    hub: RealtimeHub,
    /// Pause between consecutive sweep broadcasts (courier-client rate limit)
    throttle: Duration,
}

impl DispatchBroadcaster {
    pub fn new(
        storage: OrderStorage,
        catalog: Arc<CatalogService>,
        queue: DispatchQueue,
        hub: RealtimeHub,
        throttle: Duration,
    ) -> Self {
        Self {
            storage,
            catalog,
            queue,
            hub,
            throttle,
        }
    }

    /// Offer one ready order to the fleet
    ///
    /// `reason` distinguishes a re-broadcast (rider dropped the job) from a
    /// first offer in the courier-facing payload.
    pub async fn broadcast_order(
        &self,
        order: &Order,
        reason: Option<String>,
    ) -> Result<(), DispatchError> {
        // Step 1 - availability probe. Zero couriers is informational only.
        let available = self.storage.count_dispatchable_riders()?;
        if available == 0 {
            tracing::info!(
                order_id = %order.id,
                "No dispatchable couriers right now, queueing job anyway"
            );
        }

        // Step 2 - build the job card
        let job = self.build_job(order)?;
        let distance_km = job.distance_km;

        // Step 3 - enqueue for the matching consumer
        self.queue.enqueue(job).await?;

        self.hub.publish(
            &Channel::Couriers,
            event_names::ORDER_AVAILABLE_FOR_PICKUP,
            serde_json::to_value(OrderAvailablePayload {
                order_id: order.id.clone(),
                message: format!("Order {} available for pickup", order.order_number),
                reason,
            })
            .unwrap_or_default(),
        );

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            available_couriers = available,
            distance_km = format!("{:.2}", distance_km),
            "Delivery job broadcast"
        );
        Ok(())
    }

    fn build_job(&self, order: &Order) -> Result<DeliveryJob, DispatchError> {
        let vendor = self
            .catalog
            .vendor(&order.vendor_id)
            .ok_or_else(|| DispatchError::VendorNotFound(order.vendor_id.clone()))?;

        let distance_km = haversine_km(vendor.location, order.delivery_address.location);
        let now = shared::util::now_millis();

        Ok(DeliveryJob {
            order_id: order.id.clone(),
            order_number: order.order_number.clone(),
            vendor_id: vendor.id,
            vendor_name: vendor.name,
            customer_id: order.customer_id.clone(),
            customer_name: order.customer_id.clone(),
            pickup_address: vendor.address,
            pickup_location: vendor.location,
            delivery_address: order.delivery_address.clone(),
            delivery_fee: order.pricing.delivery_fee,
            distance_km,
            item_summary: order.item_summary(),
            created_at: now,
            expires_at: now + JOB_TTL_MILLIS,
        })
    }

    /// Re-offer every unmatched READY_FOR_PICKUP order, oldest first
    ///
    /// One order's failure never fails the sweep; the report carries the
    /// individual errors. The throttle between broadcasts runs on this
    /// (background) path only.
    pub async fn sweep_backlog(&self) -> SweepReport {
        let mut report = SweepReport::default();

        let backlog = match self.storage.ready_unassigned_orders() {
            Ok(orders) => orders,
            Err(e) => {
                tracing::error!(error = %e, "Backlog sweep could not read ready orders");
                report.errors.push(("<scan>".to_string(), e.to_string()));
                return report;
            }
        };

        report.found = backlog.len();
        if backlog.is_empty() {
            return report;
        }
        tracing::info!(count = report.found, "Backlog sweep started");

        for (i, order) in backlog.iter().enumerate() {
            if i > 0 && !self.throttle.is_zero() {
                // Rate limit so the fleet is not flooded with offers
                tokio::time::sleep(self.throttle).await;
            }
            match self.broadcast_order(order, None).await {
                Ok(()) => report.broadcast += 1,
                Err(e) => {
                    tracing::warn!(
                        order_id = %order.id,
                        order_number = %order.order_number,
                        error = %e,
                        "Backlog sweep failed to broadcast order"
                    );
                    report.errors.push((order.id.clone(), e.to_string()));
                }
            }
        }

        tracing::info!(
            found = report.found,
            broadcast = report.broadcast,
            failed = report.errors.len(),
            "Backlog sweep finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{
        DeliveryAddress, GeoPoint, OrderStatus, Pricing, RiderProfile, VehicleType, Vendor,
    };

    fn vendor(id: &str) -> Vendor {
        Vendor {
            id: id.to_string(),
            name: format!("Vendor {}", id),
            active: true,
            address: "1 Vendor St".to_string(),
            location: GeoPoint {
                lat: 41.3874,
                lng: 2.1686,
            },
        }
    }

    fn ready_order(id: &str, vendor_id: &str, created_at: i64) -> Order {
        Order {
            id: id.to_string(),
            order_number: format!("PEL20250808{}", id),
            status: OrderStatus::ReadyForPickup,
            vendor_id: vendor_id.to_string(),
            customer_id: "c-1".to_string(),
            rider_id: None,
            items: vec![],
            pricing: Pricing::new(1000, 200, 50),
            delivery_address: DeliveryAddress {
                label: "Home".to_string(),
                text: "2 Customer Ave".to_string(),
                location: GeoPoint {
                    lat: 41.40,
                    lng: 2.17,
                },
            },
            special_instructions: None,
            cancelled_at: None,
            cancellation_reason: None,
            estimated_delivery_time: None,
            created_at,
            updated_at: created_at,
        }
    }

    fn broadcaster() -> (
        DispatchBroadcaster,
        OrderStorage,
        Arc<CatalogService>,
        tokio::sync::mpsc::Receiver<DeliveryJob>,
    ) {
        let storage = OrderStorage::open_in_memory().unwrap();
        let catalog = Arc::new(CatalogService::new());
        let (queue, rx) = DispatchQueue::new(16);
        let hub = RealtimeHub::new();
        let b = DispatchBroadcaster::new(
            storage.clone(),
            catalog.clone(),
            queue,
            hub,
            Duration::ZERO,
        );
        (b, storage, catalog, rx)
    }

    #[tokio::test]
    async fn test_zero_couriers_still_enqueues() {
        let (b, _storage, catalog, mut rx) = broadcaster();
        catalog.upsert_vendor(vendor("v-1"));

        let order = ready_order("o-1", "v-1", 1000);
        b.broadcast_order(&order, None).await.unwrap();

        let job = rx.recv().await.unwrap();
        assert_eq!(job.order_id, "o-1");
        assert_eq!(job.pickup_address, "1 Vendor St");
        assert!(job.distance_km > 0.0);
        assert_eq!(job.expires_at - job.created_at, JOB_TTL_MILLIS);
    }

    #[tokio::test]
    async fn test_broadcast_publishes_to_couriers() {
        let (b, _storage, catalog, _rx) = broadcaster();
        catalog.upsert_vendor(vendor("v-1"));
        let mut courier_rx = b.hub.subscribe(&Channel::Couriers);

        let order = ready_order("o-1", "v-1", 1000);
        b.broadcast_order(&order, Some("rider_cancelled".to_string()))
            .await
            .unwrap();

        let event = courier_rx.recv().await.unwrap();
        assert_eq!(event.event, event_names::ORDER_AVAILABLE_FOR_PICKUP);
        assert_eq!(event.payload["orderId"], "o-1");
        assert_eq!(event.payload["reason"], "rider_cancelled");
    }

    #[tokio::test]
    async fn test_sweep_reports_partial_failure() {
        let (b, storage, catalog, mut rx) = broadcaster();
        catalog.upsert_vendor(vendor("v-1"));
        // v-ghost is missing from the catalog - its order must fail alone

        for i in 0..5 {
            let vendor_id = if i == 2 { "v-ghost" } else { "v-1" };
            storage
                .create_order(&ready_order(&format!("o-{}", i), vendor_id, 1000 + i))
                .unwrap();
        }

        let report = b.sweep_backlog().await;
        assert_eq!(report.found, 5);
        assert_eq!(report.broadcast, 4);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].0, "o-2");

        let mut seen = Vec::new();
        while let Ok(job) = rx.try_recv() {
            seen.push(job.order_id);
        }
        assert_eq!(seen.len(), 4);
        assert!(!seen.contains(&"o-2".to_string()));
    }

    #[tokio::test]
    async fn test_sweep_skips_assigned_and_other_statuses() {
        let (b, storage, catalog, mut rx) = broadcaster();
        catalog.upsert_vendor(vendor("v-1"));

        storage
            .create_order(&ready_order("o-ready", "v-1", 1000))
            .unwrap();
        let mut assigned = ready_order("o-assigned", "v-1", 1001);
        assigned.rider_id = Some("r-1".to_string());
        storage.create_order(&assigned).unwrap();
        let mut pending = ready_order("o-pending", "v-1", 1002);
        pending.status = OrderStatus::Pending;
        storage.create_order(&pending).unwrap();

        let report = b.sweep_backlog().await;
        assert_eq!(report.found, 1);
        assert_eq!(report.broadcast, 1);

        let job = rx.recv().await.unwrap();
        assert_eq!(job.order_id, "o-ready");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_probe_counts_only_dispatchable() {
        let (b, storage, catalog, mut rx) = broadcaster();
        catalog.upsert_vendor(vendor("v-1"));
        storage
            .upsert_rider(&RiderProfile {
                id: "r-1".to_string(),
                name: "Rider".to_string(),
                phone: "+34".to_string(),
                vehicle_type: VehicleType::Bicycle,
                online: true,
                available: true,
                location: Some(GeoPoint { lat: 0.0, lng: 0.0 }),
                updated_at: 0,
            })
            .unwrap();

        let order = ready_order("o-1", "v-1", 1000);
        b.broadcast_order(&order, None).await.unwrap();
        assert!(rx.recv().await.is_some());
    }
}
