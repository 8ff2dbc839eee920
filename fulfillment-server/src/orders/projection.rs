//! Order projection - the one response shape every read goes through
//!
//! A single explicit "hydrate order for response" step: the stored order
//! plus exactly the vendor and rider display fields the clients render.
//! Every REST endpoint and the `ORDER_UPDATED` push payload use this shape,
//! so there is exactly one place that decides what an order looks like on
//! the wire. The [`OrderView`] type itself lives in `shared` - clients
//! cache it as their authoritative snapshot.

use crate::catalog::CatalogService;
use crate::orders::storage::OrderStorage;
use shared::models::{Order, OrderView, VendorSummary};

pub use shared::models::OrderPage;

/// Hydrate one order into its response projection
///
/// Vendor display data comes from the catalog read model, rider contact
/// from storage; both lookups are tolerant - a missing record degrades to
/// id-only display instead of failing the read.
pub fn hydrate_order(order: Order, catalog: &CatalogService, storage: &OrderStorage) -> OrderView {
    let vendor = match catalog.vendor(&order.vendor_id) {
        Some(v) => VendorSummary {
            id: v.id,
            name: v.name,
            address: v.address,
        },
        None => VendorSummary {
            id: order.vendor_id.clone(),
            name: order.vendor_id.clone(),
            address: String::new(),
        },
    };

    let rider = order.rider_id.as_ref().and_then(|rider_id| {
        storage
            .get_rider(rider_id)
            .ok()
            .flatten()
            .map(|r| r.contact())
    });

    OrderView {
        id: order.id,
        order_number: order.order_number,
        status: order.status,
        vendor,
        customer_id: order.customer_id,
        rider,
        items: order.items,
        pricing: order.pricing,
        delivery_address: order.delivery_address,
        special_instructions: order.special_instructions,
        cancelled_at: order.cancelled_at,
        cancellation_reason: order.cancellation_reason,
        estimated_delivery_time: order.estimated_delivery_time,
        created_at: order.created_at,
        updated_at: order.updated_at,
    }
}
