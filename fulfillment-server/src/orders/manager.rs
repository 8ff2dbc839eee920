//! OrderManager - the order lifecycle state machine
//!
//! Owns every order mutation: create, role-gated status updates, cancel,
//! role-scoped queries. One service value, constructed once at startup with
//! its collaborators injected - storage, catalog read model, realtime hub,
//! dispatch broadcaster, notification service.
//!
//! # Mutation flow
//!
//! ```text
//! request
//!     ├─ 1. load order
//!     ├─ 2. authorize (role gate + ownership)
//!     ├─ 3. guarded CAS write (status re-checked inside the transaction)
//!     ├─ 4. synchronous side effects (rider availability flips)
//!     ├─ 5. fire-and-forget side effects (dispatch, pushes, notifications)
//!     └─ 6. hydrated projection back to the caller
//! ```
//!
//! Steps 5 never fail the request: the transition is already committed, a
//! push or broadcast failure is logged and swallowed.

use crate::catalog::CatalogService;
use crate::dispatch::DispatchBroadcaster;
use crate::notify::NotificationService;
use crate::orders::projection::hydrate_order;
use shared::models::{OrderPage, OrderView};
use crate::orders::storage::{OrderFilter, OrderStorage};
use crate::orders::transitions;
use crate::pricing::{price_order, OrderItemRequest};
use crate::realtime::RealtimeHub;
use serde::Deserialize;
use serde_json::json;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Actor, ActorRole, DeliveryAddress, Order, OrderStatus};
use shared::notification::{NotificationPriority, NotificationTarget, OutboundNotification};
use shared::realtime::payload::{
    event_names, EtaUpdatePayload, OrderCancelledPayload, OrderStatusUpdatePayload,
    RiderAssignedPayload,
};
use shared::realtime::Channel;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

/// Vendor "new order" notification is deferred so a burst of creates does
/// not hammer vendor devices; the delay is carried on the envelope
const NEW_ORDER_NOTIFY_DELAY_MS: u64 = 2_000;

/// rider_assigned trails order_status_update so the lighter status push
/// renders before the rider card
const RIDER_ASSIGNED_PUSH_DELAY: Duration = Duration::from_millis(300);

const DEFAULT_PAGE_LIMIT: usize = 20;
const MAX_PAGE_LIMIT: usize = 100;

/// Create-order request body
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub vendor_id: String,
    #[validate(length(min = 1, message = "order must contain at least one item"))]
    pub items: Vec<OrderItemRequest>,
    pub delivery_address: DeliveryAddress,
    #[serde(default)]
    pub special_instructions: Option<String>,
}

/// Status-update request body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    #[serde(default)]
    pub rider_id: Option<String>,
    /// Estimated delivery time (unix millis)
    #[serde(default)]
    pub estimated_delivery_time: Option<i64>,
}

/// Cancel request body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// List query, already parsed by the API layer
#[derive(Debug, Clone, Default)]
pub struct OrderListQuery {
    pub vendor_id: Option<String>,
    pub customer_id: Option<String>,
    pub rider_id: Option<String>,
    pub statuses: Option<Vec<OrderStatus>>,
    pub created_from: Option<i64>,
    pub created_to: Option<i64>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// The lifecycle manager service
#[derive(Clone, Debug)]
pub struct OrderManager {
    storage: OrderStorage,
    catalog: Arc<CatalogService>,
    hub: RealtimeHub,
    dispatcher: DispatchBroadcaster,
    notifier: NotificationService,
}

impl OrderManager {
    pub fn new(
        storage: OrderStorage,
        catalog: Arc<CatalogService>,
        hub: RealtimeHub,
        dispatcher: DispatchBroadcaster,
        notifier: NotificationService,
    ) -> Self {
        Self {
            storage,
            catalog,
            hub,
            dispatcher,
            notifier,
        }
    }

    // ========== Create ==========

    /// Create a new order for `customer_id`
    ///
    /// Verifies the vendor, runs the pricing calculator against the
    /// vendor's catalog records, persists order + items atomically, then
    /// fans out `NEW_ORDER` and the deferred vendor notification.
    pub fn create_order(
        &self,
        customer_id: &str,
        request: &CreateOrderRequest,
    ) -> AppResult<OrderView> {
        request
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        let vendor = self
            .catalog
            .vendor(&request.vendor_id)
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::VendorNotFound,
                    format!("vendor {} not found", request.vendor_id),
                )
            })?;
        if !vendor.active {
            return Err(AppError::with_message(
                ErrorCode::VendorInactive,
                format!("vendor {} is not accepting orders", vendor.id),
            ));
        }

        let item_ids: Vec<String> = request
            .items
            .iter()
            .map(|i| i.menu_item_id.clone())
            .collect();
        let menu: HashMap<_, _> = self
            .catalog
            .menu_items_batch(&item_ids)
            .into_iter()
            .map(|m| (m.id.clone(), m))
            .collect();

        let priced = price_order(&vendor.id, &request.items, &menu)?;

        let now = shared::util::now_millis();
        let order = Order {
            id: shared::util::new_id(),
            order_number: self.storage.next_order_number()?,
            status: OrderStatus::Pending,
            vendor_id: vendor.id.clone(),
            customer_id: customer_id.to_string(),
            rider_id: None,
            items: priced.items,
            pricing: priced.pricing,
            delivery_address: request.delivery_address.clone(),
            special_instructions: request.special_instructions.clone(),
            cancelled_at: None,
            cancellation_reason: None,
            estimated_delivery_time: None,
            created_at: now,
            updated_at: now,
        };

        self.storage.create_order(&order)?;
        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            vendor_id = %order.vendor_id,
            total = order.pricing.total,
            "Order created"
        );

        let view = hydrate_order(order.clone(), &self.catalog, &self.storage);

        // Fan out after commit; none of this can fail the create
        let new_order_payload = json!({
            "orderId": order.id,
            "order": &view,
            "timestamp": now,
        });
        for channel in [
            Channel::vendor(&order.vendor_id),
            Channel::vendor_orders(&order.vendor_id),
            Channel::Couriers,
            Channel::order(&order.id),
        ] {
            self.hub
                .publish(&channel, event_names::NEW_ORDER, new_order_payload.clone());
        }

        self.notifier.enqueue(
            OutboundNotification::new(
                NotificationTarget::Vendor,
                &order.vendor_id,
                "new_order",
                "New order",
                format!("Order {} · {}", order.order_number, order.item_summary()),
            )
            .with_data(json!({"orderId": order.id}))
            .with_priority(NotificationPriority::High)
            .with_delay_ms(NEW_ORDER_NOTIFY_DELAY_MS),
        );

        Ok(view)
    }

    // ========== Status updates ==========

    /// Move an order to `target` on behalf of `actor`
    ///
    /// The permission table gates (role, target); the write is a CAS on the
    /// status loaded here, so two concurrent writers resolve to exactly one
    /// winner and one `Conflict`.
    pub fn update_status(
        &self,
        order_id: &str,
        actor: &Actor,
        request: &UpdateStatusRequest,
    ) -> AppResult<OrderView> {
        let order = self.load_order(order_id)?;
        let target = request.status;

        transitions::authorize_transition(actor, &order, target)?;

        // ASSIGNED needs a rider on the order - either supplied now or set earlier
        let rider_for_update = request.rider_id.clone().or_else(|| order.rider_id.clone());
        if target == OrderStatus::Assigned {
            let rider_id = rider_for_update.as_deref().ok_or_else(|| {
                AppError::validation("riderId is required when assigning an order")
                    .with_detail("field", "riderId")
            })?;
            if self.storage.get_rider(rider_id)?.is_none() {
                return Err(AppError::with_message(
                    ErrorCode::RiderNotFound,
                    format!("rider {} not found", rider_id),
                ));
            }
        }

        let supplied_rider = request.rider_id.clone();
        let eta = request.estimated_delivery_time;
        let updated = self
            .storage
            .update_order_guarded(order_id, order.status, move |o| {
                o.status = target;
                // rider_id may only be set while a rider actually holds the
                // order; an admin repair back down the pipeline clears it
                if target.requires_rider() {
                    if let Some(rider_id) = supplied_rider {
                        o.rider_id = Some(rider_id);
                    }
                } else {
                    o.rider_id = None;
                }
                if let Some(eta) = eta {
                    o.estimated_delivery_time = Some(eta);
                }
            })?;

        tracing::info!(
            order_id = %updated.id,
            from = %order.status,
            to = %target,
            actor = %actor.id,
            role = %actor.role,
            "Order status updated"
        );

        self.apply_transition_side_effects(&updated, target);
        self.emit_status_events(&updated, request.estimated_delivery_time, target);

        Ok(hydrate_order(updated, &self.catalog, &self.storage))
    }

    /// Side effects tied to specific target statuses
    ///
    /// Rider availability flips are synchronous (they are part of the
    /// transition's meaning); dispatch broadcasts and sweeps go to the
    /// background path and are never awaited here.
    fn apply_transition_side_effects(&self, order: &Order, target: OrderStatus) {
        match target {
            OrderStatus::ReadyForPickup => {
                let dispatcher = self.dispatcher.clone();
                let order = order.clone();
                tokio::spawn(async move {
                    if let Err(e) = dispatcher.broadcast_order(&order, None).await {
                        tracing::warn!(order_id = %order.id, error = %e, "Dispatch broadcast failed");
                    }
                });
            }
            OrderStatus::PickedUp => {
                if let Some(rider_id) = &order.rider_id
                    && let Err(e) = self.storage.set_rider_available(rider_id, false)
                {
                    tracing::warn!(rider_id = %rider_id, error = %e, "Failed to mark rider busy");
                }
            }
            OrderStatus::Delivered => {
                if let Some(rider_id) = &order.rider_id {
                    if let Err(e) = self.storage.set_rider_available(rider_id, true) {
                        tracing::warn!(rider_id = %rider_id, error = %e, "Failed to free rider");
                    }
                    // The freed rider may be able to take a waiting order
                    let dispatcher = self.dispatcher.clone();
                    tokio::spawn(async move {
                        dispatcher.sweep_backlog().await;
                    });
                }
            }
            _ => {}
        }
    }

    /// Push the status change to observers
    fn emit_status_events(&self, order: &Order, eta: Option<i64>, target: OrderStatus) {
        let now = shared::util::now_millis();
        let view = hydrate_order(order.clone(), &self.catalog, &self.storage);

        self.hub.publish(
            &Channel::order(&order.id),
            event_names::ORDER_UPDATED,
            json!({
                "orderId": order.id,
                "order": view,
                "timestamp": now,
            }),
        );

        self.hub.publish(
            &Channel::customer(&order.customer_id),
            event_names::ORDER_STATUS_UPDATE,
            serde_json::to_value(OrderStatusUpdatePayload {
                order_id: order.id.clone(),
                status: order.status,
                timestamp: now,
                rider_id: order.rider_id.clone(),
            })
            .unwrap_or_default(),
        );

        if let Some(eta) = eta {
            self.hub.publish(
                &Channel::order(&order.id),
                event_names::ETA_UPDATE,
                serde_json::to_value(EtaUpdatePayload {
                    order_id: order.id.clone(),
                    eta,
                    timestamp: now,
                })
                .unwrap_or_default(),
            );
        }

        // Rider contact card trails the status push
        if target == OrderStatus::Assigned
            && let Some(rider_id) = &order.rider_id
            && let Ok(Some(rider)) = self.storage.get_rider(rider_id)
        {
            self.hub.publish_delayed(
                &Channel::customer(&order.customer_id),
                event_names::RIDER_ASSIGNED,
                serde_json::to_value(RiderAssignedPayload {
                    order_id: order.id.clone(),
                    rider: rider.contact(),
                    timestamp: now,
                })
                .unwrap_or_default(),
                RIDER_ASSIGNED_PUSH_DELAY,
            );
        }
    }

    // ========== Cancel ==========

    /// Cancel an order, or - for the assigned rider - hand it back
    ///
    /// A rider abandoning an ASSIGNED order does not kill it: the order
    /// reverts to READY_FOR_PICKUP, the rider is freed, and the fleet gets
    /// a fresh offer. Every other permitted actor marks it CANCELLED.
    pub fn cancel_order(
        &self,
        order_id: &str,
        actor: &Actor,
        request: &CancelOrderRequest,
    ) -> AppResult<OrderView> {
        let order = self.load_order(order_id)?;

        if !order.status.is_cancellable() {
            return Err(AppError::not_cancellable(order.status.to_string()));
        }
        self.authorize_cancel(actor, &order)?;

        let rider_handback =
            actor.role == ActorRole::Rider && order.rider_id.as_deref() == Some(actor.id.as_str());

        let freed_rider = order.rider_id.clone();
        let reason = request.reason.clone();
        let updated = if rider_handback {
            self.storage
                .update_order_guarded(order_id, order.status, |o| {
                    o.status = OrderStatus::ReadyForPickup;
                    o.rider_id = None;
                })?
        } else {
            self.storage
                .update_order_guarded(order_id, order.status, move |o| {
                    o.status = OrderStatus::Cancelled;
                    o.cancelled_at = Some(shared::util::now_millis());
                    o.cancellation_reason = reason;
                    o.rider_id = None;
                })?
        };

        tracing::info!(
            order_id = %updated.id,
            actor = %actor.id,
            role = %actor.role,
            handback = rider_handback,
            "Order cancelled"
        );

        // Whoever held the order is free again
        if let Some(rider_id) = &freed_rider
            && let Err(e) = self.storage.set_rider_available(rider_id, true)
        {
            tracing::warn!(rider_id = %rider_id, error = %e, "Failed to free rider");
        }

        let now = shared::util::now_millis();
        self.hub.publish(
            &Channel::order(&updated.id),
            event_names::ORDER_CANCELLED,
            serde_json::to_value(OrderCancelledPayload {
                order_id: updated.id.clone(),
                reason: request.reason.clone(),
                timestamp: now,
            })
            .unwrap_or_default(),
        );

        if rider_handback {
            // Fresh offer to the fleet, on the background path
            let dispatcher = self.dispatcher.clone();
            let order_for_dispatch = updated.clone();
            tokio::spawn(async move {
                if let Err(e) = dispatcher
                    .broadcast_order(&order_for_dispatch, Some("rider_cancelled".to_string()))
                    .await
                {
                    tracing::warn!(
                        order_id = %order_for_dispatch.id,
                        error = %e,
                        "Re-broadcast after rider cancellation failed"
                    );
                }
            });
        } else {
            self.hub.publish(
                &Channel::customer(&updated.customer_id),
                event_names::ORDER_STATUS_UPDATE,
                serde_json::to_value(OrderStatusUpdatePayload {
                    order_id: updated.id.clone(),
                    status: updated.status,
                    timestamp: now,
                    rider_id: None,
                })
                .unwrap_or_default(),
            );
        }

        Ok(hydrate_order(updated, &self.catalog, &self.storage))
    }

    /// Cancellation permission matrix
    fn authorize_cancel(&self, actor: &Actor, order: &Order) -> AppResult<()> {
        let allowed = match actor.role {
            ActorRole::Admin => true,
            ActorRole::Customer => {
                order.customer_id == actor.id
                    && matches!(order.status, OrderStatus::Pending | OrderStatus::Confirmed)
            }
            ActorRole::Vendor => {
                order.vendor_id == actor.id
                    && matches!(
                        order.status,
                        OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Preparing
                    )
            }
            ActorRole::Rider => {
                order.rider_id.as_deref() == Some(actor.id.as_str())
                    && order.status == OrderStatus::Assigned
            }
        };
        if allowed {
            Ok(())
        } else {
            Err(AppError::with_message(
                ErrorCode::PermissionDenied,
                format!(
                    "role {} may not cancel order {} in status {}",
                    actor.role, order.id, order.status
                ),
            )
            .with_detail("currentStatus", order.status.to_string()))
        }
    }

    // ========== Queries ==========

    /// Fetch one order, visibility-checked for the actor
    pub fn get_order(&self, order_id: &str, actor: &Actor) -> AppResult<OrderView> {
        let order = self.load_order(order_id)?;
        if !self.may_see(actor, &order) {
            return Err(AppError::permission_denied(format!(
                "order {} is not visible to this {}",
                order.id, actor.role
            )));
        }
        Ok(hydrate_order(order, &self.catalog, &self.storage))
    }

    /// Role-scoped listing, newest first
    ///
    /// Customers, vendors and riders see only their own orders regardless
    /// of the supplied filters; admins get the full filter surface.
    pub fn list_orders(&self, actor: &Actor, query: &OrderListQuery) -> AppResult<OrderPage> {
        let filter = match actor.role {
            ActorRole::Customer => OrderFilter {
                customer_id: Some(actor.id.clone()),
                statuses: query.statuses.clone(),
                ..Default::default()
            },
            ActorRole::Vendor => OrderFilter {
                vendor_id: Some(actor.id.clone()),
                statuses: query.statuses.clone(),
                ..Default::default()
            },
            ActorRole::Rider => OrderFilter {
                rider_id: Some(actor.id.clone()),
                statuses: query.statuses.clone(),
                ..Default::default()
            },
            ActorRole::Admin => OrderFilter {
                vendor_id: query.vendor_id.clone(),
                customer_id: query.customer_id.clone(),
                rider_id: query.rider_id.clone(),
                statuses: query.statuses.clone(),
                created_from: query.created_from,
                created_to: query.created_to,
            },
        };

        let page = query.page.unwrap_or(1).max(1);
        let limit = query
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);

        let (orders, total) = self.storage.query_orders(&filter, page, limit)?;
        let orders = orders
            .into_iter()
            .map(|o| hydrate_order(o, &self.catalog, &self.storage))
            .collect();

        Ok(OrderPage {
            orders,
            total,
            page,
            limit,
        })
    }

    fn may_see(&self, actor: &Actor, order: &Order) -> bool {
        match actor.role {
            ActorRole::Admin => true,
            ActorRole::Customer => order.customer_id == actor.id,
            ActorRole::Vendor => order.vendor_id == actor.id,
            ActorRole::Rider => order.rider_id.as_deref() == Some(actor.id.as_str()),
        }
    }

    fn load_order(&self, order_id: &str) -> AppResult<Order> {
        self.storage.get_order(order_id)?.ok_or_else(|| {
            AppError::with_message(
                ErrorCode::OrderNotFound,
                format!("order {} not found", order_id),
            )
        })
    }
}
