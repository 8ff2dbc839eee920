//! Status transition rules - who may move an order where
//!
//! The permission table gates the *set* of target statuses per role;
//! ownership ties vendors to their own orders and riders to their assigned
//! ones. Cancellation is not a status-update target: it has its own
//! operation with reason semantics (see `OrderManager::cancel_order`).

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Actor, ActorRole, Order, OrderStatus};

/// Target statuses each role may set via a status update
///
/// | Actor | May set |
/// |-------|---------|
/// | Vendor | CONFIRMED, PREPARING, READY_FOR_PICKUP |
/// | Rider | PICKED_UP, OUT_FOR_DELIVERY, DELIVERED |
/// | Admin | any pipeline status |
/// | Customer | none (cancel only) |
pub fn allowed_targets(role: ActorRole) -> &'static [OrderStatus] {
    match role {
        ActorRole::Vendor => &[
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::ReadyForPickup,
        ],
        ActorRole::Rider => &[
            OrderStatus::PickedUp,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
        ],
        ActorRole::Admin => &[
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::ReadyForPickup,
            OrderStatus::Assigned,
            OrderStatus::PickedUp,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
        ],
        ActorRole::Customer => &[],
    }
}

/// Authorize `actor` moving `order` to `target`
///
/// Checks, in order: terminal protection, self-transition, role gate,
/// ownership, forward progress (admins may move backwards for repairs,
/// never out of a terminal status).
pub fn authorize_transition(actor: &Actor, order: &Order, target: OrderStatus) -> AppResult<()> {
    if order.status.is_terminal() {
        return Err(AppError::invalid_transition(
            format!("order {} is already {}", order.id, order.status),
            order.status.to_string(),
        ));
    }

    // Idempotent target: never re-runs side effects, reported as a no-op
    // violation so the caller re-reads instead of retrying blindly
    if target == order.status {
        return Err(AppError::invalid_transition(
            format!("order {} is already in status {}", order.id, target),
            order.status.to_string(),
        ));
    }

    if target == OrderStatus::Cancelled {
        return Err(AppError::invalid_transition(
            "cancellation must go through the cancel operation",
            order.status.to_string(),
        ));
    }

    if !allowed_targets(actor.role).contains(&target) {
        return Err(AppError::with_message(
            ErrorCode::PermissionDenied,
            format!("role {} may not set status {}", actor.role, target),
        )
        .with_detail("role", actor.role.to_string())
        .with_detail("targetStatus", target.to_string()));
    }

    match actor.role {
        ActorRole::Vendor if order.vendor_id != actor.id => {
            return Err(AppError::with_message(
                ErrorCode::VendorMismatch,
                format!("order {} belongs to another vendor", order.id),
            ));
        }
        ActorRole::Rider if order.rider_id.as_deref() != Some(actor.id.as_str()) => {
            return Err(AppError::with_message(
                ErrorCode::RiderMismatch,
                format!("order {} is not assigned to rider {}", order.id, actor.id),
            ));
        }
        _ => {}
    }

    // Forward progress only; admin may move backwards to repair state
    if actor.role != ActorRole::Admin
        && target.rank() <= order.status.rank()
    {
        return Err(AppError::invalid_transition(
            format!(
                "cannot move order {} from {} back to {}",
                order.id, order.status, target
            ),
            order.status.to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{DeliveryAddress, GeoPoint, Pricing};

    fn order_with(status: OrderStatus, rider_id: Option<&str>) -> Order {
        Order {
            id: "o-1".to_string(),
            order_number: "PEL2025080810001".to_string(),
            status,
            vendor_id: "v-1".to_string(),
            customer_id: "c-1".to_string(),
            rider_id: rider_id.map(str::to_string),
            items: vec![],
            pricing: Pricing::new(1000, 200, 50),
            delivery_address: DeliveryAddress {
                label: "Home".to_string(),
                text: "1 Test St".to_string(),
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

    const ALL_TARGETS: [OrderStatus; 8] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::ReadyForPickup,
        OrderStatus::Assigned,
        OrderStatus::PickedUp,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
    ];

    #[test]
    fn test_customer_may_set_nothing() {
        let order = order_with(OrderStatus::Pending, None);
        let customer = Actor::customer("c-1");
        for target in ALL_TARGETS {
            assert!(
                authorize_transition(&customer, &order, target).is_err(),
                "customer unexpectedly allowed to set {}",
                target
            );
        }
    }

    #[test]
    fn test_denied_outside_permission_table() {
        // Every (role, target) pair outside the table must fail even when
        // ownership and ordering would otherwise permit it
        let vendor = Actor::vendor("v-1");
        let rider = Actor::rider("r-1");

        let order = order_with(OrderStatus::Assigned, Some("r-1"));
        for target in [
            OrderStatus::PickedUp,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
        ] {
            let err = authorize_transition(&vendor, &order, target).unwrap_err();
            assert_eq!(err.code, ErrorCode::PermissionDenied);
        }

        let order = order_with(OrderStatus::Pending, Some("r-1"));
        for target in [
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::ReadyForPickup,
        ] {
            let err = authorize_transition(&rider, &order, target).unwrap_err();
            assert_eq!(err.code, ErrorCode::PermissionDenied);
        }
    }

    #[test]
    fn test_vendor_forward_path() {
        let vendor = Actor::vendor("v-1");
        let order = order_with(OrderStatus::Pending, None);
        assert!(authorize_transition(&vendor, &order, OrderStatus::Confirmed).is_ok());
        assert!(authorize_transition(&vendor, &order, OrderStatus::ReadyForPickup).is_ok());

        let order = order_with(OrderStatus::Preparing, None);
        let err = authorize_transition(&vendor, &order, OrderStatus::Confirmed).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);
    }

    #[test]
    fn test_vendor_ownership_enforced() {
        let other_vendor = Actor::vendor("v-2");
        let order = order_with(OrderStatus::Pending, None);
        let err = authorize_transition(&other_vendor, &order, OrderStatus::Confirmed).unwrap_err();
        assert_eq!(err.code, ErrorCode::VendorMismatch);
    }

    #[test]
    fn test_rider_must_be_assigned() {
        let rider = Actor::rider("r-2");
        let order = order_with(OrderStatus::Assigned, Some("r-1"));
        let err = authorize_transition(&rider, &order, OrderStatus::PickedUp).unwrap_err();
        assert_eq!(err.code, ErrorCode::RiderMismatch);

        let assigned = Actor::rider("r-1");
        assert!(authorize_transition(&assigned, &order, OrderStatus::PickedUp).is_ok());
    }

    #[test]
    fn test_terminal_states_locked() {
        let admin = Actor::admin("a-1");
        for status in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            let order = order_with(status, None);
            for target in ALL_TARGETS {
                assert!(authorize_transition(&admin, &order, target).is_err());
            }
        }
    }

    #[test]
    fn test_same_status_rejected() {
        let vendor = Actor::vendor("v-1");
        let order = order_with(OrderStatus::Confirmed, None);
        let err = authorize_transition(&vendor, &order, OrderStatus::Confirmed).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);
    }

    #[test]
    fn test_cancelled_not_a_status_update_target() {
        let admin = Actor::admin("a-1");
        let order = order_with(OrderStatus::Pending, None);
        let err = authorize_transition(&admin, &order, OrderStatus::Cancelled).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);
    }

    #[test]
    fn test_admin_may_move_backwards() {
        let admin = Actor::admin("a-1");
        let order = order_with(OrderStatus::Preparing, None);
        assert!(authorize_transition(&admin, &order, OrderStatus::Confirmed).is_ok());
    }
}
