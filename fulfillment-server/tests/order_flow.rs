//! End-to-end order lifecycle tests against an in-memory deployment
//!
//! Drives the full pipeline the way production traffic does: REST requests
//! through the router where the HTTP contract matters, direct manager calls
//! where the flow does.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use fulfillment_server::core::{AppState, Config, Server, ServiceChannels};
use fulfillment_server::orders::{
    CancelOrderRequest, CreateOrderRequest, OrderListQuery, UpdateStatusRequest,
};
use fulfillment_server::pricing::OrderItemRequest;
use serde_json::{json, Value};
use shared::models::{
    Actor, DeliveryAddress, GeoPoint, MenuItem, OrderStatus, RiderProfile, VehicleType, Vendor,
};
use std::time::Duration;
use tokio::time::timeout;
use tower::util::ServiceExt;

fn test_config() -> Config {
    Config {
        work_dir: "/tmp/pelican-test".to_string(),
        http_port: 0,
        environment: "development".to_string(),
        dispatch_throttle_ms: 0,
        sweep_interval_secs: 3600,
        dispatch_queue_capacity: 64,
        notify_queue_capacity: 64,
    }
}

/// Seeded deployment. The channel receivers stay alive for the duration of
/// the test so enqueues succeed.
fn deployment() -> (AppState, ServiceChannels) {
    let (state, channels) = AppState::initialize_in_memory(&test_config()).unwrap();

    state.catalog.upsert_vendor(Vendor {
        id: "v-1".to_string(),
        name: "Thai Corner".to_string(),
        active: true,
        address: "1 Vendor St".to_string(),
        location: GeoPoint {
            lat: 41.3874,
            lng: 2.1686,
        },
    });
    state.catalog.upsert_menu_item(MenuItem {
        id: "m-1".to_string(),
        vendor_id: "v-1".to_string(),
        name: "Pad Thai".to_string(),
        price: 1500,
        available: true,
        add_ons: vec![],
    });
    state
        .storage
        .upsert_rider(&RiderProfile {
            id: "r-1".to_string(),
            name: "Marta".to_string(),
            phone: "+34600000000".to_string(),
            vehicle_type: VehicleType::Motorbike,
            online: true,
            available: true,
            location: Some(GeoPoint {
                lat: 41.39,
                lng: 2.17,
            }),
            updated_at: 0,
        })
        .unwrap();

    (state, channels)
}

fn create_request() -> CreateOrderRequest {
    CreateOrderRequest {
        vendor_id: "v-1".to_string(),
        items: vec![OrderItemRequest {
            menu_item_id: "m-1".to_string(),
            quantity: 2,
            add_ons: vec![],
        }],
        delivery_address: DeliveryAddress {
            label: "Home".to_string(),
            text: "2 Customer Ave".to_string(),
            location: GeoPoint {
                lat: 41.40,
                lng: 2.18,
            },
        },
        special_instructions: Some("ring the bell".to_string()),
    }
}

fn update(status: OrderStatus, rider_id: Option<&str>) -> UpdateStatusRequest {
    UpdateStatusRequest {
        status,
        rider_id: rider_id.map(str::to_string),
        estimated_delivery_time: None,
    }
}

#[tokio::test]
async fn test_full_lifecycle_to_delivered() {
    let (state, mut channels) = deployment();
    let vendor = Actor::vendor("v-1");
    let admin = Actor::admin("ops-1");
    let rider = Actor::rider("r-1");

    let view = state.orders.create_order("c-1", &create_request()).unwrap();
    assert_eq!(view.status, OrderStatus::Pending);
    assert_eq!(view.pricing.subtotal, 3000);
    assert_eq!(view.pricing.total, 3350);

    state
        .orders
        .update_status(&view.id, &vendor, &update(OrderStatus::Confirmed, None))
        .unwrap();
    state
        .orders
        .update_status(&view.id, &vendor, &update(OrderStatus::Preparing, None))
        .unwrap();
    state
        .orders
        .update_status(&view.id, &vendor, &update(OrderStatus::ReadyForPickup, None))
        .unwrap();

    // Ready → a delivery job reaches the matching consumer
    let job = timeout(Duration::from_secs(1), channels.delivery_jobs.recv())
        .await
        .expect("dispatch must enqueue a job")
        .unwrap();
    assert_eq!(job.order_id, view.id);
    assert_eq!(job.delivery_fee, 200);

    state
        .orders
        .update_status(&view.id, &admin, &update(OrderStatus::Assigned, Some("r-1")))
        .unwrap();
    state
        .orders
        .update_status(&view.id, &rider, &update(OrderStatus::PickedUp, None))
        .unwrap();
    assert!(!state.storage.get_rider("r-1").unwrap().unwrap().available);

    state
        .orders
        .update_status(&view.id, &rider, &update(OrderStatus::OutForDelivery, None))
        .unwrap();
    let delivered = state
        .orders
        .update_status(&view.id, &rider, &update(OrderStatus::Delivered, None))
        .unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);
    assert!(state.storage.get_rider("r-1").unwrap().unwrap().available);

    // Terminal: nothing moves a delivered order
    let err = state
        .orders
        .update_status(&view.id, &admin, &update(OrderStatus::Preparing, None))
        .unwrap_err();
    assert_eq!(err.code, shared::error::ErrorCode::InvalidTransition);
}

#[tokio::test]
async fn test_rider_handback_then_rematch() {
    let (state, mut channels) = deployment();
    let vendor = Actor::vendor("v-1");
    let admin = Actor::admin("ops-1");
    let rider = Actor::rider("r-1");

    let view = state.orders.create_order("c-1", &create_request()).unwrap();
    for status in [
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::ReadyForPickup,
    ] {
        state
            .orders
            .update_status(&view.id, &vendor, &update(status, None))
            .unwrap();
    }
    state
        .orders
        .update_status(&view.id, &admin, &update(OrderStatus::Assigned, Some("r-1")))
        .unwrap();

    // Drain the first dispatch
    let first = timeout(Duration::from_secs(1), channels.delivery_jobs.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.order_id, view.id);

    let handed_back = state
        .orders
        .cancel_order(
            &view.id,
            &rider,
            &CancelOrderRequest {
                reason: Some("flat tire".to_string()),
            },
        )
        .unwrap();
    assert_eq!(handed_back.status, OrderStatus::ReadyForPickup);
    assert!(handed_back.rider.is_none());

    // The order goes straight back on the market
    let rematch = timeout(Duration::from_secs(1), channels.delivery_jobs.recv())
        .await
        .expect("handback must re-broadcast")
        .unwrap();
    assert_eq!(rematch.order_id, view.id);

    // A second rider pickup cycle works after the handback
    state
        .orders
        .update_status(&view.id, &admin, &update(OrderStatus::Assigned, Some("r-1")))
        .unwrap();
    let page = state
        .orders
        .list_orders(&rider, &OrderListQuery::default())
        .unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn test_rider_presence_surface() {
    let (state, _channels) = deployment();
    let router = Server::router(state);

    // Admin registers a new rider
    let (status, body) = call(
        router.clone(),
        "PUT",
        "/riders/r-9",
        Some(("ops-1", "admin")),
        Some(json!({
            "name": "Jordi",
            "phone": "+34611111111",
            "vehicleType": "bicycle"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "upsert failed: {}", body);
    assert_eq!(body["online"], false);

    // Rider reports themselves online with a location
    let (status, body) = call(
        router.clone(),
        "PATCH",
        "/riders/r-9/presence",
        Some(("r-9", "rider")),
        Some(json!({"online": true, "location": {"lat": 41.39, "lng": 2.17}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["online"], true);

    // Another rider may not touch someone else's presence
    let (status, _) = call(
        router,
        "PATCH",
        "/riders/r-9/presence",
        Some(("r-1", "rider")),
        Some(json!({"online": false})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ========== HTTP contract ==========

async fn call(
    router: axum::Router,
    method: &str,
    uri: &str,
    actor: Option<(&str, &str)>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((id, role)) = actor {
        builder = builder
            .header("x-actor-id", id)
            .header("x-actor-role", role);
    }
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&v).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_rest_surface() {
    let (state, _channels) = deployment();
    let router = Server::router(state);

    // Health is public
    let (status, body) = call(router.clone(), "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    // Unauthenticated create is rejected
    let (status, _) = call(
        router.clone(),
        "POST",
        "/orders",
        None,
        Some(json!({"vendorId": "v-1", "items": [], "deliveryAddress": {
            "label": "Home", "text": "x", "location": {"lat": 0.0, "lng": 0.0}}})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Customer places an order
    let (status, body) = call(
        router.clone(),
        "POST",
        "/orders",
        Some(("c-1", "customer")),
        Some(json!({
            "vendorId": "v-1",
            "items": [{"menuItemId": "m-1", "quantity": 2}],
            "deliveryAddress": {
                "label": "Home",
                "text": "2 Customer Ave",
                "location": {"lat": 41.40, "lng": 2.18}
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", body);
    let order_id = body["id"].as_str().unwrap().to_string();
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["pricing"]["total"], 3350);
    assert_eq!(body["vendor"]["name"], "Thai Corner");

    // The customer reads it back
    let (status, body) = call(
        router.clone(),
        "GET",
        &format!("/orders/{}", order_id),
        Some(("c-1", "customer")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], order_id.as_str());

    // A foreign customer may not
    let (status, _) = call(
        router.clone(),
        "GET",
        &format!("/orders/{}", order_id),
        Some(("c-2", "customer")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Customers cannot drive the status machine
    let (status, _) = call(
        router.clone(),
        "PATCH",
        &format!("/orders/{}/status", order_id),
        Some(("c-1", "customer")),
        Some(json!({"status": "CONFIRMED"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The vendor confirms
    let (status, body) = call(
        router.clone(),
        "PATCH",
        &format!("/orders/{}/status", order_id),
        Some(("v-1", "vendor")),
        Some(json!({"status": "CONFIRMED"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CONFIRMED");

    // List with a status filter
    let (status, body) = call(
        router.clone(),
        "GET",
        "/orders?status=CONFIRMED,PREPARING",
        Some(("c-1", "customer")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    // Cancel with a reason
    let (status, body) = call(
        router.clone(),
        "PATCH",
        &format!("/orders/{}/cancel", order_id),
        Some(("c-1", "customer")),
        Some(json!({"reason": "changed my mind"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CANCELLED");
    assert_eq!(body["cancellationReason"], "changed my mind");

    // Second cancel hits the not-cancellable guard
    let (status, body) = call(
        router,
        "PATCH",
        &format!("/orders/{}/cancel", order_id),
        Some(("c-1", "customer")),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["currentStatus"], "CANCELLED");
}
