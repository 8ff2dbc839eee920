//! In-process integration: connection manager feeding the reconciler
//!
//! A memory-transport "server" pushes partial events; the client pipes them
//! through the reconciler and the UI-facing view stays consistent.

use async_trait::async_trait;
use pelican_client::{
    ClientConfig, ClientError, ConnectionManager, ConnectionState, Connector, MemoryTransport,
    OrderReconciler, Transport,
};
use serde_json::json;
use shared::models::{
    DeliveryAddress, GeoPoint, OrderStatus, OrderView, Pricing, VendorSummary,
};
use shared::realtime::{Channel, ClientFrame, PushEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::timeout;

/// Accepts every attempt against one fixed pair of server channels
#[derive(Debug)]
struct StaticConnector {
    event_tx: broadcast::Sender<PushEvent>,
    frame_tx: broadcast::Sender<ClientFrame>,
}

#[async_trait]
impl Connector for StaticConnector {
    async fn connect(&self, _token: Option<&str>) -> Result<Arc<dyn Transport>, ClientError> {
        Ok(Arc::new(MemoryTransport::new(
            &self.event_tx,
            &self.frame_tx,
        )))
    }
}

fn snapshot(order_id: &str) -> OrderView {
    OrderView {
        id: order_id.to_string(),
        order_number: "PEL2025080810001".to_string(),
        status: OrderStatus::Preparing,
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

#[tokio::test]
async fn test_push_events_flow_into_live_view() {
    let (event_tx, _) = broadcast::channel(64);
    let (frame_tx, mut frame_rx) = broadcast::channel(64);
    let connector = Arc::new(StaticConnector {
        event_tx: event_tx.clone(),
        frame_tx,
    });

    let manager = ConnectionManager::new(ClientConfig::new("test"), connector);
    let reconciler = Arc::new(OrderReconciler::new());

    manager.connect().await.unwrap();
    assert_eq!(manager.state(), ConnectionState::Connected);

    // Track one order: cached snapshot + joined room
    reconciler.replace_snapshot(snapshot("o-1"));
    manager.join_order("o-1").await.unwrap();
    let joined = frame_rx.recv().await.unwrap();
    assert_eq!(
        joined,
        ClientFrame::Join {
            order_id: "o-1".to_string()
        }
    );

    // Pump incoming events into the reconciler, as an app would
    let mut events = manager.events();
    let pump = {
        let reconciler = reconciler.clone();
        tokio::spawn(async move {
            while let Ok(event) = events.recv().await {
                reconciler.apply_event(&event);
            }
        })
    };

    // Server pushes: rider first, then a status-only update
    event_tx
        .send(PushEvent::new(
            &Channel::customer("c-1"),
            "rider_assigned",
            json!({
                "orderId": "o-1",
                "rider": {
                    "id": "r-1",
                    "name": "Marta",
                    "phone": "+34600000000",
                    "vehicleType": "motorbike"
                },
                "timestamp": 1
            }),
        ))
        .unwrap();
    event_tx
        .send(PushEvent::new(
            &Channel::customer("c-1"),
            "order_status_update",
            json!({"orderId": "o-1", "status": "OUT_FOR_DELIVERY", "timestamp": 2}),
        ))
        .unwrap();

    // Wait until both fields landed
    let live = timeout(Duration::from_secs(2), async {
        loop {
            if let Some(live) = reconciler.effective_view("o-1")
                && live.order.status == OrderStatus::OutForDelivery
                && live.order.rider.is_some()
            {
                return live;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("live view should converge");

    assert!(live.is_realtime);
    assert_eq!(live.order.rider.unwrap().name, "Marta");
    // Snapshot fields without overlay stay untouched
    assert_eq!(live.order.pricing.total, 3350);

    manager.disconnect().await;
    pump.abort();
}
