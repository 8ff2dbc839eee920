//! Dispatch queue - the hand-off point to the courier-matching consumer
//!
//! The queue accepts jobs at-least-once and says nothing about matching:
//! whoever holds the receiver owns the courier-selection policy
//! (nearest-N, geofenced broadcast, auction - not this crate's concern).

use shared::dispatch::DeliveryJob;
use tokio::sync::mpsc;

/// Producer handle onto the dispatch queue
#[derive(Clone, Debug)]
pub struct DispatchQueue {
    tx: mpsc::Sender<DeliveryJob>,
}

/// Error returned when a job cannot be accepted
#[derive(Debug, thiserror::Error)]
#[error("dispatch queue rejected job for order {order_id}: {reason}")]
pub struct EnqueueError {
    pub order_id: String,
    pub reason: String,
}

impl DispatchQueue {
    /// Create the queue; the receiver goes to the matching consumer
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<DeliveryJob>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Enqueue a job, waiting for capacity if the queue is momentarily full
    pub async fn enqueue(&self, job: DeliveryJob) -> Result<(), EnqueueError> {
        let order_id = job.order_id.clone();
        self.tx.send(job).await.map_err(|e| EnqueueError {
            order_id,
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{DeliveryAddress, GeoPoint};

    fn job(order_id: &str) -> DeliveryJob {
        let now = shared::util::now_millis();
        DeliveryJob {
            order_id: order_id.to_string(),
            order_number: "PEL2025080810001".to_string(),
            vendor_id: "v-1".to_string(),
            vendor_name: "Thai Corner".to_string(),
            customer_id: "c-1".to_string(),
            customer_name: "c-1".to_string(),
            pickup_address: "1 Vendor St".to_string(),
            pickup_location: GeoPoint { lat: 0.0, lng: 0.0 },
            delivery_address: DeliveryAddress {
                label: "Home".to_string(),
                text: "2 Customer Ave".to_string(),
                location: GeoPoint { lat: 0.1, lng: 0.1 },
            },
            delivery_fee: 200,
            distance_km: 1.2,
            item_summary: "1x Pad Thai".to_string(),
            created_at: now,
            expires_at: now + shared::dispatch::JOB_TTL_MILLIS,
        }
    }

    #[tokio::test]
    async fn test_enqueue_and_consume() {
        let (queue, mut rx) = DispatchQueue::new(4);
        queue.enqueue(job("o-1")).await.unwrap();
        let received = rx.recv().await.unwrap();
        assert_eq!(received.order_id, "o-1");
    }

    #[tokio::test]
    async fn test_enqueue_fails_when_consumer_gone() {
        let (queue, rx) = DispatchQueue::new(4);
        drop(rx);
        let err = queue.enqueue(job("o-1")).await.unwrap_err();
        assert_eq!(err.order_id, "o-1");
    }
}
