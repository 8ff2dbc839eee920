//! RealtimeHub - fire-and-forget event publication
//!
//! One `tokio::broadcast` sender per channel, created lazily on first use.
//! Publishing is at-most-once and never fails the caller: a channel with no
//! subscribers drops the event, a lagged subscriber loses old events. The
//! socket layer that bridges subscriptions onto client connections is the
//! event-transport collaborator; tests subscribe directly.

use dashmap::DashMap;
use shared::realtime::{Channel, PushEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Per-channel buffer: a slow subscriber lags rather than blocking publishes
const CHANNEL_CAPACITY: usize = 256;

/// Topic-scoped push emitter
#[derive(Clone)]
pub struct RealtimeHub {
    channels: Arc<DashMap<String, broadcast::Sender<PushEvent>>>,
}

impl std::fmt::Debug for RealtimeHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeHub")
            .field("channels", &self.channels.len())
            .finish()
    }
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self {
            channels: Arc::new(DashMap::new()),
        }
    }

    fn sender(&self, channel: &Channel) -> broadcast::Sender<PushEvent> {
        self.channels
            .entry(channel.name())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Publish an event to a channel - fire-and-forget, at-most-once
    pub fn publish(&self, channel: &Channel, event: &str, payload: serde_json::Value) {
        let push = PushEvent::new(channel, event, payload);
        if let Err(e) = self.sender(channel).send(push) {
            // No subscribers on this channel right now; the event is gone
            tracing::debug!(channel = %channel, event = %event, error = %e, "Push event dropped");
        }
    }

    /// Publish after `delay` on the hub's own background path
    ///
    /// Used for `rider_assigned`, which trails the status event so the
    /// lighter status update renders first. The delay lives in the hub, not
    /// in the request handler.
    pub fn publish_delayed(
        &self,
        channel: &Channel,
        event: &str,
        payload: serde_json::Value,
        delay: Duration,
    ) {
        let hub = self.clone();
        let channel = channel.clone();
        let event = event.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            hub.publish(&channel, &event, payload);
        });
    }

    /// Subscribe to a channel (used by the transport bridge and by tests)
    pub fn subscribe(&self, channel: &Channel) -> broadcast::Receiver<PushEvent> {
        self.sender(channel).subscribe()
    }
}
