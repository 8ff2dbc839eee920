//! 实时推送类型定义
//!
//! 这些类型在 fulfillment-server 和客户端之间共享，用于
//! 进程内（内存）和网络（TCP）推送通道。

mod channel;
pub mod payload;

pub use channel::Channel;
pub use payload::{
    event_names, EtaUpdatePayload, OrderAvailablePayload, OrderCancelledPayload,
    OrderStatusUpdatePayload, RiderAssignedPayload,
};

use serde::{Deserialize, Serialize};

/// A single push event as delivered to subscribers
///
/// `payload` stays as raw JSON: the hub does not interpret it, and clients
/// decode it based on `event`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushEvent {
    /// Channel the event was published on (e.g. `order:o-1`)
    pub channel: String,
    /// Event name (see [`event_names`])
    pub event: String,
    pub payload: serde_json::Value,
    /// Server publish time (unix millis)
    pub timestamp: i64,
}

impl PushEvent {
    pub fn new(channel: &Channel, event: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            channel: channel.name(),
            event: event.into(),
            payload,
            timestamp: crate::util::now_millis(),
        }
    }
}

/// Frames sent from a client to the event transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Authenticate the connection
    Auth { token: String },
    /// Join a per-order room
    Join { order_id: String },
    /// Leave a per-order room
    Leave { order_id: String },
}
