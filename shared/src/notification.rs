//! Notification envelope handed to the notification collaborator
//!
//! Delivery is best-effort and fully decoupled from the triggering request:
//! the producer enqueues and forgets. `delay_ms` is a delivery-delay
//! attribute honored by the notification worker, not a timer held by the
//! request path.

use serde::{Deserialize, Serialize};

/// Who the notification is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationTarget {
    Customer,
    Vendor,
    Rider,
}

/// Delivery priority hint for the push transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    Normal,
    High,
}

/// The notification envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundNotification {
    pub id: String,
    pub target_type: NotificationTarget,
    pub target_id: String,
    /// Machine-readable kind ("new_order", "order_status", ...)
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    /// Structured payload for deep links
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    pub priority: NotificationPriority,
    pub timestamp: i64,
    /// Delivery delay in milliseconds (0 = immediate)
    #[serde(default)]
    pub delay_ms: u64,
}

impl OutboundNotification {
    pub fn new(
        target_type: NotificationTarget,
        target_id: impl Into<String>,
        kind: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: crate::util::new_id(),
            target_type,
            target_id: target_id.into(),
            kind: kind.into(),
            title: title.into(),
            message: message.into(),
            data: None,
            priority: NotificationPriority::Normal,
            timestamp: crate::util::now_millis(),
            delay_ms: 0,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Ask the worker to hold the notification before delivery
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}
