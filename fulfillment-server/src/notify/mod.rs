//! Notification service - best-effort, delay-aware enqueueing
//!
//! Producers call [`NotificationService::enqueue`] and move on; a worker
//! drains the queue and honors each envelope's `delay_ms` before handing it
//! to the delivery transport. Push transport mechanics live outside this
//! crate - the worker's hand-off is a structured log line the transport
//! tails. Queue-full and closed-channel conditions are logged and swallowed;
//! they never reach the triggering transaction.

use shared::notification::OutboundNotification;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Handle used by producers; cheap to clone
#[derive(Clone, Debug)]
pub struct NotificationService {
    tx: mpsc::Sender<OutboundNotification>,
}

impl NotificationService {
    /// Create the service and its worker input
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<OutboundNotification>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Enqueue a notification - non-blocking, best-effort
    pub fn enqueue(&self, notification: OutboundNotification) {
        match self.tx.try_send(notification) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(n)) => {
                tracing::warn!(
                    notification_id = %n.id,
                    target_id = %n.target_id,
                    "Notification queue full, notification dropped"
                );
            }
            Err(mpsc::error::TrySendError::Closed(n)) => {
                tracing::debug!(notification_id = %n.id, "Notification worker stopped");
            }
        }
    }
}

/// Worker loop: drain the queue, honor per-envelope delays, deliver
///
/// Delayed envelopes are parked on their own task so one long delay never
/// holds up the queue behind it.
pub async fn run_notification_worker(
    mut rx: mpsc::Receiver<OutboundNotification>,
    shutdown: CancellationToken,
) {
    tracing::info!("Notification worker started");
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("Notification worker stopping");
                break;
            }
            next = rx.recv() => {
                match next {
                    Some(notification) => {
                        if notification.delay_ms > 0 {
                            let delay = Duration::from_millis(notification.delay_ms);
                            tokio::spawn(async move {
                                tokio::time::sleep(delay).await;
                                deliver(&notification);
                            });
                        } else {
                            deliver(&notification);
                        }
                    }
                    None => break,
                }
            }
        }
    }
}

/// Hand the envelope to the delivery transport
fn deliver(notification: &OutboundNotification) {
    tracing::info!(
        notification_id = %notification.id,
        target_type = ?notification.target_type,
        target_id = %notification.target_id,
        kind = %notification.kind,
        title = %notification.title,
        "Notification dispatched"
    );
}
