//! Connection state machine with bounded reconnection
//!
//! ```text
//! disconnected ──connect()──► connecting ──ok──► connected
//!      ▲                          │                  │
//!      │◄──────── error ──────────┘                  │
//!      │                                             │
//!      ├◄── disconnect() (manual, no auto-reconnect) ┤
//!      └◄── read error → bounded reconnect sequence ─┘
//! ```
//!
//! Rules (all enforced here, not by callers):
//! - only one outbound connection attempt in flight at a time
//! - manual disconnect never auto-reconnects
//! - an unexpected drop starts a reconnect sequence with a capped attempt
//!   budget, cancelled as soon as a connection succeeds or the budget runs
//!   out
//! - on an authentication-class error the token provider is asked to
//!   refresh once per sequence before the next attempt
//! - previously joined order rooms are re-established on every successful
//!   (re)connect

use async_trait::async_trait;
use parking_lot::Mutex;
use shared::realtime::{ClientFrame, PushEvent};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::transport::Transport;

/// Creates a fresh transport per connection attempt
#[async_trait]
pub trait Connector: Send + Sync + std::fmt::Debug {
    async fn connect(&self, token: Option<&str>) -> Result<Arc<dyn Transport>, ClientError>;
}

/// Supplies a fresh auth token after an authentication-class failure
#[async_trait]
pub trait TokenProvider: Send + Sync + std::fmt::Debug {
    async fn refresh(&self) -> Result<String, ClientError>;
}

/// Connection lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Buffer for events fanned out to local consumers (the reconciler)
const EVENT_BUFFER: usize = 256;

struct Inner {
    config: ClientConfig,
    connector: Arc<dyn Connector>,
    token_provider: Option<Arc<dyn TokenProvider>>,
    state: Mutex<ConnectionState>,
    /// Guard: only one outbound attempt in flight
    connect_in_progress: AtomicBool,
    /// Set by `disconnect()`; suppresses auto-reconnect
    manual_disconnect: AtomicBool,
    /// Bumped on manual disconnect; stale read loops and reconnect
    /// sequences observe the change and stop
    generation: AtomicU64,
    /// Order rooms to re-establish after a reconnect
    joined_orders: Mutex<BTreeSet<String>>,
    transport: Mutex<Option<Arc<dyn Transport>>>,
    token: Mutex<Option<String>>,
    event_tx: broadcast::Sender<PushEvent>,
}

impl std::fmt::Debug for Inner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("state", &*self.state.lock())
            .field("joined_orders", &self.joined_orders.lock().len())
            .finish()
    }
}

/// The connection manager
#[derive(Clone, Debug)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

impl ConnectionManager {
    pub fn new(config: ClientConfig, connector: Arc<dyn Connector>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            inner: Arc::new(Inner {
                config,
                connector,
                token_provider: None,
                state: Mutex::new(ConnectionState::Disconnected),
                connect_in_progress: AtomicBool::new(false),
                manual_disconnect: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                joined_orders: Mutex::new(BTreeSet::new()),
                transport: Mutex::new(None),
                token: Mutex::new(None),
                event_tx,
            }),
        }
    }

    pub fn with_token_provider(
        config: ClientConfig,
        connector: Arc<dyn Connector>,
        token_provider: Arc<dyn TokenProvider>,
    ) -> Self {
        let mut manager = Self::new(config, connector);
        let inner = Arc::get_mut(&mut manager.inner).expect("fresh manager is uniquely owned");
        inner.token_provider = Some(token_provider);
        manager
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        *self.inner.state.lock()
    }

    /// Subscribe to the incoming event stream
    pub fn events(&self) -> broadcast::Receiver<PushEvent> {
        self.inner.event_tx.subscribe()
    }

    /// Set the auth token used for subsequent connects
    pub fn set_token(&self, token: impl Into<String>) {
        *self.inner.token.lock() = Some(token.into());
    }

    /// Establish the connection
    ///
    /// Fails fast with [`ClientError::AlreadyConnecting`] when another
    /// attempt is in flight, and with the transport error when the attempt
    /// itself fails - the initial connect does not auto-retry.
    pub async fn connect(&self) -> Result<(), ClientError> {
        self.inner.manual_disconnect.store(false, Ordering::SeqCst);
        self.guarded_connect_once().await
    }

    /// Manually tear down the connection; no auto-reconnect follows
    pub async fn disconnect(&self) {
        self.inner.manual_disconnect.store(true, Ordering::SeqCst);
        self.inner.generation.fetch_add(1, Ordering::SeqCst);

        let transport = self.inner.transport.lock().take();
        if let Some(t) = transport {
            let _ = t.close().await;
        }
        *self.inner.state.lock() = ConnectionState::Disconnected;
        tracing::info!("Disconnected by request");
    }

    /// Join a per-order room; remembered across reconnects
    pub async fn join_order(&self, order_id: impl Into<String>) -> Result<(), ClientError> {
        let order_id = order_id.into();
        self.inner.joined_orders.lock().insert(order_id.clone());

        let transport = self.inner.transport.lock().clone();
        if let Some(t) = transport {
            t.write_frame(&ClientFrame::Join { order_id }).await?;
        }
        Ok(())
    }

    /// Leave a per-order room
    pub async fn leave_order(&self, order_id: &str) -> Result<(), ClientError> {
        self.inner.joined_orders.lock().remove(order_id);

        let transport = self.inner.transport.lock().clone();
        if let Some(t) = transport {
            t.write_frame(&ClientFrame::Leave {
                order_id: order_id.to_string(),
            })
            .await?;
        }
        Ok(())
    }

    // ========== internals ==========

    /// One attempt, guarded by the in-progress flag
    async fn guarded_connect_once(&self) -> Result<(), ClientError> {
        if self.inner.connect_in_progress.swap(true, Ordering::SeqCst) {
            return Err(ClientError::AlreadyConnecting);
        }
        let result = self.connect_once().await;
        self.inner.connect_in_progress.store(false, Ordering::SeqCst);
        result
    }

    async fn connect_once(&self) -> Result<(), ClientError> {
        *self.inner.state.lock() = ConnectionState::Connecting;

        let token = self.inner.token.lock().clone();
        let transport = match self.inner.connector.connect(token.as_deref()).await {
            Ok(t) => t,
            Err(e) => {
                *self.inner.state.lock() = ConnectionState::Disconnected;
                return Err(e);
            }
        };

        if let Err(e) = self.handshake(&transport, token).await {
            *self.inner.state.lock() = ConnectionState::Disconnected;
            return Err(e);
        }

        *self.inner.transport.lock() = Some(transport.clone());
        *self.inner.state.lock() = ConnectionState::Connected;
        tracing::info!(client = %self.inner.config.client_name, "Connected");

        self.spawn_read_loop(transport);
        Ok(())
    }

    /// Present the token and re-establish every joined order room
    async fn handshake(
        &self,
        transport: &Arc<dyn Transport>,
        token: Option<String>,
    ) -> Result<(), ClientError> {
        if let Some(token) = token {
            transport.write_frame(&ClientFrame::Auth { token }).await?;
        }

        let rooms: Vec<String> = self.inner.joined_orders.lock().iter().cloned().collect();
        for order_id in rooms {
            transport.write_frame(&ClientFrame::Join { order_id }).await?;
        }
        Ok(())
    }

    fn spawn_read_loop(&self, transport: Arc<dyn Transport>) {
        let manager = self.clone();
        let generation = manager.inner.generation.load(Ordering::SeqCst);
        tokio::spawn(async move {
            loop {
                match transport.read_event().await {
                    Ok(event) => {
                        // No local subscribers is fine
                        let _ = manager.inner.event_tx.send(event);
                    }
                    Err(e) => {
                        // A newer connection (or a manual disconnect) owns
                        // the state now; this loop just goes away
                        if manager.inner.generation.load(Ordering::SeqCst) != generation {
                            break;
                        }
                        tracing::warn!(error = %e, "Connection lost");
                        manager.on_connection_lost();
                        break;
                    }
                }
            }
        });
    }

    fn on_connection_lost(&self) {
        *self.inner.transport.lock() = None;
        *self.inner.state.lock() = ConnectionState::Disconnected;

        if self.inner.manual_disconnect.load(Ordering::SeqCst) {
            return;
        }

        let manager = self.clone();
        tokio::spawn(async move {
            manager.reconnect_sequence().await;
        });
    }

    /// Bounded reconnection: stops on success, budget exhaustion, or a
    /// manual disconnect arriving mid-sequence
    async fn reconnect_sequence(&self) {
        let generation = self.inner.generation.load(Ordering::SeqCst);
        let max_attempts = self.inner.config.max_reconnect_attempts;
        let mut token_refreshed = false;

        for attempt in 1..=max_attempts {
            tokio::time::sleep(self.inner.config.reconnect_delay).await;

            if self.inner.manual_disconnect.load(Ordering::SeqCst)
                || self.inner.generation.load(Ordering::SeqCst) != generation
            {
                tracing::debug!("Reconnect sequence cancelled");
                return;
            }

            match self.guarded_connect_once().await {
                Ok(()) => {
                    tracing::info!(attempt, "Reconnected");
                    return;
                }
                Err(e) => {
                    tracing::warn!(attempt, max_attempts, error = %e, "Reconnect attempt failed");

                    // Auth failures get one token refresh per sequence
                    if e.is_auth_error()
                        && !token_refreshed
                        && let Some(provider) = &self.inner.token_provider
                    {
                        token_refreshed = true;
                        match provider.refresh().await {
                            Ok(token) => {
                                tracing::info!("Auth token refreshed");
                                *self.inner.token.lock() = Some(token);
                            }
                            Err(refresh_err) => {
                                tracing::warn!(error = %refresh_err, "Token refresh failed");
                            }
                        }
                    }
                }
            }
        }

        tracing::error!(max_attempts, "Reconnection attempts exhausted");
    }
}
