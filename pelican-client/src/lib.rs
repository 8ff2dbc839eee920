//! Pelican client core - realtime order tracking for marketplace apps
//!
//! Two halves:
//!
//! - [`ConnectionManager`]: the event-transport connection with bounded
//!   reconnection, room re-join and one-shot token refresh
//! - [`OrderReconciler`]: merges authoritative order snapshots with the
//!   stream of partial push updates into one consistent view for display

pub mod config;
pub mod connection;
pub mod error;
pub mod reconciler;
pub mod transport;

pub use config::ClientConfig;
pub use connection::{ConnectionManager, ConnectionState, Connector, TokenProvider};
pub use error::ClientError;
pub use reconciler::{LiveOrder, OrderOverlay, OrderReconciler, PartialOrderUpdate, Stamped};
pub use transport::{MemoryTransport, TcpTransport, Transport};
