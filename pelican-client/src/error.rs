//! Client error types

use thiserror::Error;

/// Errors surfaced by the client core
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Connection error: {0}")]
    Connection(String),

    /// Authentication-class failure; triggers a one-shot token refresh
    /// before the next reconnect attempt
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("A connection attempt is already in progress")]
    AlreadyConnecting,

    #[error("Reconnection attempts exhausted after {0} tries")]
    RetriesExhausted(u32),

    #[error("Connection closed")]
    Closed,
}

impl ClientError {
    /// Whether this failure should trigger a token refresh
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ClientError::Auth(_))
    }
}
