//! Client configuration

use std::time::Duration;

/// Connection behavior knobs
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Event transport address (host:port)
    pub server_addr: String,
    /// Name reported to the server for diagnostics
    pub client_name: String,
    /// Reconnection attempt budget after an unexpected drop
    pub max_reconnect_attempts: u32,
    /// Pause before each reconnect attempt
    pub reconnect_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:8081".to_string(),
            client_name: "pelican-client".to_string(),
            max_reconnect_attempts: 5,
            reconnect_delay: Duration::from_millis(500),
        }
    }
}

impl ClientConfig {
    pub fn new(server_addr: impl Into<String>) -> Self {
        Self {
            server_addr: server_addr.into(),
            ..Default::default()
        }
    }

    pub fn with_reconnect(mut self, max_attempts: u32, delay: Duration) -> Self {
        self.max_reconnect_attempts = max_attempts;
        self.reconnect_delay = delay;
        self
    }
}
