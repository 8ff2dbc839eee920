//! Transport abstraction for the event stream
//!
//! The server pushes [`PushEvent`] frames down; the client sends
//! [`ClientFrame`]s (auth, join/leave order rooms) up. Two implementations:
//! TCP with length-prefixed JSON framing, and an in-memory pair of
//! broadcast channels for in-process tests.

use async_trait::async_trait;
use shared::realtime::{ClientFrame, PushEvent};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, Mutex};

use crate::error::ClientError;

/// Frames larger than this are rejected as corrupt
const MAX_FRAME_BYTES: u32 = 1024 * 1024;

/// Transport abstraction for event-stream communication
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn read_event(&self) -> Result<PushEvent, ClientError>;
    async fn write_frame(&self, frame: &ClientFrame) -> Result<(), ClientError>;
    async fn close(&self) -> Result<(), ClientError>;
}

/// TCP Transport Implementation
#[derive(Debug, Clone)]
pub struct TcpTransport {
    reader: Arc<Mutex<OwnedReadHalf>>,
    writer: Arc<Mutex<OwnedWriteHalf>>,
}

impl TcpTransport {
    pub async fn connect(addr: &str) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader: Arc::new(Mutex::new(reader)),
            writer: Arc::new(Mutex::new(writer)),
        })
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn read_event(&self) -> Result<PushEvent, ClientError> {
        let mut reader = self.reader.lock().await;

        // Read payload length (4 bytes LE)
        let mut len_buf = [0u8; 4];
        reader.read_exact(&mut len_buf).await?;
        let len = u32::from_le_bytes(len_buf);
        if len > MAX_FRAME_BYTES {
            return Err(ClientError::InvalidFrame(format!(
                "frame of {} bytes exceeds limit",
                len
            )));
        }

        // Read payload
        let mut payload = vec![0u8; len as usize];
        reader.read_exact(&mut payload).await?;

        serde_json::from_slice(&payload)
            .map_err(|e| ClientError::InvalidFrame(format!("bad event payload: {}", e)))
    }

    async fn write_frame(&self, frame: &ClientFrame) -> Result<(), ClientError> {
        let payload = serde_json::to_vec(frame)
            .map_err(|e| ClientError::InvalidFrame(format!("bad client frame: {}", e)))?;

        let mut writer = self.writer.lock().await;
        let mut data = Vec::with_capacity(4 + payload.len());
        data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        data.extend_from_slice(&payload);
        writer.write_all(&data).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), ClientError> {
        // Dropping the Arc references will eventually close the stream
        Ok(())
    }
}

/// Memory Transport Implementation (for in-process tests)
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    /// Receiver for events FROM the server (broadcasts)
    rx: Arc<Mutex<broadcast::Receiver<PushEvent>>>,
    /// Sender for frames TO the server
    tx: broadcast::Sender<ClientFrame>,
}

impl MemoryTransport {
    /// Wire up a transport against the test-side server channels
    ///
    /// # Arguments
    /// * `server_event_tx` - the server's broadcast sender (subscribed for pushes)
    /// * `client_frame_tx` - the channel the test observes client frames on
    pub fn new(
        server_event_tx: &broadcast::Sender<PushEvent>,
        client_frame_tx: &broadcast::Sender<ClientFrame>,
    ) -> Self {
        Self {
            rx: Arc::new(Mutex::new(server_event_tx.subscribe())),
            tx: client_frame_tx.clone(),
        }
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn read_event(&self) -> Result<PushEvent, ClientError> {
        let mut rx = self.rx.lock().await;
        rx.recv()
            .await
            .map_err(|e| ClientError::Connection(format!("memory channel error: {}", e)))
    }

    async fn write_frame(&self, frame: &ClientFrame) -> Result<(), ClientError> {
        self.tx
            .send(frame.clone())
            .map_err(|e| ClientError::Connection(format!("failed to send to server: {}", e)))?;
        Ok(())
    }

    async fn close(&self) -> Result<(), ClientError> {
        Ok(())
    }
}
