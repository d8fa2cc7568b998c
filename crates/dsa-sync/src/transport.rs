//! The peer transport collaborator.
//!
//! Sync treats the transport as an unreliable, at-least-once byte channel
//! between named endpoints. Nothing above this module depends on how bytes
//! travel; [`ChannelTransport`] is an in-process implementation for tests
//! and for wiring two stores together in one process.

use std::fmt;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{SyncError, SyncResult};

/// Messages buffered per direction before `send_data` waits.
const CHANNEL_CAPACITY: usize = 32;

/// Lifecycle of a peer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not connected.
    #[default]
    Idle,
    /// Connection in progress.
    Connecting,
    /// Ready to send and receive.
    Connected,
    /// The connection failed.
    Error,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Error => "error",
        })
    }
}

/// One payload delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received {
    /// Endpoint that sent the payload.
    pub endpoint_id: String,
    /// Raw bytes.
    pub payload: Vec<u8>,
}

/// An opaque byte channel to named peers.
#[async_trait]
pub trait PeerTransport: Send {
    /// This side's endpoint id.
    fn endpoint_id(&self) -> &str;

    /// Current connection state.
    fn state(&self) -> ConnectionState;

    /// Send `payload` to `endpoint_id`.
    async fn send_data(&mut self, endpoint_id: &str, payload: Vec<u8>) -> SyncResult<()>;

    /// Wait for the next payload. `Ok(None)` means the connection closed.
    async fn receive_data(&mut self) -> SyncResult<Option<Received>>;
}

/// In-process transport backed by a pair of tokio channels.
#[derive(Debug)]
pub struct ChannelTransport {
    endpoint_id: String,
    peer_id: String,
    tx: mpsc::Sender<Received>,
    rx: mpsc::Receiver<Received>,
    state: ConnectionState,
}

impl ChannelTransport {
    /// Two connected endpoints talking to each other.
    pub fn pair(a: impl Into<String>, b: impl Into<String>) -> (Self, Self) {
        let (a, b) = (a.into(), b.into());
        let (a_tx, b_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (b_tx, a_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let left = Self {
            endpoint_id: a.clone(),
            peer_id: b.clone(),
            tx: a_tx,
            rx: a_rx,
            state: ConnectionState::Connected,
        };
        let right = Self {
            endpoint_id: b,
            peer_id: a,
            tx: b_tx,
            rx: b_rx,
            state: ConnectionState::Connected,
        };
        (left, right)
    }

    /// The endpoint on the other side.
    pub fn peer_id(&self) -> &str {
        &self.peer_id
    }

    /// Stop receiving. Payloads already queued can still be drained.
    pub fn disconnect(&mut self) {
        self.rx.close();
        self.state = ConnectionState::Idle;
    }
}

#[async_trait]
impl PeerTransport for ChannelTransport {
    fn endpoint_id(&self) -> &str {
        &self.endpoint_id
    }

    fn state(&self) -> ConnectionState {
        self.state
    }

    async fn send_data(&mut self, endpoint_id: &str, payload: Vec<u8>) -> SyncResult<()> {
        if endpoint_id != self.peer_id {
            return Err(SyncError::Transport(format!("unknown endpoint '{endpoint_id}'")));
        }
        let message = Received {
            endpoint_id: self.endpoint_id.clone(),
            payload,
        };
        if self.tx.send(message).await.is_err() {
            self.state = ConnectionState::Error;
            return Err(SyncError::Transport(format!(
                "endpoint '{endpoint_id}' disconnected"
            )));
        }
        tracing::trace!(from = %self.endpoint_id, to = endpoint_id, "payload sent");
        Ok(())
    }

    async fn receive_data(&mut self) -> SyncResult<Option<Received>> {
        let received = self.rx.recv().await;
        if received.is_none() && self.state == ConnectionState::Connected {
            self.state = ConnectionState::Idle;
        }
        Ok(received)
    }
}
