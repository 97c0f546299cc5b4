//! Transport and history collaborator seams
//!
//! The persistent-connection library and the REST history endpoint live
//! outside this crate. The channel drives them through these traits: a
//! transport hands back a sink for client messages plus a stream of decoded
//! server messages, and a history provider seeds the buffer once at
//! subscription start.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use super::protocol::{ClientMessage, ServerMessage};
use crate::types::AutomationEvent;

/// Result type for channel operations
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Errors reported by transport and history implementations
///
/// The channel absorbs these into its connection state machine; consumers
/// only ever observe a [`super::ConnectionStatus`] value.
#[derive(Debug)]
pub enum ChannelError {
    /// Connecting, sending, or receiving failed
    Transport(String),
    /// The history-replay collaborator failed
    History(String),
    /// The connection was closed by the peer
    Closed,
}

impl std::fmt::Display for ChannelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelError::Transport(msg) => write!(f, "transport error: {}", msg),
            ChannelError::History(msg) => write!(f, "history error: {}", msg),
            ChannelError::Closed => write!(f, "connection closed"),
        }
    }
}

impl std::error::Error for ChannelError {}

/// Inbound half of a live connection
///
/// Ends (yields `None`) when the peer closes; an `Err` item is a transport
/// fault. Either way the channel treats it as a disconnect.
pub type MessageStream = Pin<Box<dyn Stream<Item = ChannelResult<ServerMessage>> + Send>>;

/// Outbound half of a live connection
#[async_trait]
pub trait TransportSink: Send {
    async fn send(&mut self, message: ClientMessage) -> ChannelResult<()>;
}

/// One established connection: sink plus decoded message stream
pub struct Connection {
    pub sink: Box<dyn TransportSink>,
    pub messages: MessageStream,
}

/// The persistent-connection collaborator
///
/// `connect` is called for the initial connection and again for every
/// reconnect attempt; implementations own framing, TLS, and wire decoding.
#[async_trait]
pub trait EventTransport: Send + Sync {
    async fn connect(&self) -> ChannelResult<Connection>;
}

/// The history-replay collaborator
///
/// Called once at subscription start to seed the buffer before live
/// delivery begins.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    async fn get_history(&self, task_id: &str, limit: usize) -> ChannelResult<Vec<AutomationEvent>>;
}
