//! Subscription channel for live event delivery
//!
//! One subscription per task: seeds from history replay, connects through an
//! external transport, and pumps the tagged-union protocol into the bounded
//! buffer in arrival order.
//!
//! ## Connection lifecycle
//!
//! ```text
//! disconnected ──► connecting ──► connected ──┬──► disconnected (reconnecting)
//!                      │                      └──► closed (unsubscribed)
//!                      └──► error (attempts exhausted)
//! ```
//!
//! Every (re)connect re-sends `subscribe` with the filter current at that
//! moment before any further event is processed, so server-side filtering
//! state survives the gap. Events missed while disconnected are not
//! backfilled; callers issue `refresh` or fall back to history replay.

pub mod channel;
pub mod protocol;
pub mod reconnect;
pub mod transport;

pub use channel::{ChannelConfig, EventChannel, SubscriptionHandle};
pub use protocol::{ClientMessage, ConnectionStatus, ServerMessage};
pub use reconnect::ReconnectPolicy;
pub use transport::{
    ChannelError, ChannelResult, Connection, EventTransport, HistoryProvider, MessageStream,
    TransportSink,
};
