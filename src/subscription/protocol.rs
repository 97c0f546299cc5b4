//! Subscription protocol messages and connection state
//!
//! The wire protocol is a tagged union in both directions. The transport
//! below this layer owns framing and reconnection mechanics; this crate owns
//! what the messages mean.

use serde::{Deserialize, Serialize};

use crate::types::{AutomationEvent, EventFilter};

/// Messages sent to the event source
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Open (or re-open) the stream for a task, with server-side filters
    Subscribe {
        task_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filters: Option<EventFilter>,
    },

    /// Stop delivery for a task
    Unsubscribe { task_id: String },

    /// Ask the source for a fresh batch of the task's current events
    Refresh { task_id: String },

    /// Keepalive
    Ping,
}

/// Messages delivered by the event source
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// One live event
    UnifiedEvent { event: AutomationEvent },

    /// Several events delivered as one buffer transition
    EventsBatch { events: Vec<AutomationEvent> },

    /// Full-record replacement for an event already delivered
    EventUpdated { event: AutomationEvent },

    /// Keepalive from the source; never touches the buffer
    Heartbeat,

    /// Reply to a ping; never touches the buffer
    Pong,
}

/// Observable state of a subscription's connection
///
/// Transport faults surface here, never as errors thrown at the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// No connection and no attempt in flight
    Disconnected,
    /// Connect or reconnect attempt in progress
    Connecting,
    /// Live and delivering
    Connected,
    /// Reconnect attempts exhausted; delivery has ended
    Error,
    /// Unsubscribed; terminal
    Closed,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Connected => write!(f, "connected"),
            ConnectionStatus::Error => write!(f, "error"),
            ConnectionStatus::Closed => write!(f, "closed"),
        }
    }
}
