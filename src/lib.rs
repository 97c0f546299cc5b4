//! Unified automation event stream engine
//!
//! Live feed of heterogeneous browser-automation events (clicks,
//! navigations, extractions, errors) from multiple agent backends, held in a
//! bounded in-memory window per task, filtered along independent dimensions,
//! and continuously re-aggregated into time-bucketed success/failure
//! statistics.
//!
//! # Features
//!
//! - **Bounded buffering**: capacity-limited window with update-in-place,
//!   oldest-first eviction, lossy by design
//! - **Composable filtering**: agent/action/status sets, free-text search,
//!   time range, all ANDed
//! - **Windowed analytics**: success rates, duration averages, action and
//!   agent distributions, a 12-bucket hourly timeline, and volume trend
//! - **Resilient delivery**: bounded reconnect with jittered backoff and
//!   automatic resubscription over a pluggable transport
//! - **Export**: filtered views serialized into downloadable artifacts
//!
//! # Modules
//!
//! - `types`: core data structures (events, filters, analytics records)
//! - `event_log`: bounded buffer, filter engine, aggregator, export
//! - `subscription`: protocol, transport seams, reconnect policy, channel
//! - `utils`: timestamp helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use agent_stream::{EventChannel, EventFilter, EventStatus};
//! # use agent_stream::EventTransport;
//!
//! # async fn run(transport: Arc<dyn EventTransport>) {
//! let channel = EventChannel::new(transport);
//! let handle = channel.subscribe("task-42", EventFilter::all());
//!
//! // ... events stream in ...
//!
//! handle.set_filter(EventFilter::all().with_statuses(vec![EventStatus::Failed]));
//! let stats = handle.analytics(24);
//! println!("success rate: {:.1}%", stats.success_rate);
//! # }
//! ```

pub mod event_log;
pub mod subscription;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use event_log::{EventBuffer, ExportArtifact, ExportDocument, ExportError, ExportResult};
pub use subscription::{
    ChannelConfig, ChannelError, ChannelResult, ClientMessage, Connection, ConnectionStatus,
    EventChannel, EventTransport, HistoryProvider, MessageStream, ReconnectPolicy, ServerMessage,
    SubscriptionHandle, TransportSink,
};
pub use types::{
    ActionKind, ActionStat, AgentKind, AgentStat, AnalyticsSnapshot, AutomationEvent, DateRange,
    EventFilter, EventStatus, TimelineBucket,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
