//! Subscription channel: per-task delivery, reconnect, and the handle API
//!
//! One subscription owns one buffer and one worker task. The worker is the
//! single writer: it seeds the buffer from history, connects through the
//! transport, re-sends `subscribe` (with the filter current at that moment)
//! on every connect before touching the stream, and applies messages in
//! arrival order. Transport faults feed a bounded backoff loop and surface
//! only as a [`ConnectionStatus`] value.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use parking_lot::{Mutex, RwLock};
use tokio::sync::{mpsc, watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_stream::wrappers::WatchStream;

use super::protocol::{ClientMessage, ConnectionStatus, ServerMessage};
use super::reconnect::ReconnectPolicy;
use super::transport::{
    ChannelError, ChannelResult, Connection, EventTransport, HistoryProvider, TransportSink,
};
use crate::event_log::{self, EventBuffer, ExportArtifact, ExportResult};
use crate::types::{AnalyticsSnapshot, AutomationEvent, EventFilter};

/// Tuning for a subscription
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Buffer capacity per task subscription
    pub max_events: usize,
    /// How many events to request from history replay at start
    pub history_limit: usize,
    /// Interval between keepalive pings
    pub heartbeat_interval: Duration,
    /// Backoff applied to connect and reconnect attempts
    pub reconnect: ReconnectPolicy,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            max_events: 500,
            history_limit: 200,
            heartbeat_interval: Duration::from_secs(30),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl ChannelConfig {
    /// Set the buffer capacity
    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events;
        self
    }

    /// Set the history seed size
    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }

    /// Set the keepalive interval
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Set the reconnect policy
    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }
}

/// Entry point: binds a transport (and optionally history replay) so task
/// subscriptions can be opened against them
pub struct EventChannel {
    transport: Arc<dyn EventTransport>,
    history: Option<Arc<dyn HistoryProvider>>,
    config: ChannelConfig,
}

impl EventChannel {
    /// Create a channel over the given transport
    pub fn new(transport: Arc<dyn EventTransport>) -> Self {
        Self {
            transport,
            history: None,
            config: ChannelConfig::default(),
        }
    }

    /// Seed new subscriptions from this history-replay collaborator
    pub fn with_history(mut self, history: Arc<dyn HistoryProvider>) -> Self {
        self.history = Some(history);
        self
    }

    /// Use a custom configuration
    pub fn with_config(mut self, config: ChannelConfig) -> Self {
        self.config = config;
        self
    }

    /// Open a subscription for `task_id`
    ///
    /// Spawns the delivery worker and returns immediately; connection
    /// progress is observable through the handle's status feed.
    pub fn subscribe(
        &self,
        task_id: impl Into<String>,
        initial_filter: EventFilter,
    ) -> SubscriptionHandle {
        let task_id = task_id.into();
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Disconnected);
        let (version_tx, version_rx) = watch::channel(0u64);

        let shared = Arc::new(Shared {
            task_id,
            buffer: Mutex::new(EventBuffer::new(self.config.max_events)),
            filter: RwLock::new(initial_filter),
            status_tx,
            version_tx,
            sink: AsyncMutex::new(None),
        });

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(
            shared.clone(),
            self.transport.clone(),
            self.history.clone(),
            self.config.clone(),
            command_rx,
        ));

        SubscriptionHandle {
            shared,
            commands: command_tx,
            status_rx,
            version_rx,
            worker,
        }
    }
}

/// Live handle to one task subscription
///
/// Cheap read operations go straight to the shared state; everything that
/// talks to the wire is routed through the worker so buffer mutations stay
/// serialized.
pub struct SubscriptionHandle {
    shared: Arc<Shared>,
    commands: mpsc::UnboundedSender<Command>,
    status_rx: watch::Receiver<ConnectionStatus>,
    version_rx: watch::Receiver<u64>,
    worker: JoinHandle<()>,
}

impl SubscriptionHandle {
    /// The subscribed task
    pub fn task_id(&self) -> &str {
        &self.shared.task_id
    }

    /// Current connection status
    pub fn status(&self) -> ConnectionStatus {
        *self.status_rx.borrow()
    }

    /// Watch feed of connection status transitions
    pub fn status_changes(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_rx.clone()
    }

    /// Current buffer version
    pub fn buffer_version(&self) -> u64 {
        *self.version_rx.borrow()
    }

    /// Watch feed of buffer versions; bumped on every applied mutation
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.version_rx.clone()
    }

    /// The version feed as a `Stream`, for consumers driving re-renders
    pub fn changes_stream(&self) -> WatchStream<u64> {
        WatchStream::new(self.version_rx.clone())
    }

    /// Ordered, immutable copy of the current buffer window
    pub fn snapshot(&self) -> Vec<AutomationEvent> {
        self.shared.buffer.lock().snapshot()
    }

    /// The currently active filter
    pub fn filter(&self) -> EventFilter {
        self.shared.filter.read().clone()
    }

    /// Replace the filter
    ///
    /// Takes effect immediately for local views; the worker re-sends
    /// `subscribe` so server-side filtering state follows.
    pub fn set_filter(&self, filter: EventFilter) {
        *self.shared.filter.write() = filter;
        let _ = self.commands.send(Command::Resubscribe);
    }

    /// The buffer window with the current filter applied
    pub fn filtered(&self) -> Vec<AutomationEvent> {
        let snapshot = self.snapshot();
        let filter = self.filter();
        event_log::filter::apply(&snapshot, &filter)
    }

    /// Analytics over the filtered view for the trailing window
    pub fn analytics(&self, window_hours: i64) -> AnalyticsSnapshot {
        event_log::analytics::compute(&self.filtered(), window_hours)
    }

    /// Export the filtered view as a downloadable artifact
    pub fn export(&self) -> ExportResult<ExportArtifact> {
        event_log::export::export(&self.shared.task_id, &self.filtered())
    }

    /// Ask the source for a fresh batch of the task's events
    ///
    /// Dropped silently while disconnected; missed events are not backfilled
    /// automatically.
    pub fn refresh(&self) {
        let _ = self.commands.send(Command::Refresh);
    }

    /// Tear the subscription down
    ///
    /// Aborts the worker (no further buffer mutations, reconnect timers
    /// released) and fires a best-effort wire `unsubscribe`.
    pub fn unsubscribe(self) {
        self.worker.abort();
        self.shared.set_status(ConnectionStatus::Closed);

        let shared = self.shared.clone();
        tokio::spawn(async move {
            let mut slot = shared.sink.lock().await;
            if let Some(sink) = slot.as_mut() {
                let _ = sink
                    .send(ClientMessage::Unsubscribe {
                        task_id: shared.task_id.clone(),
                    })
                    .await;
            }
            *slot = None;
        });
    }
}

/// State owned by one subscription, shared between worker and handle
struct Shared {
    task_id: String,
    buffer: Mutex<EventBuffer>,
    filter: RwLock<EventFilter>,
    status_tx: watch::Sender<ConnectionStatus>,
    version_tx: watch::Sender<u64>,
    /// Outbound half of the live connection; `None` while disconnected
    sink: AsyncMutex<Option<Box<dyn TransportSink>>>,
}

impl Shared {
    fn set_status(&self, status: ConnectionStatus) {
        self.status_tx.send_replace(status);
    }

    fn subscribe_message(&self) -> ClientMessage {
        ClientMessage::Subscribe {
            task_id: self.task_id.clone(),
            filters: Some(self.filter.read().clone()),
        }
    }

    /// Apply one server message to the buffer, publishing the new version
    /// when contents actually changed
    fn apply_message(&self, message: ServerMessage) {
        let version = {
            let mut buffer = self.buffer.lock();
            let before = buffer.version();
            match message {
                ServerMessage::UnifiedEvent { event } => buffer.append(event),
                ServerMessage::EventsBatch { events } => buffer.append_batch(events),
                ServerMessage::EventUpdated { event } => {
                    buffer.update(event);
                }
                ServerMessage::Heartbeat | ServerMessage::Pong => {}
            }
            let after = buffer.version();
            if after == before {
                return;
            }
            after
        };
        self.version_tx.send_replace(version);
    }

    async fn send(&self, message: ClientMessage) -> ChannelResult<()> {
        let mut slot = self.sink.lock().await;
        match slot.as_mut() {
            Some(sink) => sink.send(message).await,
            None => Err(ChannelError::Closed),
        }
    }
}

enum Command {
    Refresh,
    Resubscribe,
}

enum LoopOutcome {
    Reconnect,
    Stop,
}

async fn run_worker(
    shared: Arc<Shared>,
    transport: Arc<dyn EventTransport>,
    history: Option<Arc<dyn HistoryProvider>>,
    config: ChannelConfig,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    if let Some(history) = &history {
        seed_history(&shared, history.as_ref(), config.history_limit).await;
    }

    loop {
        let connection =
            match connect_with_backoff(&shared, transport.as_ref(), &config, &mut commands).await {
                Some(connection) => connection,
                None => return,
            };

        match drive(&shared, &config, &mut commands, connection).await {
            LoopOutcome::Reconnect => continue,
            LoopOutcome::Stop => return,
        }
    }
}

/// Seed the buffer once from history replay, before live delivery
async fn seed_history(shared: &Shared, history: &dyn HistoryProvider, limit: usize) {
    match history.get_history(&shared.task_id, limit).await {
        Ok(events) => shared.apply_message(ServerMessage::EventsBatch { events }),
        Err(e) => eprintln!(
            "Warning: history seed for task {} failed: {}",
            shared.task_id, e
        ),
    }
}

/// Connect (or reconnect) within the policy's attempt limit
///
/// Sends `subscribe` with the current filter on the fresh connection before
/// any message is read from it. Returns `None` when the attempts run out
/// (status `error`) or the handle went away (status `closed`).
async fn connect_with_backoff(
    shared: &Shared,
    transport: &dyn EventTransport,
    config: &ChannelConfig,
    commands: &mut mpsc::UnboundedReceiver<Command>,
) -> Option<Connection> {
    let policy = &config.reconnect;

    for attempt in 1..=policy.max_attempts.max(1) {
        shared.set_status(ConnectionStatus::Connecting);

        match transport.connect().await {
            Ok(mut connection) => {
                match connection.sink.send(shared.subscribe_message()).await {
                    Ok(()) => {
                        shared.set_status(ConnectionStatus::Connected);
                        return Some(connection);
                    }
                    Err(e) => eprintln!(
                        "Warning: subscribe for task {} failed on attempt {}: {}",
                        shared.task_id, attempt, e
                    ),
                }
            }
            Err(e) => eprintln!(
                "Warning: connect for task {} failed on attempt {}: {}",
                shared.task_id, attempt, e
            ),
        }

        if attempt < policy.max_attempts {
            let deadline = time::Instant::now() + policy.delay_for_attempt(attempt);
            loop {
                tokio::select! {
                    _ = time::sleep_until(deadline) => break,
                    command = commands.recv() => match command {
                        // Filter changes are picked up by the next subscribe;
                        // refresh has no connection to go out on.
                        Some(_) => {}
                        None => {
                            shared.set_status(ConnectionStatus::Closed);
                            return None;
                        }
                    }
                }
            }
        }
    }

    shared.set_status(ConnectionStatus::Error);
    None
}

/// Pump one live connection until it drops or the subscription ends
async fn drive(
    shared: &Shared,
    config: &ChannelConfig,
    commands: &mut mpsc::UnboundedReceiver<Command>,
    connection: Connection,
) -> LoopOutcome {
    let Connection { sink, mut messages } = connection;
    *shared.sink.lock().await = Some(sink);

    let mut heartbeat = time::interval_at(
        time::Instant::now() + config.heartbeat_interval,
        config.heartbeat_interval,
    );

    let outcome = loop {
        tokio::select! {
            message = messages.next() => match message {
                Some(Ok(message)) => shared.apply_message(message),
                Some(Err(e)) => {
                    eprintln!(
                        "Warning: stream fault for task {}: {}",
                        shared.task_id, e
                    );
                    break LoopOutcome::Reconnect;
                }
                None => break LoopOutcome::Reconnect,
            },

            command = commands.recv() => match command {
                Some(Command::Refresh) => {
                    let refresh = ClientMessage::Refresh {
                        task_id: shared.task_id.clone(),
                    };
                    if shared.send(refresh).await.is_err() {
                        break LoopOutcome::Reconnect;
                    }
                }
                Some(Command::Resubscribe) => {
                    if shared.send(shared.subscribe_message()).await.is_err() {
                        break LoopOutcome::Reconnect;
                    }
                }
                // Handle dropped without an explicit unsubscribe
                None => break LoopOutcome::Stop,
            },

            _ = heartbeat.tick() => {
                if shared.send(ClientMessage::Ping).await.is_err() {
                    break LoopOutcome::Reconnect;
                }
            }
        }
    };

    *shared.sink.lock().await = None;
    match outcome {
        LoopOutcome::Reconnect => shared.set_status(ConnectionStatus::Disconnected),
        LoopOutcome::Stop => shared.set_status(ConnectionStatus::Closed),
    }
    outcome
}
