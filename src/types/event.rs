//! Core event record for the unified automation stream
//!
//! An [`AutomationEvent`] is one observed action performed by a browser
//! automation agent. Events arrive over the subscription channel, live in a
//! bounded buffer, and feed the filter engine and analytics aggregator.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Agent backend that produced an event
///
/// The set is closed on the wire today, but backends get added faster than
/// dashboards get redeployed, so unknown values deserialize to
/// [`AgentKind::Other`] instead of failing the whole message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentKind {
    Skyvern,
    Playwright,
    BrowserUse,
    Selenium,
    Puppeteer,
    /// Unrecognized backend, kept and displayed under a generic label
    #[serde(other)]
    Other,
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentKind::Skyvern => write!(f, "skyvern"),
            AgentKind::Playwright => write!(f, "playwright"),
            AgentKind::BrowserUse => write!(f, "browser-use"),
            AgentKind::Selenium => write!(f, "selenium"),
            AgentKind::Puppeteer => write!(f, "puppeteer"),
            AgentKind::Other => write!(f, "other"),
        }
    }
}

/// Kind of browser action an event records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Click,
    Type,
    Navigate,
    Scroll,
    Wait,
    Extract,
    Submit,
    Error,
    Success,
    /// Unrecognized action, kept under a generic label
    #[serde(other)]
    Other,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Click => write!(f, "click"),
            ActionKind::Type => write!(f, "type"),
            ActionKind::Navigate => write!(f, "navigate"),
            ActionKind::Scroll => write!(f, "scroll"),
            ActionKind::Wait => write!(f, "wait"),
            ActionKind::Extract => write!(f, "extract"),
            ActionKind::Submit => write!(f, "submit"),
            ActionKind::Error => write!(f, "error"),
            ActionKind::Success => write!(f, "success"),
            ActionKind::Other => write!(f, "other"),
        }
    }
}

/// Lifecycle state of an event
///
/// `pending → processing → {completed | failed}`, with `cancelled` and
/// `timeout` reachable from either non-terminal state. Terminal states never
/// advance further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
    Timeout,
    /// Unrecognized status from a newer backend
    #[serde(other)]
    Unknown,
}

impl EventStatus {
    /// Whether this status is a terminal lifecycle state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EventStatus::Completed
                | EventStatus::Failed
                | EventStatus::Cancelled
                | EventStatus::Timeout
        )
    }

    /// Whether moving to `next` is a forward step through the lifecycle
    ///
    /// Staying on the same status counts as forward (updates may amend other
    /// fields without a transition). `Unknown` imposes no constraint in
    /// either direction.
    pub fn can_advance_to(&self, next: EventStatus) -> bool {
        if *self == next || *self == EventStatus::Unknown || next == EventStatus::Unknown {
            return true;
        }
        match self {
            EventStatus::Pending => true,
            EventStatus::Processing => next != EventStatus::Pending,
            // Terminal states never transition further
            _ => false,
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::Pending => write!(f, "pending"),
            EventStatus::Processing => write!(f, "processing"),
            EventStatus::Completed => write!(f, "completed"),
            EventStatus::Failed => write!(f, "failed"),
            EventStatus::Cancelled => write!(f, "cancelled"),
            EventStatus::Timeout => write!(f, "timeout"),
            EventStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// One observed automation action
///
/// `id` is unique within a task's stream, not globally; after eviction the
/// same id may legitimately reappear for the same task. The AI enrichment
/// fields are absent until a downstream pass completes and are never
/// guaranteed present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationEvent {
    /// Identifier, unique within the owning task's stream
    pub id: String,

    /// The owning automation run
    pub task_id: String,

    /// Unix timestamp (seconds), assigned by the producing agent
    pub timestamp: i64,

    /// Which agent backend produced the event
    pub agent_type: AgentKind,

    /// What kind of action was performed
    pub action_type: ActionKind,

    /// Lifecycle state
    pub status: EventStatus,

    /// AI-generated title (enrichment, optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_title: Option<String>,

    /// AI-generated description (enrichment, optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_description: Option<String>,

    /// Enrichment confidence in 0..=1 (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,

    /// Opaque original log text, always present
    pub raw_log: String,

    /// Open key/value map: url, selector, duration (ms), screenshot,
    /// error message, coordinates, arbitrary extras. No key is guaranteed.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl AutomationEvent {
    /// Create a new event stamped with the current time
    pub fn new(
        id: impl Into<String>,
        task_id: impl Into<String>,
        agent_type: AgentKind,
        action_type: ActionKind,
        status: EventStatus,
        raw_log: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            task_id: task_id.into(),
            timestamp: crate::utils::current_timestamp(),
            agent_type,
            action_type,
            status,
            ai_title: None,
            ai_description: None,
            confidence_score: None,
            raw_log: raw_log.into(),
            metadata: Map::new(),
        }
    }

    /// Set a specific producer timestamp
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set the AI enrichment title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.ai_title = Some(title.into());
        self
    }

    /// Set the AI enrichment description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.ai_description = Some(description.into());
        self
    }

    /// Set a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Duration of the action in milliseconds, if recorded and numeric
    ///
    /// Non-numeric `duration` values are treated as absent so aggregates can
    /// skip them without raising.
    pub fn duration_ms(&self) -> Option<f64> {
        self.metadata.get("duration").and_then(Value::as_f64)
    }
}
