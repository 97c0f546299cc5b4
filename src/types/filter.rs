//! Composable event filter
//!
//! A filter is a predicate over event fields. All set fields are ANDed; an
//! unset field imposes no constraint. The filter also travels inside the
//! `subscribe` message so the server can pre-filter its side of the stream.

use serde::{Deserialize, Serialize};

use super::event::{ActionKind, AgentKind, EventStatus};

/// Inclusive timestamp bounds (unix seconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: i64,
    pub end: i64,
}

impl DateRange {
    /// Whether `timestamp` falls within the range, bounds included
    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }
}

/// Filter over the event stream
///
/// A field set to an empty list is treated identically to an unset field:
/// callers routinely build filters from UI multi-selects that start out
/// empty, and "empty selection" must mean "everything", never "nothing".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventFilter {
    /// Pass events whose agent backend is in the set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_types: Option<Vec<AgentKind>>,

    /// Pass events whose action kind is in the set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_types: Option<Vec<ActionKind>>,

    /// Pass events whose status is in the set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statuses: Option<Vec<EventStatus>>,

    /// Case-insensitive substring match over title, description, or raw log
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,

    /// Inclusive bounds on the event timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

impl EventFilter {
    /// A filter that passes everything
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to the given agent backends
    pub fn with_agent_types(mut self, agent_types: Vec<AgentKind>) -> Self {
        self.agent_types = Some(agent_types);
        self
    }

    /// Restrict to the given action kinds
    pub fn with_action_types(mut self, action_types: Vec<ActionKind>) -> Self {
        self.action_types = Some(action_types);
        self
    }

    /// Restrict to the given statuses
    pub fn with_statuses(mut self, statuses: Vec<EventStatus>) -> Self {
        self.statuses = Some(statuses);
        self
    }

    /// Set the free-text query
    pub fn with_search_query(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    /// Set the timestamp range
    pub fn with_date_range(mut self, start: i64, end: i64) -> Self {
        self.date_range = Some(DateRange { start, end });
        self
    }

    /// Whether any field actually constrains the stream
    ///
    /// Empty lists and blank queries count as unset.
    pub fn is_unconstrained(&self) -> bool {
        set_is_unset(&self.agent_types)
            && set_is_unset(&self.action_types)
            && set_is_unset(&self.statuses)
            && self.search_query.as_deref().map_or(true, str::is_empty)
            && self.date_range.is_none()
    }
}

/// Normalization shared by the filter engine: empty set == unset
pub(crate) fn set_is_unset<T>(set: &Option<Vec<T>>) -> bool {
    set.as_ref().map_or(true, Vec::is_empty)
}
