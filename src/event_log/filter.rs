//! Filter Engine
//!
//! Pure predicate evaluation over a buffer snapshot. All specified filter
//! fields are ANDed together; unset (or empty) fields impose no constraint.

use crate::types::{set_is_unset, AutomationEvent, EventFilter};

/// Whether a single event passes the filter
pub fn matches(event: &AutomationEvent, filter: &EventFilter) -> bool {
    if let Some(agents) = &filter.agent_types {
        if !agents.is_empty() && !agents.contains(&event.agent_type) {
            return false;
        }
    }

    if let Some(actions) = &filter.action_types {
        if !actions.is_empty() && !actions.contains(&event.action_type) {
            return false;
        }
    }

    if let Some(statuses) = &filter.statuses {
        if !statuses.is_empty() && !statuses.contains(&event.status) {
            return false;
        }
    }

    if let Some(query) = filter.search_query.as_deref() {
        if !query.is_empty() && !matches_text(event, query) {
            return false;
        }
    }

    if let Some(range) = &filter.date_range {
        if !range.contains(event.timestamp) {
            return false;
        }
    }

    true
}

/// Apply the filter to an ordered snapshot, preserving order
///
/// Pure function: no side effects, and `apply(apply(s, f), f) == apply(s, f)`.
pub fn apply(events: &[AutomationEvent], filter: &EventFilter) -> Vec<AutomationEvent> {
    if is_passthrough(filter) {
        return events.to_vec();
    }
    events
        .iter()
        .filter(|event| matches(event, filter))
        .cloned()
        .collect()
}

/// Case-insensitive substring search over title, description, and raw log
///
/// Passing any one of the three fields is enough.
fn matches_text(event: &AutomationEvent, query: &str) -> bool {
    let needle = query.to_lowercase();

    let field_contains =
        |field: Option<&str>| field.map_or(false, |text| text.to_lowercase().contains(&needle));

    field_contains(event.ai_title.as_deref())
        || field_contains(event.ai_description.as_deref())
        || event.raw_log.to_lowercase().contains(&needle)
}

fn is_passthrough(filter: &EventFilter) -> bool {
    set_is_unset(&filter.agent_types)
        && set_is_unset(&filter.action_types)
        && set_is_unset(&filter.statuses)
        && filter.search_query.as_deref().map_or(true, str::is_empty)
        && filter.date_range.is_none()
}
