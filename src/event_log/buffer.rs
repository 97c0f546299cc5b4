//! Bounded Event Buffer
//!
//! The buffer is the live window over a task's event stream: append-only at
//! the tail, evicting from the head once capacity is exceeded, with
//! update-in-place for amended events. It is exclusively owned by its
//! subscription, so it carries no locking of its own; every operation is a
//! total function.

use std::collections::VecDeque;

use crate::types::AutomationEvent;

/// Capacity-bounded, arrival-ordered window of events
///
/// Eviction and insertion happen inside a single call, so consumers never
/// observe a buffer above capacity or a partially applied batch. A version
/// counter advances on every applied mutation so downstream stages know when
/// recomputation is needed.
#[derive(Debug, Clone)]
pub struct EventBuffer {
    events: VecDeque<AutomationEvent>,
    max_events: usize,
    version: u64,
}

impl EventBuffer {
    /// Create a buffer holding at most `max_events` entries
    ///
    /// Capacity is clamped to at least 1.
    pub fn new(max_events: usize) -> Self {
        let max_events = max_events.max(1);
        Self {
            events: VecDeque::with_capacity(max_events),
            max_events,
            version: 0,
        }
    }

    /// Number of events currently held
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Configured capacity bound
    pub fn max_events(&self) -> usize {
        self.max_events
    }

    /// Version counter, advanced by every applied mutation
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Append one event at the tail, evicting from the head if needed
    pub fn append(&mut self, event: AutomationEvent) {
        self.events.push_back(event);
        self.evict_to_capacity();
        self.version += 1;
    }

    /// Append a batch of events as a single transition
    ///
    /// The whole batch lands before eviction runs, and the version advances
    /// once, so analytics recompute at most once per batch.
    pub fn append_batch(&mut self, events: Vec<AutomationEvent>) {
        if events.is_empty() {
            return;
        }
        self.events.extend(events);
        self.evict_to_capacity();
        self.version += 1;
    }

    /// Replace the event whose `id` matches, preserving its position
    ///
    /// Returns `true` when a replacement happened. An update addressed to an
    /// id not currently in the buffer is dropped: it must not resurrect an
    /// evicted event. A replacement that moves the status backwards through
    /// the lifecycle is applied anyway and reported as a data anomaly.
    pub fn update(&mut self, event: AutomationEvent) -> bool {
        let slot = match self.events.iter_mut().find(|e| e.id == event.id) {
            Some(slot) => slot,
            None => return false,
        };

        if !slot.status.can_advance_to(event.status) {
            eprintln!(
                "Warning: event {} status regressed {} -> {} (applying anyway)",
                event.id, slot.status, event.status
            );
        }

        *slot = event;
        self.version += 1;
        true
    }

    /// Ordered, immutable copy of the current window
    ///
    /// Consumers get owned data; nothing they do to it can touch the buffer.
    pub fn snapshot(&self) -> Vec<AutomationEvent> {
        self.events.iter().cloned().collect()
    }

    fn evict_to_capacity(&mut self) {
        while self.events.len() > self.max_events {
            self.events.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActionKind, AgentKind, EventStatus};

    fn event(id: &str) -> AutomationEvent {
        AutomationEvent::new(
            id,
            "task-1",
            AgentKind::Playwright,
            ActionKind::Click,
            EventStatus::Pending,
            format!("log for {}", id),
        )
    }

    fn ids(buffer: &EventBuffer) -> Vec<String> {
        buffer.snapshot().into_iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_append_within_capacity() {
        let mut buffer = EventBuffer::new(3);
        buffer.append(event("a"));
        buffer.append(event("b"));

        assert_eq!(buffer.len(), 2);
        assert_eq!(ids(&buffer), vec!["a", "b"]);
    }

    #[test]
    fn test_eviction_keeps_last_max_events() {
        let mut buffer = EventBuffer::new(3);
        for id in ["a", "b", "c", "d"] {
            buffer.append(event(id));
        }

        assert_eq!(buffer.len(), 3);
        assert_eq!(ids(&buffer), vec!["b", "c", "d"]);
    }

    #[test]
    fn test_batch_append_evicts_as_one_transition() {
        let mut buffer = EventBuffer::new(3);
        for id in ["a", "b", "c", "d"] {
            buffer.append(event(id));
        }
        let version_before = buffer.version();

        buffer.append_batch(vec![event("e"), event("f")]);

        assert_eq!(ids(&buffer), vec!["d", "e", "f"]);
        // One version bump for the whole batch
        assert_eq!(buffer.version(), version_before + 1);
    }

    #[test]
    fn test_batch_larger_than_capacity() {
        let mut buffer = EventBuffer::new(2);
        buffer.append_batch(vec![event("a"), event("b"), event("c"), event("d")]);

        assert_eq!(ids(&buffer), vec!["c", "d"]);
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let mut buffer = EventBuffer::new(2);
        buffer.append_batch(Vec::new());

        assert!(buffer.is_empty());
        assert_eq!(buffer.version(), 0);
    }

    #[test]
    fn test_update_replaces_in_place() {
        let mut buffer = EventBuffer::new(3);
        buffer.append(event("a"));
        buffer.append(event("b"));
        buffer.append(event("c"));

        let mut amended = event("b");
        amended.status = EventStatus::Completed;
        amended.ai_title = Some("done".to_string());

        assert!(buffer.update(amended));

        let snapshot = buffer.snapshot();
        // Position preserved: still second
        assert_eq!(snapshot[1].id, "b");
        assert_eq!(snapshot[1].status, EventStatus::Completed);
        assert_eq!(snapshot[1].ai_title.as_deref(), Some("done"));
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut buffer = EventBuffer::new(3);
        buffer.append(event("a"));
        let version_before = buffer.version();

        assert!(!buffer.update(event("ghost")));

        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.version(), version_before);
    }

    #[test]
    fn test_update_cannot_resurrect_evicted_event() {
        let mut buffer = EventBuffer::new(2);
        buffer.append(event("a"));
        buffer.append(event("b"));
        buffer.append(event("c")); // evicts "a"

        let mut amended = event("a");
        amended.status = EventStatus::Completed;

        assert!(!buffer.update(amended));
        assert_eq!(ids(&buffer), vec!["b", "c"]);
    }

    #[test]
    fn test_regressive_update_still_applies() {
        let mut buffer = EventBuffer::new(2);
        let mut done = event("a");
        done.status = EventStatus::Completed;
        buffer.append(done);

        // completed -> pending is a regression; applied permissively
        assert!(buffer.update(event("a")));
        assert_eq!(buffer.snapshot()[0].status, EventStatus::Pending);
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let mut buffer = EventBuffer::new(2);
        buffer.append(event("a"));

        let mut snapshot = buffer.snapshot();
        snapshot[0].id = "mutated".to_string();
        snapshot.clear();

        assert_eq!(ids(&buffer), vec!["a"]);
    }

    #[test]
    fn test_capacity_clamped_to_one() {
        let mut buffer = EventBuffer::new(0);
        buffer.append(event("a"));
        buffer.append(event("b"));

        assert_eq!(ids(&buffer), vec!["b"]);
    }
}
