//! Windowed Analytics Aggregator
//!
//! Recomputes summary statistics from a filtered event view. Every call is a
//! full recomputation over the input slice; nothing is carried between calls,
//! which bounds cost by the buffer capacity. The aggregator has no I/O and
//! cannot fail: malformed numeric fields are excluded from aggregates.

use crate::types::{
    ActionKind, ActionStat, AgentKind, AgentStat, AnalyticsSnapshot, AutomationEvent, EventStatus,
    TimelineBucket,
};
use crate::utils::{current_timestamp, hour_floor, HOUR_SECS};

/// Number of timeline buckets, one per hour ending at the current hour
pub const TIMELINE_BUCKETS: usize = 12;

/// Size of the most-common-actions ranking
const TOP_ACTIONS: usize = 5;

/// Compute analytics over `events` for the trailing `window_hours`
pub fn compute(events: &[AutomationEvent], window_hours: i64) -> AnalyticsSnapshot {
    compute_at(events, window_hours, current_timestamp())
}

/// Compute analytics as of an explicit `now` (unix seconds)
///
/// Split out so callers and tests can pin the clock.
pub fn compute_at(events: &[AutomationEvent], window_hours: i64, now: i64) -> AnalyticsSnapshot {
    let cutoff = now - window_hours.max(0) * HOUR_SECS;
    let windowed: Vec<&AutomationEvent> =
        events.iter().filter(|e| e.timestamp >= cutoff).collect();

    let total_events = windowed.len();
    let completed = windowed
        .iter()
        .filter(|e| e.status == EventStatus::Completed)
        .count();
    let failed = windowed
        .iter()
        .filter(|e| e.status == EventStatus::Failed)
        .count();
    let processed = completed + failed;

    let success_rate = percentage(completed, processed);
    let failure_rate = percentage(failed, processed);

    let durations: Vec<f64> = windowed.iter().filter_map(|e| e.duration_ms()).collect();
    let avg_processing_time = if durations.is_empty() {
        0.0
    } else {
        durations.iter().sum::<f64>() / durations.len() as f64
    };

    let most_common_actions = rank_actions(&windowed, total_events);
    let agent_distribution = agent_distribution(&windowed, total_events);
    let timeline_data = timeline(&windowed, now);
    let recent_trend = trend(&timeline_data);

    AnalyticsSnapshot {
        total_events,
        completed,
        failed,
        processed,
        success_rate,
        failure_rate,
        avg_processing_time,
        most_common_actions,
        agent_distribution,
        timeline_data,
        recent_trend,
        window_hours,
        computed_at: now,
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Top actions by count, first-seen order breaking ties
fn rank_actions(events: &[&AutomationEvent], total: usize) -> Vec<ActionStat> {
    // First-seen insertion order, so the stable sort below keeps it among ties
    let mut counts: Vec<(ActionKind, usize)> = Vec::new();
    for event in events {
        match counts.iter_mut().find(|(kind, _)| *kind == event.action_type) {
            Some((_, count)) => *count += 1,
            None => counts.push((event.action_type, 1)),
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(TOP_ACTIONS)
        .map(|(action_type, count)| ActionStat {
            action_type,
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

fn agent_distribution(events: &[&AutomationEvent], total: usize) -> Vec<AgentStat> {
    let mut slices: Vec<(AgentKind, usize, usize)> = Vec::new();
    for event in events {
        let completed = (event.status == EventStatus::Completed) as usize;
        match slices.iter_mut().find(|(kind, _, _)| *kind == event.agent_type) {
            Some((_, count, done)) => {
                *count += 1;
                *done += completed;
            }
            None => slices.push((event.agent_type, 1, completed)),
        }
    }

    slices
        .into_iter()
        .map(|(agent_type, count, done)| AgentStat {
            agent_type,
            count,
            percentage: percentage(count, total),
            success_rate: percentage(done, count),
        })
        .collect()
}

/// 12 contiguous hour buckets ending at the current hour
///
/// Bucket boundaries align to the top of the hour; membership is
/// `[bucket_start, bucket_start + 1h)`.
fn timeline(events: &[&AutomationEvent], now: i64) -> Vec<TimelineBucket> {
    let first_start = hour_floor(now) - (TIMELINE_BUCKETS as i64 - 1) * HOUR_SECS;

    let mut buckets: Vec<TimelineBucket> = (0..TIMELINE_BUCKETS)
        .map(|i| TimelineBucket {
            bucket_start: first_start + i as i64 * HOUR_SECS,
            success_count: 0,
            failure_count: 0,
            total_count: 0,
        })
        .collect();

    for event in events {
        let offset = event.timestamp - first_start;
        if offset < 0 {
            continue;
        }
        let index = (offset / HOUR_SECS) as usize;
        if index >= TIMELINE_BUCKETS {
            continue;
        }
        let bucket = &mut buckets[index];
        bucket.total_count += 1;
        match event.status {
            EventStatus::Completed => bucket.success_count += 1,
            EventStatus::Failed => bucket.failure_count += 1,
            _ => {}
        }
    }

    buckets
}

/// Percentage change in volume between the last two buckets
///
/// 0 when the second-to-last bucket is empty: a 0→N jump reads as flat
/// rather than infinite.
fn trend(buckets: &[TimelineBucket]) -> f64 {
    if buckets.len() < 2 {
        return 0.0;
    }
    let last = buckets[buckets.len() - 1].total_count;
    let previous = buckets[buckets.len() - 2].total_count;
    if previous == 0 {
        return 0.0;
    }
    (last as f64 - previous as f64) / previous as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // Fixed clock: 2024-01-01 10:30:00 UTC
    const NOW: i64 = 1704105000;

    fn event(id: &str, agent: AgentKind, action: ActionKind, status: EventStatus) -> AutomationEvent {
        AutomationEvent::new(id, "task-1", agent, action, status, "log").with_timestamp(NOW - 60)
    }

    #[test]
    fn test_empty_input_has_all_zero_rates() {
        let snapshot = compute_at(&[], 24, NOW);

        assert_eq!(snapshot.total_events, 0);
        assert_eq!(snapshot.success_rate, 0.0);
        assert_eq!(snapshot.failure_rate, 0.0);
        assert_eq!(snapshot.avg_processing_time, 0.0);
        assert_eq!(snapshot.recent_trend, 0.0);
        assert!(snapshot.most_common_actions.is_empty());
        assert!(snapshot.agent_distribution.is_empty());
        assert_eq!(snapshot.timeline_data.len(), TIMELINE_BUCKETS);
    }

    #[test]
    fn test_success_rate_ignores_unprocessed_events() {
        let events = vec![
            event("e1", AgentKind::Skyvern, ActionKind::Click, EventStatus::Completed),
            event("e2", AgentKind::Skyvern, ActionKind::Click, EventStatus::Failed),
            event("e3", AgentKind::Skyvern, ActionKind::Click, EventStatus::Pending),
            event("e4", AgentKind::Skyvern, ActionKind::Click, EventStatus::Processing),
        ];

        let snapshot = compute_at(&events, 24, NOW);
        assert_eq!(snapshot.total_events, 4);
        assert_eq!(snapshot.processed, 2);
        assert_eq!(snapshot.success_rate, 50.0);
        assert_eq!(snapshot.failure_rate, 50.0);
    }

    #[test]
    fn test_zero_processed_is_zero_rate_not_nan() {
        let events = vec![event(
            "e1",
            AgentKind::Skyvern,
            ActionKind::Wait,
            EventStatus::Pending,
        )];

        let snapshot = compute_at(&events, 24, NOW);
        assert_eq!(snapshot.success_rate, 0.0);
        assert_eq!(snapshot.failure_rate, 0.0);
    }

    #[test]
    fn test_window_restriction() {
        let inside = event("e1", AgentKind::Skyvern, ActionKind::Click, EventStatus::Completed);
        let outside = event("e2", AgentKind::Skyvern, ActionKind::Click, EventStatus::Completed)
            .with_timestamp(NOW - 25 * HOUR_SECS);

        let snapshot = compute_at(&[inside, outside], 24, NOW);
        assert_eq!(snapshot.total_events, 1);
    }

    #[test]
    fn test_avg_duration_skips_missing_and_non_numeric() {
        let events = vec![
            event("e1", AgentKind::Skyvern, ActionKind::Click, EventStatus::Completed)
                .with_metadata("duration", json!(100)),
            event("e2", AgentKind::Skyvern, ActionKind::Click, EventStatus::Completed)
                .with_metadata("duration", json!(300)),
            event("e3", AgentKind::Skyvern, ActionKind::Click, EventStatus::Completed)
                .with_metadata("duration", json!("slow")),
            event("e4", AgentKind::Skyvern, ActionKind::Click, EventStatus::Completed),
        ];

        let snapshot = compute_at(&events, 24, NOW);
        assert_eq!(snapshot.avg_processing_time, 200.0);
    }

    #[test]
    fn test_avg_duration_zero_when_none_present() {
        let events = vec![event(
            "e1",
            AgentKind::Skyvern,
            ActionKind::Click,
            EventStatus::Completed,
        )];

        let snapshot = compute_at(&events, 24, NOW);
        assert_eq!(snapshot.avg_processing_time, 0.0);
    }

    #[test]
    fn test_most_common_actions_order_and_tie_break() {
        let events = vec![
            event("e1", AgentKind::Skyvern, ActionKind::Navigate, EventStatus::Completed),
            event("e2", AgentKind::Skyvern, ActionKind::Click, EventStatus::Completed),
            event("e3", AgentKind::Skyvern, ActionKind::Click, EventStatus::Completed),
            event("e4", AgentKind::Skyvern, ActionKind::Extract, EventStatus::Completed),
        ];

        let snapshot = compute_at(&events, 24, NOW);
        let kinds: Vec<ActionKind> = snapshot
            .most_common_actions
            .iter()
            .map(|s| s.action_type)
            .collect();

        // click wins on count; navigate beats extract by first-seen order
        assert_eq!(
            kinds,
            vec![ActionKind::Click, ActionKind::Navigate, ActionKind::Extract]
        );
        assert_eq!(snapshot.most_common_actions[0].count, 2);
        assert_eq!(snapshot.most_common_actions[0].percentage, 50.0);
    }

    #[test]
    fn test_most_common_actions_capped_at_five() {
        let actions = [
            ActionKind::Click,
            ActionKind::Type,
            ActionKind::Navigate,
            ActionKind::Scroll,
            ActionKind::Wait,
            ActionKind::Extract,
        ];
        let events: Vec<AutomationEvent> = actions
            .iter()
            .enumerate()
            .map(|(i, action)| {
                event(&format!("e{}", i), AgentKind::Skyvern, *action, EventStatus::Completed)
            })
            .collect();

        let snapshot = compute_at(&events, 24, NOW);
        assert_eq!(snapshot.most_common_actions.len(), 5);
    }

    #[test]
    fn test_agent_distribution_counts_and_rates() {
        let events = vec![
            event("e1", AgentKind::Skyvern, ActionKind::Click, EventStatus::Completed),
            event("e2", AgentKind::Skyvern, ActionKind::Click, EventStatus::Failed),
            event("e3", AgentKind::Playwright, ActionKind::Click, EventStatus::Completed),
            event("e4", AgentKind::Playwright, ActionKind::Click, EventStatus::Pending),
        ];

        let snapshot = compute_at(&events, 24, NOW);
        assert_eq!(snapshot.agent_distribution.len(), 2);

        let skyvern = &snapshot.agent_distribution[0];
        assert_eq!(skyvern.agent_type, AgentKind::Skyvern);
        assert_eq!(skyvern.count, 2);
        assert_eq!(skyvern.percentage, 50.0);
        assert_eq!(skyvern.success_rate, 50.0);

        let playwright = &snapshot.agent_distribution[1];
        assert_eq!(playwright.count, 2);
        // Per-agent rate is completed over all of the agent's events
        assert_eq!(playwright.success_rate, 50.0);
    }

    #[test]
    fn test_timeline_single_recent_event() {
        let events = vec![
            event("e1", AgentKind::Skyvern, ActionKind::Click, EventStatus::Completed)
                .with_timestamp(NOW - 1800),
        ];

        let snapshot = compute_at(&events, 24, NOW);
        assert_eq!(snapshot.timeline_data.len(), TIMELINE_BUCKETS);

        let current = snapshot.timeline_data.last().unwrap();
        assert_eq!(current.bucket_start, hour_floor(NOW));
        assert_eq!(current.success_count, 1);
        assert_eq!(current.failure_count, 0);
        assert_eq!(current.total_count, 1);

        for bucket in &snapshot.timeline_data[..TIMELINE_BUCKETS - 1] {
            assert_eq!(bucket.total_count, 0);
        }
    }

    #[test]
    fn test_timeline_bucket_boundaries_half_open() {
        let boundary = hour_floor(NOW);
        let events = vec![
            // Exactly on the current hour boundary: belongs to the last bucket
            event("e1", AgentKind::Skyvern, ActionKind::Click, EventStatus::Completed)
                .with_timestamp(boundary),
            // One second before: previous bucket
            event("e2", AgentKind::Skyvern, ActionKind::Click, EventStatus::Failed)
                .with_timestamp(boundary - 1),
        ];

        let snapshot = compute_at(&events, 24, NOW);
        let last = &snapshot.timeline_data[TIMELINE_BUCKETS - 1];
        let previous = &snapshot.timeline_data[TIMELINE_BUCKETS - 2];

        assert_eq!(last.success_count, 1);
        assert_eq!(last.total_count, 1);
        assert_eq!(previous.failure_count, 1);
        assert_eq!(previous.total_count, 1);
    }

    #[test]
    fn test_trend_zero_when_previous_bucket_empty() {
        // 5 events in the current hour, none in the previous: flat, not infinite
        let events: Vec<AutomationEvent> = (0..5)
            .map(|i| {
                event(&format!("e{}", i), AgentKind::Skyvern, ActionKind::Click, EventStatus::Completed)
                    .with_timestamp(NOW - 60)
            })
            .collect();

        let snapshot = compute_at(&events, 24, NOW);
        assert_eq!(snapshot.recent_trend, 0.0);
    }

    #[test]
    fn test_trend_percentage_change() {
        let previous_hour = hour_floor(NOW) - HOUR_SECS;
        let mut events = vec![
            event("p1", AgentKind::Skyvern, ActionKind::Click, EventStatus::Completed)
                .with_timestamp(previous_hour + 10),
            event("p2", AgentKind::Skyvern, ActionKind::Click, EventStatus::Completed)
                .with_timestamp(previous_hour + 20),
        ];
        for i in 0..3 {
            events.push(
                event(&format!("c{}", i), AgentKind::Skyvern, ActionKind::Click, EventStatus::Completed)
                    .with_timestamp(NOW - 60),
            );
        }

        let snapshot = compute_at(&events, 24, NOW);
        // 2 -> 3 is +50%
        assert_eq!(snapshot.recent_trend, 50.0);
    }

    #[test]
    fn test_unknown_status_counts_toward_totals_only() {
        let events = vec![
            event("e1", AgentKind::Other, ActionKind::Other, EventStatus::Unknown),
            event("e2", AgentKind::Skyvern, ActionKind::Click, EventStatus::Completed),
        ];

        let snapshot = compute_at(&events, 24, NOW);
        assert_eq!(snapshot.total_events, 2);
        assert_eq!(snapshot.processed, 1);
        assert_eq!(snapshot.success_rate, 100.0);

        let current = snapshot.timeline_data.last().unwrap();
        assert_eq!(current.total_count, 2);
        assert_eq!(current.success_count, 1);
    }
}
