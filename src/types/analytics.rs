//! Aggregate statistics computed from a filtered event view
//!
//! These are plain serializable records handed to the dashboard; the math
//! lives in `event_log::analytics`.

use serde::{Deserialize, Serialize};

use super::event::{ActionKind, AgentKind};

/// One entry of the most-common-actions ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionStat {
    pub action_type: ActionKind,
    pub count: usize,
    /// Share of all in-window events, 0..=100
    pub percentage: f64,
}

/// Per-agent slice of the in-window events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStat {
    pub agent_type: AgentKind,
    pub count: usize,
    /// Share of all in-window events, 0..=100
    pub percentage: f64,
    /// Completed events over all events for this agent, 0..=100
    pub success_rate: f64,
}

/// One hour-wide timeline bucket, aligned to the top of the hour
///
/// Membership is `[bucket_start, bucket_start + 3600)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineBucket {
    /// Unix timestamp of the bucket's start (top of an hour)
    pub bucket_start: i64,
    pub success_count: usize,
    pub failure_count: usize,
    pub total_count: usize,
}

/// Summary statistics over the filtered, time-windowed event view
///
/// Recomputed in full whenever the buffer or filter changes; never carries
/// state between computations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    /// Events inside the time window
    pub total_events: usize,
    pub completed: usize,
    pub failed: usize,
    /// `completed + failed`
    pub processed: usize,
    /// `completed / processed * 100`, 0 when nothing has been processed
    pub success_rate: f64,
    /// `failed / processed * 100`, 0 when nothing has been processed
    pub failure_rate: f64,
    /// Mean of `metadata.duration` (ms) over events that carry it, else 0
    pub avg_processing_time: f64,
    /// Top 5 action kinds by count, first-seen order breaking ties
    pub most_common_actions: Vec<ActionStat>,
    /// Count, share, and success rate per agent backend
    pub agent_distribution: Vec<AgentStat>,
    /// 12 contiguous 1-hour buckets ending at the current hour
    pub timeline_data: Vec<TimelineBucket>,
    /// Percentage change in volume between the last two buckets; 0 when the
    /// second-to-last bucket is empty, so a 0→N jump reads as flat
    pub recent_trend: f64,
    /// Window the snapshot covers, in hours
    pub window_hours: i64,
    /// When the snapshot was computed (unix seconds)
    pub computed_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_serialization() {
        let snapshot = AnalyticsSnapshot {
            total_events: 2,
            completed: 1,
            failed: 1,
            processed: 2,
            success_rate: 50.0,
            failure_rate: 50.0,
            avg_processing_time: 120.0,
            most_common_actions: vec![ActionStat {
                action_type: ActionKind::Click,
                count: 2,
                percentage: 100.0,
            }],
            agent_distribution: vec![AgentStat {
                agent_type: AgentKind::Playwright,
                count: 2,
                percentage: 100.0,
                success_rate: 50.0,
            }],
            timeline_data: vec![TimelineBucket {
                bucket_start: 1704067200,
                success_count: 1,
                failure_count: 1,
                total_count: 2,
            }],
            recent_trend: 0.0,
            window_hours: 24,
            computed_at: 1704070800,
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"success_rate\":50.0"));
        assert!(json.contains("\"most_common_actions\""));

        let parsed: AnalyticsSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
