//! Time and timestamp utilities

use chrono::{TimeZone, Utc};

/// Seconds per timeline bucket (1 hour)
pub const HOUR_SECS: i64 = 3600;

/// Get current Unix timestamp in seconds
pub fn current_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// Align a timestamp down to the top of its hour
pub fn hour_floor(timestamp: i64) -> i64 {
    timestamp - timestamp.rem_euclid(HOUR_SECS)
}

/// Format a timestamp for embedding in an export filename
///
/// Produces `YYYYMMDD-HHMMSS` in UTC; a timestamp chrono cannot represent
/// falls back to the raw seconds value.
pub fn format_export_timestamp(timestamp: i64) -> String {
    match Utc.timestamp_opt(timestamp, 0).single() {
        Some(dt) => dt.format("%Y%m%d-%H%M%S").to_string(),
        None => timestamp.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hour_floor() {
        // 2024-01-01 00:30:00 UTC -> 00:00:00
        assert_eq!(hour_floor(1704069000), 1704067200);
        // Already aligned
        assert_eq!(hour_floor(1704067200), 1704067200);
        // Negative timestamps still floor toward the earlier hour
        assert_eq!(hour_floor(-1), -3600);
    }

    #[test]
    fn test_format_export_timestamp() {
        assert_eq!(format_export_timestamp(1704069000), "20240101-003000");
    }

    #[test]
    fn test_current_timestamp_is_recent() {
        // Sanity bound: after 2024-01-01
        assert!(current_timestamp() > 1704067200);
    }
}
