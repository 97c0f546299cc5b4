//! Reconnect backoff policy
//!
//! Transport drops are expected in a dashboard that stays open all day, so
//! the channel retries with bounded attempts and growing, jittered delays.

use std::time::Duration;

use rand::Rng;

/// Backoff configuration for reconnect attempts
///
/// Attempts are 1-based. The delay before attempt `n` is
/// `initial_interval * backoff_coefficient^(n-1)`, capped at `max_interval`,
/// with up to `jitter` fractional randomness on top.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    /// Maximum reconnect attempts after a drop
    pub max_attempts: u32,
    /// Delay before the first reconnect attempt
    pub initial_interval: Duration,
    /// Cap on the delay between attempts
    pub max_interval: Duration,
    /// Growth factor between attempts (1.0 = fixed delay)
    pub backoff_coefficient: f64,
    /// Fractional randomness (0.0-1.0) added to each delay
    pub jitter: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::exponential()
    }
}

impl ReconnectPolicy {
    /// Exponential backoff with sensible defaults
    ///
    /// 5 attempts, 1 s initial delay doubling up to 30 s, 10% jitter.
    pub fn exponential() -> Self {
        Self {
            max_attempts: 5,
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(30),
            backoff_coefficient: 2.0,
            jitter: 0.1,
        }
    }

    /// Fixed-delay policy
    pub fn fixed(interval: Duration, max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_interval: interval,
            max_interval: interval,
            backoff_coefficient: 1.0,
            jitter: 0.0,
        }
    }

    /// Set the maximum number of attempts
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the initial delay
    pub fn with_initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = interval;
        self
    }

    /// Set the delay cap
    pub fn with_max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = interval;
        self
    }

    /// Set the jitter fraction (clamped to 0.0-1.0)
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Whether attempt `attempt` (1-based) is still allowed
    pub fn allows_attempt(&self, attempt: u32) -> bool {
        attempt <= self.max_attempts
    }

    /// Delay to wait before reconnect attempt `attempt` (1-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let base = self.initial_interval.as_secs_f64() * self.backoff_coefficient.powi(exponent);
        let capped = base.min(self.max_interval.as_secs_f64());

        let jittered = if self.jitter > 0.0 {
            let spread = capped * self.jitter;
            let offset = rand::thread_rng().gen_range(-spread..=spread);
            (capped + offset).max(0.0)
        } else {
            capped
        };

        Duration::from_secs_f64(jittered)
    }
}
