//! Rate Limiting Policy Types
//!
//! Configuration and decision types for the persisted login rate limiter.
//! The storage-backed state machine lives with the auth domain; these types
//! only describe the policy.

use std::time::Duration;

/// Login rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Failures within the window before lockout
    pub max_attempts: u32,
    /// Rolling window over which failures accumulate
    pub window: Duration,
    /// Lockout duration once the threshold is reached
    pub lockout: Duration,
    /// Retention horizon for stale entries (cleanup)
    pub retention: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window: Duration::from_secs(10 * 60),
            lockout: Duration::from_secs(15 * 60),
            retention: Duration::from_secs(24 * 3600),
        }
    }
}

impl RateLimitConfig {
    pub fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }

    pub fn lockout_ms(&self) -> i64 {
        self.lockout.as_millis() as i64
    }

    pub fn lockout_secs(&self) -> u64 {
        self.lockout.as_secs()
    }

    pub fn retention_ms(&self) -> i64 {
        self.retention.as_millis() as i64
    }
}

/// Rate limit check result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub limited: bool,
    /// Seconds the caller should wait before retrying (0 when not limited)
    pub retry_after_secs: u64,
}

impl RateLimitDecision {
    pub const ALLOWED: Self = Self {
        limited: false,
        retry_after_secs: 0,
    };

    /// Limited decision; retry-after is floored at one second so a
    /// `Retry-After: 0` header is never emitted for an active lockout.
    pub fn limited(retry_after_secs: u64) -> Self {
        Self {
            limited: true,
            retry_after_secs: retry_after_secs.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RateLimitConfig::default();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.window_ms(), 10 * 60 * 1000);
        assert_eq!(config.lockout_secs(), 15 * 60);
        assert_eq!(config.retention_ms(), 24 * 3600 * 1000);
    }

    #[test]
    fn test_limited_floors_retry_after() {
        assert_eq!(RateLimitDecision::limited(0).retry_after_secs, 1);
        assert_eq!(RateLimitDecision::limited(90).retry_after_secs, 90);
        assert!(!RateLimitDecision::ALLOWED.limited);
    }
}
