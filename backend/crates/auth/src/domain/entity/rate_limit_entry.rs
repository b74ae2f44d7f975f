//! Rate Limit Entry Entity
//!
//! State machine for one limiter key. The persistence layer reads the row
//! under `FOR UPDATE`, applies these transitions, and writes the result
//! back, so concurrent failures for the same key serialize correctly.

use chrono::{DateTime, Duration, Utc};
use platform::rate_limit::{RateLimitConfig, RateLimitDecision};

use crate::domain::value_object::limiter_key::LimiterKey;

/// Failure-tracking state for one (client IP, email) pair
#[derive(Debug, Clone)]
pub struct RateLimitEntry {
    /// SHA-256 limiter key
    pub limiter_key: LimiterKey,
    /// Failures observed in the current window
    pub failure_count: i32,
    /// Start of the current failure window
    pub first_failed_at: DateTime<Utc>,
    /// Most recent failure
    pub last_failed_at: DateTime<Utc>,
    /// Active lockout expiry, if any
    pub locked_until: Option<DateTime<Utc>>,
}

impl RateLimitEntry {
    /// Create an empty entry for a key with no recorded failures yet.
    ///
    /// The first call to [`register_failure`](Self::register_failure) takes
    /// it to count 1, so a threshold of 1 locks immediately.
    pub fn fresh(limiter_key: LimiterKey, now: DateTime<Utc>) -> Self {
        Self {
            limiter_key,
            failure_count: 0,
            first_failed_at: now,
            last_failed_at: now,
            locked_until: None,
        }
    }

    /// Check whether logins for this key are currently blocked
    pub fn check(&self, now: DateTime<Utc>) -> RateLimitDecision {
        match self.locked_until {
            Some(locked_until) if now < locked_until => {
                let remaining = (locked_until - now).num_seconds().max(0) as u64;
                RateLimitDecision::limited(remaining)
            }
            _ => RateLimitDecision::ALLOWED,
        }
    }

    /// Drop an elapsed lockout, resetting failures to zero.
    ///
    /// Serving a lockout wipes the slate: the next failure counts as the
    /// first of a new window, not as the threshold-plus-one-th. Returns
    /// whether state changed, so callers know to persist.
    pub fn expire_lockout(&mut self, now: DateTime<Utc>) -> bool {
        match self.locked_until {
            Some(locked_until) if locked_until <= now => {
                self.locked_until = None;
                self.failure_count = 0;
                true
            }
            _ => false,
        }
    }

    /// Record one more failure and return the resulting decision.
    ///
    /// An elapsed lockout is cleared first, so the new failure starts a
    /// fresh count. A failure outside the window restarts the count;
    /// reaching the threshold starts a lockout.
    pub fn register_failure(&mut self, now: DateTime<Utc>, config: &RateLimitConfig) -> RateLimitDecision {
        self.expire_lockout(now);

        let window = Duration::milliseconds(config.window_ms());

        if self.failure_count == 0 || now - self.first_failed_at > window {
            // No live count (fresh key or served lockout), or window elapsed
            self.failure_count = 1;
            self.first_failed_at = now;
        } else {
            self.failure_count += 1;
        }
        self.last_failed_at = now;

        if self.failure_count >= config.max_attempts as i32 {
            let locked_until = now + Duration::milliseconds(config.lockout_ms());
            self.locked_until = Some(locked_until);
            return RateLimitDecision::limited(config.lockout_secs());
        }

        RateLimitDecision::ALLOWED
    }

    /// Whether the cleanup sweep may delete this entry.
    ///
    /// Unlocked entries go once they pass the retention horizon; locked
    /// entries go only after the lockout elapses, no matter how old they
    /// are. An active lockout is never erased by cleanup.
    pub fn is_sweepable(&self, now: DateTime<Utc>, retention: Duration) -> bool {
        match self.locked_until {
            Some(locked_until) => locked_until < now,
            None => now - self.last_failed_at > retention,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> LimiterKey {
        LimiterKey::derive("192.0.2.1", "user@example.com")
    }

    #[test]
    fn test_lockout_after_max_attempts() {
        let config = RateLimitConfig::default();
        let now = Utc::now();
        let mut entry = RateLimitEntry::fresh(key(), now);

        for i in 1..5 {
            let decision = entry.register_failure(now, &config);
            assert!(!decision.limited, "attempt {} should not lock", i);
        }

        let decision = entry.register_failure(now, &config);
        assert!(decision.limited);
        assert_eq!(decision.retry_after_secs, 15 * 60);
        assert!(entry.check(now).limited);
    }

    #[test]
    fn test_window_elapse_resets_count() {
        let config = RateLimitConfig::default();
        let now = Utc::now();
        let mut entry = RateLimitEntry::fresh(key(), now);
        entry.failure_count = 4;

        let later = now + Duration::minutes(11);
        let decision = entry.register_failure(later, &config);
        assert!(!decision.limited);
        assert_eq!(entry.failure_count, 1);
        assert_eq!(entry.first_failed_at, later);
    }

    #[test]
    fn test_check_unlocks_after_lockout() {
        let config = RateLimitConfig::default();
        let now = Utc::now();
        let mut entry = RateLimitEntry::fresh(key(), now);
        entry.failure_count = 4;
        entry.register_failure(now, &config);

        assert!(entry.check(now + Duration::minutes(14)).limited);
        assert!(!entry.check(now + Duration::minutes(16)).limited);
    }

    #[test]
    fn test_retry_after_counts_down() {
        let config = RateLimitConfig::default();
        let now = Utc::now();
        let mut entry = RateLimitEntry::fresh(key(), now);
        entry.failure_count = 4;
        entry.register_failure(now, &config);

        let decision = entry.check(now + Duration::minutes(10));
        assert!(decision.limited);
        assert_eq!(decision.retry_after_secs, 5 * 60);
    }

    #[test]
    fn test_elapsed_lockout_resets_failure_count() {
        // Long window with a short lockout: the first failure after the
        // lockout elapses must count as 1, not threshold + 1.
        let config = RateLimitConfig {
            window: std::time::Duration::from_secs(60 * 60),
            lockout: std::time::Duration::from_secs(5 * 60),
            ..RateLimitConfig::default()
        };
        let now = Utc::now();
        let mut entry = RateLimitEntry::fresh(key(), now);

        for _ in 0..5 {
            entry.register_failure(now, &config);
        }
        assert!(entry.check(now).limited);

        let after_lockout = now + Duration::minutes(6);
        assert!(!entry.check(after_lockout).limited);

        let decision = entry.register_failure(after_lockout, &config);
        assert!(!decision.limited);
        assert_eq!(entry.failure_count, 1);
        assert_eq!(entry.first_failed_at, after_lockout);
        assert!(entry.locked_until.is_none());
    }

    #[test]
    fn test_expire_lockout_transition() {
        let config = RateLimitConfig::default();
        let now = Utc::now();
        let mut entry = RateLimitEntry::fresh(key(), now);
        entry.failure_count = 4;
        entry.register_failure(now, &config);

        // Still locked: no change
        assert!(!entry.expire_lockout(now + Duration::minutes(14)));
        assert_eq!(entry.failure_count, 5);

        // Elapsed: state resets and the caller is told to persist
        assert!(entry.expire_lockout(now + Duration::minutes(16)));
        assert_eq!(entry.failure_count, 0);
        assert!(entry.locked_until.is_none());
        assert!(!entry.expire_lockout(now + Duration::minutes(16)));
    }

    #[test]
    fn test_sweepable() {
        let config = RateLimitConfig::default();
        let retention = Duration::hours(24);
        let now = Utc::now();

        // Fresh failure is retained
        let entry = RateLimitEntry::fresh(key(), now);
        assert!(!entry.is_sweepable(now + Duration::hours(1), retention));

        // Stale beyond retention goes
        assert!(entry.is_sweepable(now + Duration::days(4), retention));

        // Expired lock goes, active lock stays
        let mut locked = RateLimitEntry::fresh(key(), now);
        locked.failure_count = 4;
        locked.register_failure(now, &config);
        assert!(!locked.is_sweepable(now + Duration::minutes(10), retention));
        assert!(locked.is_sweepable(now + Duration::minutes(16), retention));
    }

    #[test]
    fn test_active_lockout_survives_short_retention() {
        // Retention shorter than the lockout must not erase a live lock.
        let config = RateLimitConfig {
            lockout: std::time::Duration::from_secs(3 * 3600),
            ..RateLimitConfig::default()
        };
        let retention = Duration::hours(1);
        let now = Utc::now();

        let mut entry = RateLimitEntry::fresh(key(), now);
        entry.failure_count = 4;
        entry.register_failure(now, &config);

        let later = now + Duration::hours(2);
        assert!(entry.check(later).limited);
        assert!(!entry.is_sweepable(later, retention));
        assert!(entry.is_sweepable(now + Duration::hours(4), retention));
    }
}
