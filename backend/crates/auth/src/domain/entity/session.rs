//! Session Entity
//!
//! Represents an authenticated user session. Only the SHA-256 hex digest
//! of the session token is stored; the raw token lives exclusively in the
//! client's cookie.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::value_object::user_id::UserId;

/// Session entity
#[derive(Debug, Clone)]
pub struct Session {
    /// Session ID (UUID v4)
    pub session_id: Uuid,
    /// Reference to User
    pub user_id: UserId,
    /// SHA-256 hex digest of the session token
    pub token_hash: String,
    /// Absolute expiration (Unix timestamp ms)
    pub expires_at_ms: i64,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last request timestamp (never moves backward)
    pub last_seen_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session
    ///
    /// TTL is provided by the application layer (config), not hard-coded here.
    pub fn new(user_id: UserId, token_hash: String, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            session_id: Uuid::new_v4(),
            user_id,
            token_hash,
            expires_at_ms: (now + ttl).timestamp_millis(),
            created_at: now,
            last_seen_at: now,
        }
    }

    /// Check if the session has reached its absolute expiry.
    ///
    /// Expiry at exactly `now` counts as expired, matching the storage
    /// queries (resolution keeps `expires_at_ms > now`, sweeps delete
    /// `expires_at_ms <= now`).
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms
    }

    /// Check if the session has been idle longer than the allowed timeout.
    ///
    /// Idle timeout is optional; `None` disables the check entirely.
    pub fn is_idle_expired(&self, now: DateTime<Utc>, idle_timeout: Option<Duration>) -> bool {
        match idle_timeout {
            Some(timeout) => now - self.last_seen_at > timeout,
            None => false,
        }
    }

    /// Advance the last-seen timestamp; never moves it backward.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_seen_at {
            self.last_seen_at = now;
        }
    }

    /// Get remaining time until absolute expiration
    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        (self.expires_at_ms - now_ms).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(ttl: Duration) -> Session {
        Session::new(UserId::new(), "a".repeat(64), ttl)
    }

    #[test]
    fn test_expiry_boundary() {
        let s = session(Duration::days(30));
        assert!(!s.is_expired(s.expires_at_ms - 1));
        // Expiry at exactly now: no longer resolvable, eligible for sweep
        assert!(s.is_expired(s.expires_at_ms));
    }

    #[test]
    fn test_idle_timeout_disabled_by_default() {
        let s = session(Duration::days(30));
        let far_future = s.last_seen_at + Duration::days(365);
        assert!(!s.is_idle_expired(far_future, None));
    }

    #[test]
    fn test_idle_timeout_applied() {
        let s = session(Duration::days(30));
        let timeout = Some(Duration::minutes(10));
        assert!(!s.is_idle_expired(s.last_seen_at + Duration::minutes(5), timeout));
        assert!(s.is_idle_expired(s.last_seen_at + Duration::minutes(11), timeout));
    }

    #[test]
    fn test_touch_never_moves_backward() {
        let mut s = session(Duration::days(30));
        let original = s.last_seen_at;
        s.touch(original - Duration::minutes(5));
        assert_eq!(s.last_seen_at, original);

        let later = original + Duration::minutes(5);
        s.touch(later);
        assert_eq!(s.last_seen_at, later);
    }
}
