//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Duration, Utc};
use platform::rate_limit::{RateLimitConfig, RateLimitDecision};
use uuid::Uuid;

use crate::domain::entity::{session::Session, user::User};
use crate::domain::value_object::{email::Email, limiter_key::LimiterKey, user_id::UserId};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find user by normalized email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Check if email is already registered
    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Update the stored password hash
    async fn update_password(&self, user: &User) -> AuthResult<()>;
}

/// Session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Insert a new session, revoking all prior sessions for the user.
    ///
    /// Both operations run in a single transaction so the user never holds
    /// two valid sessions.
    async fn insert_rotating(&self, session: &Session) -> AuthResult<()>;

    /// Find a non-expired session and its owning user by token hash
    async fn find_session_user(
        &self,
        token_hash: &str,
        now_ms: i64,
    ) -> AuthResult<Option<(Session, User)>>;

    /// Advance a session's last-seen timestamp (never backward)
    async fn touch_last_seen(&self, session_id: Uuid, now: DateTime<Utc>) -> AuthResult<()>;

    /// Delete a session by token hash; returns rows deleted
    async fn delete_by_token_hash(&self, token_hash: &str) -> AuthResult<u64>;

    /// Delete a session by ID; returns rows deleted
    async fn delete_by_id(&self, session_id: Uuid) -> AuthResult<u64>;

    /// Delete all sessions past absolute expiry; returns rows deleted
    async fn cleanup_expired(&self, now_ms: i64) -> AuthResult<u64>;
}

/// Login rate limit repository trait
#[trait_variant::make(LoginRateLimitRepository: Send)]
pub trait LocalLoginRateLimitRepository {
    /// Check whether logins for this key are currently blocked
    async fn check(&self, key: &LimiterKey, now: DateTime<Utc>) -> AuthResult<RateLimitDecision>;

    /// Record a login failure; returns the post-failure decision
    /// (limited when this failure triggered a lockout)
    async fn register_failure(
        &self,
        key: &LimiterKey,
        now: DateTime<Utc>,
        config: &RateLimitConfig,
    ) -> AuthResult<RateLimitDecision>;

    /// Clear all failure state for a key (on successful login)
    async fn clear(&self, key: &LimiterKey) -> AuthResult<()>;

    /// Delete sweepable entries; returns rows deleted
    async fn cleanup(&self, now: DateTime<Utc>, retention: Duration) -> AuthResult<u64>;
}
