//! PostgreSQL Repository Implementations

use chrono::{DateTime, Duration, Utc};
use platform::rate_limit::{RateLimitConfig, RateLimitDecision};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    rate_limit_entry::RateLimitEntry, session::Session, user::User,
};
use crate::domain::repository::{LoginRateLimitRepository, SessionRepository, UserRepository};
use crate::domain::value_object::{email::Email, limiter_key::LimiterKey, user_id::UserId};
use crate::error::AuthResult;
use platform::password::HashedPassword;

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                name,
                email,
                password_hash,
                created_at
            ) VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(&user.name)
        .bind(user.email.as_str())
        .bind(user.password_hash.as_encoded())
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_id, name, email, password_hash, created_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_id, name, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)",
        )
        .bind(email.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn update_password(&self, user: &User) -> AuthResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE user_id = $1")
            .bind(user.user_id.as_uuid())
            .bind(user.password_hash.as_encoded())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn insert_rotating(&self, session: &Session) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        // Single-active-session policy: everything older goes first
        sqlx::query("DELETE FROM auth_sessions WHERE user_id = $1")
            .bind(session.user_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        // Opportunistic sweep of absolutely-expired rows, no timer needed
        sqlx::query("DELETE FROM auth_sessions WHERE expires_at_ms <= $1")
            .bind(Utc::now().timestamp_millis())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO auth_sessions (
                session_id,
                user_id,
                token_hash,
                expires_at_ms,
                created_at,
                last_seen_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(session.session_id)
        .bind(session.user_id.as_uuid())
        .bind(&session.token_hash)
        .bind(session.expires_at_ms)
        .bind(session.created_at)
        .bind(session.last_seen_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn find_session_user(
        &self,
        token_hash: &str,
        now_ms: i64,
    ) -> AuthResult<Option<(Session, User)>> {
        let row = sqlx::query_as::<_, SessionUserRow>(
            r#"
            SELECT
                s.session_id,
                s.user_id,
                s.token_hash,
                s.expires_at_ms,
                s.created_at AS session_created_at,
                s.last_seen_at,
                u.name,
                u.email,
                u.password_hash,
                u.created_at AS user_created_at
            FROM auth_sessions s
            JOIN users u ON u.user_id = s.user_id
            WHERE s.token_hash = $1 AND s.expires_at_ms > $2
            "#,
        )
        .bind(token_hash)
        .bind(now_ms)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionUserRow::into_pair))
    }

    async fn touch_last_seen(&self, session_id: Uuid, now: DateTime<Utc>) -> AuthResult<()> {
        // GREATEST keeps last_seen_at monotonic under request races
        sqlx::query(
            "UPDATE auth_sessions SET last_seen_at = GREATEST(last_seen_at, $2) WHERE session_id = $1",
        )
        .bind(session_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_by_token_hash(&self, token_hash: &str) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM auth_sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn delete_by_id(&self, session_id: Uuid) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM auth_sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn cleanup_expired(&self, now_ms: i64) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM auth_sessions WHERE expires_at_ms < $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired auth sessions");

        Ok(deleted)
    }
}

// ============================================================================
// Login Rate Limit Repository Implementation
// ============================================================================

impl LoginRateLimitRepository for PgAuthRepository {
    async fn check(&self, key: &LimiterKey, now: DateTime<Utc>) -> AuthResult<RateLimitDecision> {
        let mut tx = self.pool.begin().await?;

        // Read-modify-write: an elapsed lockout resets the stored count
        // to zero so the next failure starts a fresh window.
        let row = sqlx::query_as::<_, RateLimitRow>(
            r#"
            SELECT limiter_key, failure_count, first_failed_at, last_failed_at, locked_until
            FROM login_rate_limits
            WHERE limiter_key = $1
            FOR UPDATE
            "#,
        )
        .bind(key.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let decision = match row {
            Some(row) => {
                let mut entry = row.into_entry();
                if entry.expire_lockout(now) {
                    sqlx::query(
                        r#"
                        UPDATE login_rate_limits
                        SET failure_count = 0, locked_until = NULL
                        WHERE limiter_key = $1
                        "#,
                    )
                    .bind(entry.limiter_key.as_str())
                    .execute(&mut *tx)
                    .await?;
                }
                entry.check(now)
            }
            None => RateLimitDecision::ALLOWED,
        };

        tx.commit().await?;

        Ok(decision)
    }

    async fn register_failure(
        &self,
        key: &LimiterKey,
        now: DateTime<Utc>,
        config: &RateLimitConfig,
    ) -> AuthResult<RateLimitDecision> {
        let mut tx = self.pool.begin().await?;

        // Serialize concurrent failures for the same key
        let row = sqlx::query_as::<_, RateLimitRow>(
            r#"
            SELECT limiter_key, failure_count, first_failed_at, last_failed_at, locked_until
            FROM login_rate_limits
            WHERE limiter_key = $1
            FOR UPDATE
            "#,
        )
        .bind(key.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let mut entry = match row {
            Some(row) => row.into_entry(),
            None => RateLimitEntry::fresh(key.clone(), now),
        };
        let decision = entry.register_failure(now, config);

        sqlx::query(
            r#"
            INSERT INTO login_rate_limits (
                limiter_key,
                failure_count,
                first_failed_at,
                last_failed_at,
                locked_until
            ) VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (limiter_key) DO UPDATE SET
                failure_count = EXCLUDED.failure_count,
                first_failed_at = EXCLUDED.first_failed_at,
                last_failed_at = EXCLUDED.last_failed_at,
                locked_until = EXCLUDED.locked_until
            "#,
        )
        .bind(entry.limiter_key.as_str())
        .bind(entry.failure_count)
        .bind(entry.first_failed_at)
        .bind(entry.last_failed_at)
        .bind(entry.locked_until)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(decision)
    }

    async fn clear(&self, key: &LimiterKey) -> AuthResult<()> {
        sqlx::query("DELETE FROM login_rate_limits WHERE limiter_key = $1")
            .bind(key.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn cleanup(&self, now: DateTime<Utc>, retention: Duration) -> AuthResult<u64> {
        let stale_before = now - retention;

        // Mirrors RateLimitEntry::is_sweepable; an active lockout is
        // never erased, however old the entry.
        let deleted = sqlx::query(
            r#"
            DELETE FROM login_rate_limits
            WHERE (locked_until IS NULL AND last_failed_at < $1)
               OR locked_until < $2
            "#,
        )
        .bind(stale_before)
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        tracing::info!(entries_deleted = deleted, "Cleaned up stale rate limit entries");

        Ok(deleted)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            user_id: UserId::from_uuid(self.user_id),
            name: self.name,
            email: Email::from_stored(self.email),
            password_hash: HashedPassword::from_encoded(self.password_hash),
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SessionUserRow {
    session_id: Uuid,
    user_id: Uuid,
    token_hash: String,
    expires_at_ms: i64,
    session_created_at: DateTime<Utc>,
    last_seen_at: DateTime<Utc>,
    name: String,
    email: String,
    password_hash: String,
    user_created_at: DateTime<Utc>,
}

impl SessionUserRow {
    fn into_pair(self) -> (Session, User) {
        let user_id = UserId::from_uuid(self.user_id);

        let session = Session {
            session_id: self.session_id,
            user_id,
            token_hash: self.token_hash,
            expires_at_ms: self.expires_at_ms,
            created_at: self.session_created_at,
            last_seen_at: self.last_seen_at,
        };

        let user = User {
            user_id,
            name: self.name,
            email: Email::from_stored(self.email),
            password_hash: HashedPassword::from_encoded(self.password_hash),
            created_at: self.user_created_at,
        };

        (session, user)
    }
}

#[derive(sqlx::FromRow)]
struct RateLimitRow {
    limiter_key: String,
    failure_count: i32,
    first_failed_at: DateTime<Utc>,
    last_failed_at: DateTime<Utc>,
    locked_until: Option<DateTime<Utc>>,
}

impl RateLimitRow {
    fn into_entry(self) -> RateLimitEntry {
        RateLimitEntry {
            limiter_key: LimiterKey::from_stored(self.limiter_key),
            failure_count: self.failure_count,
            first_failed_at: self.first_failed_at,
            last_failed_at: self.last_failed_at,
            locked_until: self.locked_until,
        }
    }
}
