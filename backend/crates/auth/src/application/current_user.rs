//! Current User Resolution
//!
//! Resolves a session token into the authenticated user, enforcing
//! absolute expiry and the optional idle timeout. Handlers and middleware
//! both go through this single path.

use std::sync::Arc;

use chrono::Utc;
use platform::crypto::sha256_hex;
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::repository::SessionRepository;
use crate::domain::value_object::user_id::UserId;
use crate::error::AuthResult;

/// Authenticated identity, inserted as a request extension by middleware
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub session_id: Uuid,
}

/// Current user use case
pub struct CurrentUserUseCase<S>
where
    S: SessionRepository + Send + Sync + 'static,
{
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> CurrentUserUseCase<S>
where
    S: SessionRepository + Send + Sync + 'static,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    /// Resolve a session token to its user.
    ///
    /// Returns `Ok(None)` for unknown, expired, or idle-expired tokens.
    /// An idle-expired session is deleted on sight; a live one gets its
    /// last-seen timestamp bumped in the background.
    pub async fn resolve(&self, session_token: &str) -> AuthResult<Option<CurrentUser>> {
        let token_hash = sha256_hex(session_token.as_bytes());
        let now = Utc::now();

        let Some((session, user)) = self
            .session_repo
            .find_session_user(&token_hash, now.timestamp_millis())
            .await?
        else {
            return Ok(None);
        };

        let idle_timeout = self
            .config
            .idle_timeout
            .and_then(|d| chrono::Duration::from_std(d).ok());

        if session.is_idle_expired(now, idle_timeout) {
            self.session_repo.delete_by_id(session.session_id).await?;
            tracing::debug!(session_id = %session.session_id, "Removed idle-expired session");
            return Ok(None);
        }

        // Best-effort activity bump; the request does not wait on it
        let repo = self.session_repo.clone();
        let session_id = session.session_id;
        tokio::spawn(async move {
            if let Err(e) = repo.touch_last_seen(session_id, now).await {
                tracing::warn!(error = %e, "Failed to update session activity");
            }
        });

        Ok(Some(CurrentUser {
            user_id: user.user_id,
            name: user.name,
            email: user.email.into_string(),
            session_id: session.session_id,
        }))
    }
}
