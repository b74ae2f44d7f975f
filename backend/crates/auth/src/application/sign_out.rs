//! Sign Out Use Case
//!
//! Revokes the session behind a token. Idempotent: signing out with an
//! already-dead token still succeeds.

use std::sync::Arc;

use platform::audit::SecurityEvent;
use platform::crypto::sha256_hex;

use crate::domain::repository::SessionRepository;
use crate::error::AuthResult;

/// Sign out use case
pub struct SignOutUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
}

impl<S> SignOutUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>) -> Self {
        Self { session_repo }
    }

    pub async fn execute(&self, session_token: &str) -> AuthResult<()> {
        let token_hash = sha256_hex(session_token.as_bytes());

        let deleted = self.session_repo.delete_by_token_hash(&token_hash).await?;

        SecurityEvent::new("logout")
            .field("session_revoked", deleted > 0)
            .emit();

        Ok(())
    }
}
