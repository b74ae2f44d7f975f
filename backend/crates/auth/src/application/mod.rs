//! Application Layer
//!
//! Use cases and application services.

use platform::crypto::{random_token, sha256_hex};

use crate::domain::entity::session::Session;
use crate::domain::repository::SessionRepository;
use crate::domain::value_object::user_id::UserId;
use crate::error::AuthResult;

pub mod config;
pub mod current_user;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;

// Re-exports
pub use config::AuthConfig;
pub use current_user::{CurrentUser, CurrentUserUseCase};
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};

/// Session token length in random bytes (43 base64url chars on the wire)
const SESSION_TOKEN_BYTES: usize = 32;

/// Freshly issued session credentials, destined for cookies
pub(crate) struct IssuedSession {
    pub session_token: String,
    pub csrf_token: String,
}

/// Issue a new session for a user, rotating out any previous one.
///
/// The raw token is returned for the cookie; only its SHA-256 digest
/// is persisted.
pub(crate) async fn issue_session<S>(
    session_repo: &S,
    user_id: UserId,
    config: &AuthConfig,
) -> AuthResult<IssuedSession>
where
    S: SessionRepository,
{
    let session_token = random_token(SESSION_TOKEN_BYTES);
    let token_hash = sha256_hex(session_token.as_bytes());

    let ttl = chrono::Duration::milliseconds(config.session_ttl_ms());
    let session = Session::new(user_id, token_hash, ttl);

    session_repo.insert_rotating(&session).await?;

    Ok(IssuedSession {
        session_token,
        csrf_token: platform::csrf::generate_token(),
    })
}
