//! Sign Up Use Case
//!
//! Registers a new user and signs them in immediately.

use std::sync::Arc;

use platform::audit::{SecurityEvent, hash_identifier};
use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::application::{IssuedSession, issue_session};
use crate::domain::entity::user::User;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Minimum display name length (after trim)
const NAME_MIN_LENGTH: usize = 2;

/// Maximum display name length
const NAME_MAX_LENGTH: usize = 100;

/// Sign up input
pub struct SignUpInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Sign up output
pub struct SignUpOutput {
    /// Created user
    pub user: User,
    /// Session token for cookie
    pub session_token: String,
    /// CSRF token for cookie
    pub csrf_token: String,
}

/// Sign up use case
pub struct SignUpUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, S> SignUpUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            session_repo,
            config,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        let name = input.name.trim().to_string();
        if name.chars().count() < NAME_MIN_LENGTH {
            return Err(AuthError::Validation(format!(
                "Name must be at least {} characters",
                NAME_MIN_LENGTH
            )));
        }
        if name.chars().count() > NAME_MAX_LENGTH {
            return Err(AuthError::Validation(format!(
                "Name must be at most {} characters",
                NAME_MAX_LENGTH
            )));
        }

        let email = Email::new(&input.email).map_err(|e| AuthError::Validation(e.to_string()))?;

        let password = ClearTextPassword::new(input.password)?;

        if self.user_repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let user = User::new(name, email, password.hash());

        // Two signups can race past exists_by_email; the unique index on
        // email settles it, and that loser also gets a 409
        if let Err(e) = self.user_repo.create(&user).await {
            return Err(match &e {
                AuthError::Database(sqlx::Error::Database(db))
                    if db.code().as_deref() == Some("23505") =>
                {
                    AuthError::EmailTaken
                }
                _ => e,
            });
        }

        let IssuedSession {
            session_token,
            csrf_token,
        } = issue_session(self.session_repo.as_ref(), user.user_id, &self.config).await?;

        SecurityEvent::new("user_signed_up")
            .field("user", hash_identifier(user.email.as_str()))
            .emit();

        Ok(SignUpOutput {
            user,
            session_token,
            csrf_token,
        })
    }
}
