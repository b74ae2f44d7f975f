//! Sign In Use Case
//!
//! Authenticates a user and rotates in a fresh session.
//!
//! Failure handling is deliberately uniform: unknown email and wrong
//! password both register a limiter failure and surface the same
//! `InvalidCredentials` error, so responses do not leak which emails
//! exist.

use std::sync::Arc;

use chrono::Utc;
use platform::audit::{SecurityEvent, hash_identifier};
use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::application::{IssuedSession, issue_session};
use crate::domain::entity::user::User;
use crate::domain::repository::{LoginRateLimitRepository, SessionRepository, UserRepository};
use crate::domain::value_object::{email::Email, limiter_key::LimiterKey};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
    /// Client IP string ("unknown" when unresolvable)
    pub client_ip: String,
}

/// Sign in output
pub struct SignInOutput {
    /// Authenticated user
    pub user: User,
    /// Session token for cookie
    pub session_token: String,
    /// CSRF token for cookie
    pub csrf_token: String,
}

/// Sign in use case
pub struct SignInUseCase<U, S, L>
where
    U: UserRepository,
    S: SessionRepository,
    L: LoginRateLimitRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    limiter_repo: Arc<L>,
    config: Arc<AuthConfig>,
}

impl<U, S, L> SignInUseCase<U, S, L>
where
    U: UserRepository,
    S: SessionRepository,
    L: LoginRateLimitRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        session_repo: Arc<S>,
        limiter_repo: Arc<L>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            limiter_repo,
            config,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let key = LimiterKey::derive(&input.client_ip, &input.email);

        let decision = self.limiter_repo.check(&key, Utc::now()).await?;
        if decision.limited {
            SecurityEvent::new("login_rate_limited")
                .field("identity", hash_identifier(&input.email))
                .field("client", hash_identifier(&input.client_ip))
                .field("retry_after_secs", decision.retry_after_secs)
                .emit();
            return Err(AuthError::RateLimited {
                retry_after_secs: decision.retry_after_secs,
            });
        }

        // Malformed email cannot match any account; treat as a failed attempt
        let user = match Email::new(&input.email) {
            Ok(email) => self.user_repo.find_by_email(&email).await?,
            Err(_) => None,
        };

        let password_valid = match (&user, ClearTextPassword::new(input.password)) {
            (Some(user), Ok(password)) => user.password_hash.verify(&password),
            _ => false,
        };

        if !password_valid {
            return Err(self.on_failure(&key, &input.email, &input.client_ip).await?);
        }

        // password_valid guarantees Some
        let user = user.ok_or_else(|| AuthError::Internal("User vanished".to_string()))?;

        self.limiter_repo.clear(&key).await?;

        let IssuedSession {
            session_token,
            csrf_token,
        } = issue_session(self.session_repo.as_ref(), user.user_id, &self.config).await?;

        SecurityEvent::new("login_succeeded")
            .field("user", hash_identifier(user.email.as_str()))
            .field("client", hash_identifier(&input.client_ip))
            .emit();

        Ok(SignInOutput {
            user,
            session_token,
            csrf_token,
        })
    }

    /// Register the failure and pick the error to surface: 429 when this
    /// very attempt triggered the lockout, 401 otherwise.
    async fn on_failure(
        &self,
        key: &LimiterKey,
        email: &str,
        client_ip: &str,
    ) -> AuthResult<AuthError> {
        let decision = self
            .limiter_repo
            .register_failure(key, Utc::now(), &self.config.rate_limit)
            .await?;

        SecurityEvent::new("login_failed")
            .field("identity", hash_identifier(email))
            .field("client", hash_identifier(client_ip))
            .field("locked", decision.limited)
            .emit();

        if decision.limited {
            Ok(AuthError::RateLimited {
                retry_after_secs: decision.retry_after_secs,
            })
        } else {
            Ok(AuthError::InvalidCredentials)
        }
    }
}
