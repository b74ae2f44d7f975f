//! Auth Middleware
//!
//! Middleware for protected routes: session resolution and CSRF
//! enforcement. The resolved [`CurrentUser`] is inserted as a request
//! extension so downstream handlers never re-resolve the session.

use axum::body::Body;
use axum::http::{Method, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{CurrentUser, CurrentUserUseCase};
use crate::domain::repository::SessionRepository;
use crate::error::AuthError;
use crate::presentation::handlers::verify_csrf;

/// Middleware state
#[derive(Clone)]
pub struct AuthMiddlewareState<R>
where
    R: SessionRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

/// Middleware that requires a valid auth session.
///
/// On success the [`CurrentUser`] is available via
/// `req.extensions().get::<CurrentUser>()`.
pub async fn require_auth_session<R>(
    state: AuthMiddlewareState<R>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    R: SessionRepository + Clone + Send + Sync + 'static,
{
    let token = platform::cookie::extract_cookie(req.headers(), &state.config.session_cookie_name);

    let use_case = CurrentUserUseCase::new(state.repo.clone(), state.config.clone());

    let current: Option<CurrentUser> = match token {
        Some(token) => use_case
            .resolve(&token)
            .await
            .map_err(|e| e.into_response())?,
        None => None,
    };

    let Some(current) = current else {
        return Err(AuthError::SessionInvalid.into_response());
    };

    req.extensions_mut().insert(current);

    Ok(next.run(req).await)
}

/// Middleware enforcing the double-submit CSRF check on mutating methods.
///
/// Safe methods (GET, HEAD, OPTIONS) pass through untouched.
pub async fn require_csrf<R>(
    state: AuthMiddlewareState<R>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    R: SessionRepository + Clone + Send + Sync + 'static,
{
    let mutating = !matches!(*req.method(), Method::GET | Method::HEAD | Method::OPTIONS);

    if mutating {
        verify_csrf(&state.config, req.headers()).map_err(|e| e.into_response())?;
    }

    Ok(next.run(req).await)
}
