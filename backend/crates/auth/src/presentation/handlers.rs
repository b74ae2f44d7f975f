//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{AppendHeaders, IntoResponse};
use std::sync::Arc;

use platform::client::client_ip_string;
use platform::cookie::extract_cookie;

use crate::application::config::AuthConfig;
use crate::application::{
    CurrentUserUseCase, SignInInput, SignInUseCase, SignOutUseCase, SignUpInput, SignUpUseCase,
};
use crate::domain::repository::{LoginRateLimitRepository, SessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{LoginRequest, LogoutResponse, SignUpRequest, UserEnvelope, UserResponse};

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: UserRepository + SessionRepository + LoginRateLimitRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /api/auth/signup
pub async fn sign_up<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<SignUpRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + SessionRepository + LoginRateLimitRepository + Clone + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    let input = SignUpInput {
        name: req.name,
        email: req.email,
        password: req.password,
    };

    let output = use_case.execute(input).await?;

    let session_cookie = state.config.session_cookie().build_set_cookie(&output.session_token);
    let csrf_cookie = state.config.csrf_cookie().build_set_cookie(&output.csrf_token);

    Ok((
        StatusCode::CREATED,
        AppendHeaders([
            (header::SET_COOKIE, session_cookie),
            (header::SET_COOKIE, csrf_cookie),
        ]),
        Json(UserEnvelope {
            user: Some(UserResponse::from_user(&output.user)),
        }),
    ))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
///
/// Not CSRF-guarded: the caller has no session yet, and the CSRF cookie
/// is (re)issued by this very endpoint.
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<std::net::SocketAddr>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + SessionRepository + LoginRateLimitRepository + Clone + Send + Sync + 'static,
{
    let client_ip = client_ip_string(&headers, Some(addr.ip()));

    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    let input = SignInInput {
        email: req.email,
        password: req.password,
        client_ip,
    };

    let output = use_case.execute(input).await?;

    let session_cookie = state.config.session_cookie().build_set_cookie(&output.session_token);
    let csrf_cookie = state.config.csrf_cookie().build_set_cookie(&output.csrf_token);

    Ok((
        StatusCode::OK,
        AppendHeaders([
            (header::SET_COOKIE, session_cookie),
            (header::SET_COOKIE, csrf_cookie),
        ]),
        Json(UserEnvelope {
            user: Some(UserResponse::from_user(&output.user)),
        }),
    ))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/auth/logout
///
/// CSRF-guarded when a session cookie is present. Idempotent: always
/// clears both cookies, even if the session was already dead.
pub async fn logout<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + SessionRepository + LoginRateLimitRepository + Clone + Send + Sync + 'static,
{
    let token = extract_cookie(&headers, &state.config.session_cookie_name);

    if let Some(token) = token {
        verify_csrf(&state.config, &headers)?;

        let use_case = SignOutUseCase::new(state.repo.clone());
        use_case.execute(&token).await?;
    }

    let clear_session = state.config.session_cookie().build_clear_cookie();
    let clear_csrf = state.config.csrf_cookie().build_clear_cookie();

    Ok((
        StatusCode::OK,
        AppendHeaders([
            (header::SET_COOKIE, clear_session),
            (header::SET_COOKIE, clear_csrf),
        ]),
        Json(LogoutResponse { logged_out: true }),
    ))
}

// ============================================================================
// Current User
// ============================================================================

/// GET /api/auth/me
///
/// Returns `{"user": null}` for anonymous callers instead of an error, so
/// frontends can poll it on load. Re-issues the CSRF cookie when an
/// authenticated caller lost it.
pub async fn me<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + SessionRepository + LoginRateLimitRepository + Clone + Send + Sync + 'static,
{
    let token = extract_cookie(&headers, &state.config.session_cookie_name);

    let use_case = CurrentUserUseCase::new(state.repo.clone(), state.config.clone());

    let current = match token {
        Some(token) => use_case.resolve(&token).await?,
        None => None,
    };

    let Some(current) = current else {
        return Ok((StatusCode::OK, Json(UserEnvelope { user: None })).into_response());
    };

    let body = Json(UserEnvelope {
        user: Some(UserResponse {
            id: current.user_id.to_string(),
            name: current.name,
            email: current.email,
        }),
    });

    // Replace a lost CSRF cookie so the next mutating request can pass
    if extract_cookie(&headers, &state.config.csrf_cookie_name).is_none() {
        let csrf_cookie = state
            .config
            .csrf_cookie()
            .build_set_cookie(&platform::csrf::generate_token());
        return Ok((StatusCode::OK, AppendHeaders([(header::SET_COOKIE, csrf_cookie)]), body).into_response());
    }

    Ok((StatusCode::OK, body).into_response())
}

// ============================================================================
// Helpers
// ============================================================================

/// Enforce the double-submit CSRF check for a mutating request
pub(crate) fn verify_csrf(config: &AuthConfig, headers: &HeaderMap) -> AuthResult<()> {
    let cookie_token = extract_cookie(headers, &config.csrf_cookie_name);
    let header_token = headers
        .get(config.csrf_header_name.as_str())
        .and_then(|v| v.to_str().ok());

    if platform::csrf::is_valid_pair(cookie_token.as_deref(), header_token) {
        Ok(())
    } else {
        Err(AuthError::CsrfRejected)
    }
}
