//! Application Configuration
//!
//! Configuration for the Auth application layer. Built once at startup
//! (from the environment) and shared via `Arc`; nothing re-reads env vars
//! per request.

use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::rate_limit::RateLimitConfig;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// CSRF cookie name
    pub csrf_cookie_name: String,
    /// Request header carrying the CSRF token
    pub csrf_header_name: String,
    /// Absolute session TTL (30 days)
    pub session_ttl: Duration,
    /// Optional idle timeout; `None` disables idle expiry
    pub idle_timeout: Option<Duration>,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Login rate limit policy
    pub rate_limit: RateLimitConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "subtracker_session".to_string(),
            csrf_cookie_name: "subtracker_csrf".to_string(),
            csrf_header_name: "X-CSRF-Token".to_string(),
            session_ttl: Duration::from_secs(30 * 24 * 3600), // 30 days
            idle_timeout: None,
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl AuthConfig {
    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Default::default()
        }
    }

    /// Build config from environment variables.
    ///
    /// Recognized variables (all optional):
    /// - `ENV` - "production" forces Secure cookies
    /// - `COOKIE_SECURE` - "true"/"false"
    /// - `COOKIE_SAMESITE` - "Strict"/"Lax"/"None"
    /// - `SESSION_DURATION_DAYS`
    /// - `IDLE_TIMEOUT_MINUTES` - 0 or unset disables idle expiry
    /// - `LOGIN_MAX_ATTEMPTS`
    /// - `LOGIN_WINDOW_MINUTES`
    /// - `LOGIN_LOCKOUT_MINUTES`
    /// - `RATE_LIMIT_RETENTION_HOURS`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        let production = std::env::var("ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        config.cookie_secure = match std::env::var("COOKIE_SECURE") {
            Ok(v) => v.eq_ignore_ascii_case("true"),
            Err(_) => production,
        };

        if production {
            // Tighter default session lifetime in production; the env
            // override below still wins when set
            config.session_ttl = Duration::from_secs(7 * 24 * 3600);
        }

        if let Ok(v) = std::env::var("COOKIE_SAMESITE") {
            if let Ok(same_site) = v.parse() {
                config.cookie_same_site = same_site;
            } else {
                tracing::warn!(value = %v, "Unrecognized COOKIE_SAMESITE, keeping Lax");
            }
        }

        if let Some(days) = env_u64("SESSION_DURATION_DAYS") {
            config.session_ttl = Duration::from_secs(days * 24 * 3600);
        }

        config.idle_timeout = match env_u64("IDLE_TIMEOUT_MINUTES") {
            Some(0) | None => None,
            Some(minutes) => Some(Duration::from_secs(minutes * 60)),
        };

        if let Some(attempts) = env_u64("LOGIN_MAX_ATTEMPTS") {
            config.rate_limit.max_attempts = attempts as u32;
        }
        if let Some(minutes) = env_u64("LOGIN_WINDOW_MINUTES") {
            config.rate_limit.window = Duration::from_secs(minutes * 60);
        }
        if let Some(minutes) = env_u64("LOGIN_LOCKOUT_MINUTES") {
            config.rate_limit.lockout = Duration::from_secs(minutes * 60);
        }
        if let Some(hours) = env_u64("RATE_LIMIT_RETENTION_HOURS") {
            config.rate_limit.retention = Duration::from_secs(hours * 3600);
        }

        config
    }

    /// Get session TTL in milliseconds
    pub fn session_ttl_ms(&self) -> i64 {
        self.session_ttl.as_millis() as i64
    }

    /// Cookie settings for the session cookie (HttpOnly)
    pub fn session_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.session_ttl.as_secs() as i64),
        }
    }

    /// Cookie settings for the CSRF cookie.
    ///
    /// Not HttpOnly: the frontend must read it to echo the value back in
    /// the CSRF header (double-submit pattern).
    pub fn csrf_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.csrf_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: false,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.session_ttl.as_secs() as i64),
        }
    }
}

fn env_u64(name: &str) -> Option<u64> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "Ignoring non-numeric env value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.session_cookie_name, "subtracker_session");
        assert_eq!(config.csrf_cookie_name, "subtracker_csrf");
        assert_eq!(config.session_ttl_ms(), 30 * 24 * 3600 * 1000);
        assert!(config.idle_timeout.is_none());
        assert!(config.cookie_secure);
    }

    #[test]
    fn test_development_insecure_cookie() {
        assert!(!AuthConfig::development().cookie_secure);
    }

    #[test]
    fn test_cookie_configs() {
        let config = AuthConfig::default();
        assert!(config.session_cookie().http_only);
        assert!(!config.csrf_cookie().http_only);
        assert_eq!(config.session_cookie().path, "/");
    }
}
