//! CSRF Double-Submit Token Validation
//!
//! The anti-forgery token travels twice: once in a script-readable cookie
//! and once echoed back in a request header. A cross-origin attacker can
//! trigger the cookie but cannot read it to populate the header.

use crate::crypto::{constant_time_eq, random_token};

/// Entropy of a CSRF token in bytes
const CSRF_TOKEN_BYTES: usize = 24;

/// Generate a new CSRF token (URL-safe base64, 24 bytes of entropy)
pub fn generate_token() -> String {
    random_token(CSRF_TOKEN_BYTES)
}

/// Validate a double-submit pair
///
/// Both values must be present, non-empty, and equal under constant-time
/// comparison. A missing cookie or header is always invalid (fails closed).
pub fn is_valid_pair(cookie_token: Option<&str>, header_token: Option<&str>) -> bool {
    match (cookie_token, header_token) {
        (Some(cookie), Some(header)) if !cookie.is_empty() && !header.is_empty() => {
            constant_time_eq(cookie.as_bytes(), header.as_bytes())
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_pair() {
        assert!(is_valid_pair(Some("token123"), Some("token123")));
    }

    #[test]
    fn test_mismatch_invalid() {
        assert!(!is_valid_pair(Some("a"), Some("b")));
    }

    #[test]
    fn test_missing_or_empty_invalid() {
        assert!(!is_valid_pair(None, Some("x")));
        assert!(!is_valid_pair(Some("x"), None));
        assert!(!is_valid_pair(None, None));
        assert!(!is_valid_pair(Some(""), Some("x")));
        assert!(!is_valid_pair(Some("x"), Some("")));
        assert!(!is_valid_pair(Some(""), Some("")));
    }

    #[test]
    fn test_generated_tokens_pair_with_themselves() {
        let token = generate_token();
        assert!(is_valid_pair(Some(&token), Some(&token)));
        assert!(!is_valid_pair(Some(&token), Some(&generate_token())));
    }
}
