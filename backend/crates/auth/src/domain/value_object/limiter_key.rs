//! Limiter Key Value Object
//!
//! The login rate limiter tracks failures per (client IP, email) pair.
//! The raw pair is never stored; only its SHA-256 hex digest is, so the
//! rate limit table carries no PII.

use platform::crypto::sha256_hex;

/// Opaque key identifying a (client IP, email) pair in the rate limit table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LimiterKey(String);

impl LimiterKey {
    /// Derive the key from a client IP string and an email.
    ///
    /// The email is trimmed and lowercased before hashing so the same
    /// logical address maps to the same key regardless of input casing.
    pub fn derive(client_ip: &str, email: &str) -> Self {
        let normalized_email = email.trim().to_lowercase();
        let raw = format!("{}|{}", client_ip, normalized_email);
        Self(sha256_hex(raw.as_bytes()))
    }

    /// Reconstruct from a value already stored in the database
    pub fn from_stored(key: String) -> Self {
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_deterministic() {
        let a = LimiterKey::derive("192.0.2.1", "user@example.com");
        let b = LimiterKey::derive("192.0.2.1", "  User@Example.COM ");
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_inputs_distinct_keys() {
        let base = LimiterKey::derive("192.0.2.1", "user@example.com");
        assert_ne!(base, LimiterKey::derive("192.0.2.2", "user@example.com"));
        assert_ne!(base, LimiterKey::derive("192.0.2.1", "other@example.com"));
    }

    #[test]
    fn test_key_is_sha256_hex() {
        let key = LimiterKey::derive("192.0.2.1", "user@example.com");
        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
