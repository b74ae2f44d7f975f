//! Password Hashing and Verification
//!
//! Credential storage with:
//! - PBKDF2-HMAC-SHA256 key derivation (deliberately expensive per call)
//! - `salt_hex:digest_hex` storage encoding
//! - Zeroization of sensitive data
//! - Constant-time comparison
//!
//! ## Security Features
//! - 200,000 iterations throttle offline and online guessing alike
//! - Zeroization prevents memory inspection attacks
//! - Malformed stored encodings fail closed (verify returns false)

use std::fmt;

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{constant_time_eq, random_bytes};

// ============================================================================
// Constants
// ============================================================================

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// PBKDF2-HMAC-SHA256 iteration count
pub const PBKDF2_ITERATIONS: u32 = 200_000;

/// Salt length in bytes
const SALT_LENGTH: usize = 16;

/// Derived key length in bytes (SHA-256 output size)
const DIGEST_LENGTH: usize = 32;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    /// Password is too short
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    /// Password is too long
    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    /// Password contains only whitespace
    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    /// Password contains invalid characters (control characters)
    #[error("Password contains invalid control characters")]
    InvalidCharacter,
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// This type ensures that password data is securely erased from memory
/// when the value is dropped, preventing memory inspection attacks.
///
/// ## Security
/// - Implements `Zeroize` and `ZeroizeOnDrop`
/// - Does not implement `Clone` to prevent accidental copies
/// - Debug output is redacted
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Create a new clear text password with validation
    ///
    /// Validates minimum/maximum length (Unicode code points, not bytes)
    /// and rejects control characters. Unicode is normalized using NFKC
    /// before validation so visually-identical inputs derive the same key.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let normalized: String = raw.nfkc().collect();

        let trimmed = normalized.trim();
        if trimmed.is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        let char_count = normalized.chars().count();

        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        // Control characters (except space, tab, newline) are rejected
        for ch in normalized.chars() {
            if ch.is_control() && ch != ' ' && ch != '\t' && ch != '\n' {
                return Err(PasswordPolicyError::InvalidCharacter);
            }
        }

        Ok(Self(normalized))
    }

    /// Create without validation (for testing or trusted input)
    #[cfg(test)]
    pub fn new_unchecked(raw: String) -> Self {
        Self(raw)
    }

    /// Get the password as bytes for key derivation
    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Hash the password with PBKDF2-HMAC-SHA256
    ///
    /// Generates a random 16-byte salt, derives a 32-byte key over the
    /// UTF-8 password bytes with [`PBKDF2_ITERATIONS`] iterations, and
    /// encodes the result as `salt_hex:digest_hex`.
    pub fn hash(&self) -> HashedPassword {
        let salt = random_bytes(SALT_LENGTH);
        let digest = derive_key(self.as_bytes(), &salt);

        HashedPassword {
            encoded: format!("{}:{}", hex::encode(&salt), hex::encode(digest)),
        }
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Hashed password in `salt_hex:digest_hex` encoding
///
/// Carries no key material beyond the salted, iterated digest; safe to
/// persist in the users table.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    encoded: String,
}

impl HashedPassword {
    /// Create from a stored encoding (e.g., from the database)
    ///
    /// Deliberately permissive: a corrupted stored value only manifests as
    /// verification failure, never as an error surfacing to the caller.
    pub fn from_encoded(s: impl Into<String>) -> Self {
        Self { encoded: s.into() }
    }

    /// Get the encoded string for storage
    pub fn as_encoded(&self) -> &str {
        &self.encoded
    }

    /// Verify a password against this hash
    ///
    /// Re-derives with the stored salt and compares digests in constant
    /// time. Malformed encodings (missing delimiter, bad hex, wrong digest
    /// length) fail closed and return `false`.
    pub fn verify(&self, password: &ClearTextPassword) -> bool {
        let Some((salt_hex, digest_hex)) = self.encoded.split_once(':') else {
            return false;
        };

        let Ok(salt) = hex::decode(salt_hex) else {
            return false;
        };
        let Ok(expected) = hex::decode(digest_hex) else {
            return false;
        };
        if expected.len() != DIGEST_LENGTH {
            return false;
        }

        let candidate = derive_key(password.as_bytes(), &salt);
        constant_time_eq(&candidate, &expected)
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("encoded", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Derive a 32-byte key with PBKDF2-HMAC-SHA256
fn derive_key(password: &[u8], salt: &[u8]) -> [u8; DIGEST_LENGTH] {
    let mut digest = [0u8; DIGEST_LENGTH];
    pbkdf2_hmac::<Sha256>(password, salt, PBKDF2_ITERATIONS, &mut digest);
    digest
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_too_short() {
        let result = ClearTextPassword::new("short".to_string());
        assert!(matches!(result, Err(PasswordPolicyError::TooShort { .. })));
    }

    #[test]
    fn test_password_too_long() {
        let long_password = "a".repeat(MAX_PASSWORD_LENGTH + 1);
        let result = ClearTextPassword::new(long_password);
        assert!(matches!(result, Err(PasswordPolicyError::TooLong { .. })));
    }

    #[test]
    fn test_password_empty() {
        let result = ClearTextPassword::new("".to_string());
        assert!(matches!(
            result,
            Err(PasswordPolicyError::EmptyOrWhitespace)
        ));
    }

    #[test]
    fn test_password_whitespace_only() {
        let result = ClearTextPassword::new("        ".to_string());
        assert!(matches!(
            result,
            Err(PasswordPolicyError::EmptyOrWhitespace)
        ));
    }

    #[test]
    fn test_password_control_characters() {
        let result = ClearTextPassword::new("pass\u{0000}word".to_string());
        assert!(matches!(result, Err(PasswordPolicyError::InvalidCharacter)));
    }

    #[test]
    fn test_valid_password() {
        assert!(ClearTextPassword::new("correct horse battery".to_string()).is_ok());
    }

    #[test]
    fn test_unicode_password() {
        assert!(ClearTextPassword::new("パスワード安全です!".to_string()).is_ok());
    }

    #[test]
    fn test_hash_and_verify() {
        let password = ClearTextPassword::new_unchecked("TestPassword123!".to_string());
        let hashed = password.hash();

        // Correct password should verify
        assert!(hashed.verify(&password));

        // Wrong password should not verify
        let wrong_password = ClearTextPassword::new_unchecked("WrongPassword123!".to_string());
        assert!(!hashed.verify(&wrong_password));
    }

    #[test]
    fn test_hash_distinct_salts() {
        let password = ClearTextPassword::new_unchecked("TestPassword123!".to_string());
        let h1 = password.hash();
        let h2 = password.hash();
        // Random salt makes hashing non-deterministic across calls
        assert_ne!(h1.as_encoded(), h2.as_encoded());
        assert!(h1.verify(&password));
        assert!(h2.verify(&password));
    }

    #[test]
    fn test_encoding_shape() {
        let password = ClearTextPassword::new_unchecked("TestPassword123!".to_string());
        let hashed = password.hash();
        let (salt_hex, digest_hex) = hashed.as_encoded().split_once(':').unwrap();
        assert_eq!(salt_hex.len(), SALT_LENGTH * 2);
        assert_eq!(digest_hex.len(), DIGEST_LENGTH * 2);
    }

    #[test]
    fn test_encoded_roundtrip() {
        let password = ClearTextPassword::new_unchecked("TestPassword123!".to_string());
        let hashed = password.hash();

        let stored = hashed.as_encoded().to_string();
        let restored = HashedPassword::from_encoded(stored);

        assert!(restored.verify(&password));
    }

    #[test]
    fn test_malformed_encoding_fails_closed() {
        let password = ClearTextPassword::new_unchecked("TestPassword123!".to_string());

        // Missing delimiter
        assert!(!HashedPassword::from_encoded("deadbeef").verify(&password));
        // Bad hex
        assert!(!HashedPassword::from_encoded("zz:zz").verify(&password));
        // Digest of wrong length
        assert!(!HashedPassword::from_encoded("00ff:00ff").verify(&password));
        // Empty
        assert!(!HashedPassword::from_encoded("").verify(&password));
    }

    #[test]
    fn test_debug_redaction() {
        let password = ClearTextPassword::new_unchecked("secret".to_string());
        let debug_output = format!("{:?}", password);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("secret"));

        let hashed = password.hash();
        let hashed_debug = format!("{:?}", hashed);
        assert!(hashed_debug.contains("[HASH]"));
        assert!(!hashed_debug.contains(hashed.as_encoded()));
    }
}
