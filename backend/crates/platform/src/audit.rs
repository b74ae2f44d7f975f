//! Security Event Logging
//!
//! Structured security events emitted through `tracing` under the
//! `security_event` target. Events never carry raw credentials or
//! identifiers; emails and client addresses are reduced to a short
//! hash prefix first.

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value, json};

use crate::crypto::sha256_hex;

/// Hex characters kept from the SHA-256 digest of an identifier.
const IDENTIFIER_PREFIX_LEN: usize = 16;

/// Reduce a sensitive identifier (email, IP) to a fixed-length hash prefix.
///
/// Input is trimmed and lowercased first so logically equal identifiers
/// map to the same prefix.
///
/// ## Examples
///
/// ```
/// use platform::audit::hash_identifier;
///
/// let a = hash_identifier("User@Example.com");
/// let b = hash_identifier("  user@example.com  ");
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 16);
/// ```
pub fn hash_identifier(raw: &str) -> String {
    let normalized = raw.trim().to_lowercase();
    let digest = sha256_hex(normalized.as_bytes());
    digest[..IDENTIFIER_PREFIX_LEN].to_string()
}

/// A single security event under construction
#[derive(Debug)]
pub struct SecurityEvent {
    name: &'static str,
    fields: Map<String, Value>,
}

impl SecurityEvent {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Map::new(),
        }
    }

    /// Attach a structured field to the event.
    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Attach a field only when the value is present; absent values are
    /// dropped entirely rather than serialized as null.
    pub fn opt_field(self, key: &str, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.field(key, value),
            None => self,
        }
    }

    /// Materialize the event as a JSON object with `event` and a UTC
    /// RFC 3339 `timestamp` always present.
    pub fn record(&self) -> Value {
        let mut object = Map::new();
        object.insert("event".to_string(), json!(self.name));
        object.insert(
            "timestamp".to_string(),
            json!(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        for (key, value) in &self.fields {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }

    /// Emit the event through `tracing` under the `security_event` target.
    pub fn emit(self) {
        let payload = self.record();
        tracing::info!(target: "security_event", event = %self.name, payload = %payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_identifier_normalizes() {
        assert_eq!(
            hash_identifier("User@Example.com"),
            hash_identifier("  user@example.com ")
        );
    }

    #[test]
    fn test_hash_identifier_fixed_length() {
        assert_eq!(hash_identifier("").len(), IDENTIFIER_PREFIX_LEN);
        assert_eq!(hash_identifier("a").len(), IDENTIFIER_PREFIX_LEN);
        assert_eq!(
            hash_identifier("a-much-longer-identifier@example.com").len(),
            IDENTIFIER_PREFIX_LEN
        );
    }

    #[test]
    fn test_hash_identifier_distinct_inputs() {
        assert_ne!(hash_identifier("a@example.com"), hash_identifier("b@example.com"));
    }

    #[test]
    fn test_record_has_event_and_timestamp() {
        let value = SecurityEvent::new("login_failed")
            .field("reason", "bad_password")
            .record();
        assert_eq!(value["event"], "login_failed");
        assert_eq!(value["reason"], "bad_password");
        assert!(value["timestamp"].as_str().is_some_and(|t| t.ends_with('Z')));
    }

    #[test]
    fn test_opt_field_drops_none() {
        let value = SecurityEvent::new("logout")
            .opt_field("user", Some("abc"))
            .opt_field("session", None::<&str>)
            .record();
        assert_eq!(value["user"], "abc");
        assert!(value.get("session").is_none());
    }
}
