//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, random tokens, constant-time compare)
//! - Password hashing (PBKDF2-HMAC-SHA256, `salt_hex:digest_hex` encoding)
//! - Cookie construction and parsing
//! - CSRF double-submit token validation
//! - Login rate limit policy types
//! - Security event log (PII-hashed audit records)

pub mod audit;
pub mod client;
pub mod cookie;
pub mod crypto;
pub mod csrf;
pub mod password;
pub mod rate_limit;
