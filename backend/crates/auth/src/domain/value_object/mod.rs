//! Value Objects

pub mod email;
pub mod limiter_key;
pub mod user_id;

pub use email::Email;
pub use limiter_key::LimiterKey;
pub use user_id::UserId;
