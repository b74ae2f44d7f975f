//! Domain Entities

pub mod rate_limit_entry;
pub mod session;
pub mod user;

pub use rate_limit_entry::RateLimitEntry;
pub use session::Session;
pub use user::User;
