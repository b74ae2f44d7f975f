//! User ID Value Object
//!
//! Type-safe user identifier backed by the kernel `Id` wrapper.

use kernel::id::{Id, markers};

/// User ID (UUID v4 under the hood)
pub type UserId = Id<markers::User>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_roundtrip() {
        let id = UserId::new();
        let uuid = id.into_uuid();
        assert_eq!(UserId::from_uuid(uuid), id);
    }
}
