//! User Entity

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;

use crate::domain::value_object::{email::Email, user_id::UserId};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    /// User ID (UUID v4)
    pub user_id: UserId,
    /// Display name
    pub name: String,
    /// Normalized email (unique)
    pub email: Email,
    /// PBKDF2 password hash (`salt_hex:digest_hex`)
    pub password_hash: HashedPassword,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user
    pub fn new(name: String, email: Email, password_hash: HashedPassword) -> Self {
        Self {
            user_id: UserId::new(),
            name,
            email,
            password_hash,
            created_at: Utc::now(),
        }
    }

    /// Replace the stored password hash
    pub fn update_password(&mut self, password_hash: HashedPassword) {
        self.password_hash = password_hash;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::ClearTextPassword;

    #[test]
    fn test_new_user_gets_fresh_id() {
        let email = Email::new("a@example.com").unwrap();
        let hash = ClearTextPassword::new("password123".to_string()).unwrap().hash();
        let a = User::new("A".to_string(), email.clone(), hash.clone());
        let b = User::new("B".to_string(), email, hash);
        assert_ne!(a.user_id, b.user_id);
    }
}
