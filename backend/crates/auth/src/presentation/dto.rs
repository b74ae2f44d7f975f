//! Data Transfer Objects
//!
//! Request/response shapes for the auth HTTP surface. Fields are
//! camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::domain::entity::user::User;

/// POST /signup request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// POST /login request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public user representation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.user_id.to_string(),
            name: user.name.clone(),
            email: user.email.as_str().to_string(),
        }
    }
}

/// Response wrapping a user; `user` is null for anonymous callers of GET /me
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEnvelope {
    pub user: Option<UserResponse>,
}

/// POST /logout response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    pub logged_out: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_envelope_null_serialization() {
        let json = serde_json::to_value(UserEnvelope { user: None }).unwrap();
        assert!(json["user"].is_null());
    }

    #[test]
    fn test_logout_response_camel_case() {
        let json = serde_json::to_value(LogoutResponse { logged_out: true }).unwrap();
        assert_eq!(json["loggedOut"], true);
    }
}
