//! Identity records exchanged with the auth endpoints.

use serde::{Deserialize, Serialize};

/// Role name the service uses for administrators
pub const ADMIN_ROLE: &str = "admin";

/// Cached user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub is_active: bool,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// Credentials for `POST /api/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub nip: String,
    pub password: String,
}

/// Payload for `POST /api/register`
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub nip: String,
    pub password: String,
    pub role: String,
}

/// Tokens and profile returned by login/registration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}
