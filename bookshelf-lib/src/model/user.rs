//! Authentication payloads

use serde::Deserialize;
use serde::Serialize;

/// Role name granted to administrators.
pub const ADMIN_ROLE: &str = "ROLE_ADMIN";

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub role: String,
}

impl User {
    /// Returns `true` if the user has the administrator role.
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Response of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
    pub role: String,
}

impl From<AuthResponse> for User {
    fn from(response: AuthResponse) -> Self {
        Self {
            username: response.username,
            role: response.role,
        }
    }
}
