//! Request and response types

use gatehouse_auth::AuthUser;
use gatehouse_db::{User, UserRole};
use serde::{Deserialize, Serialize};

/// Signup and login request body
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Public view of an account; never carries the password hash
#[derive(Debug, Serialize, Deserialize)]
pub struct UserView {
    pub id: i64,
    pub email: String,
    pub role: UserRole,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
        }
    }
}

impl From<AuthUser> for UserView {
    fn from(user: AuthUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}

/// Body wrapping the public user view for signup, login, and me
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserView,
}

/// Logout acknowledgement
#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Account record as listed on the admin surface
#[derive(Debug, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub role: UserRole,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}
