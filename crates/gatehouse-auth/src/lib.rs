//! Gatehouse Authentication and Session Management
//!
//! This crate provides Argon2 password hashing, JWT session tokens,
//! and cookie-backed session resolution for Gatehouse.

pub mod error;
pub mod jwt;
pub mod password;
pub mod session;

pub use error::AuthError;
pub use jwt::{Claims, JwtManager};
pub use password::{hash_password, verify_password};
pub use session::{AUTH_COOKIE, AuthUser, SessionManager};

/// Session token lifetime in days; the cookie max-age matches it.
pub const TOKEN_TTL_DAYS: i64 = 7;
