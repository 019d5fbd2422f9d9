//! Cookie-backed session management
//!
//! Sessions are stateless: the cookie carries a signed JWT and nothing
//! is stored server-side. The user record is re-read on every
//! resolution, so a role change or account removal takes effect
//! immediately rather than at token expiry.

use axum::http::{HeaderMap, HeaderValue};
use gatehouse_db::{Database, User, UserRole};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::TOKEN_TTL_DAYS;
use crate::error::AuthError;
use crate::jwt::JwtManager;

/// Name of the session cookie
pub const AUTH_COOKIE: &str = "auth_token";

const CLEAR_COOKIE: &str =
    "auth_token=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT";
const CLEAR_COOKIE_SECURE: &str =
    "auth_token=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT";

/// Resolved caller identity
///
/// The subset of the user record needed for authorization decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub role: UserRole,
}

/// Issues, clears, and resolves session cookies
pub struct SessionManager {
    jwt: JwtManager,
    db: Database,
    cookie_secure: bool,
}

impl SessionManager {
    /// Create a new session manager
    ///
    /// `cookie_secure` should be true in production so the cookie is
    /// only sent over HTTPS.
    pub fn new(jwt: JwtManager, db: Database, cookie_secure: bool) -> Self {
        Self {
            jwt,
            db,
            cookie_secure,
        }
    }

    /// Sign a session token for `user` and build the matching Set-Cookie value
    ///
    /// Returns the raw token alongside the header value.
    pub fn establish(&self, user: &User) -> Result<(String, HeaderValue), AuthError> {
        let token = self
            .jwt
            .generate_token(user.id, &user.email, user.role.as_str())?;

        let cookie = format!(
            "{}={}; HttpOnly;{} SameSite=Lax; Path=/; Max-Age={}",
            AUTH_COOKIE,
            token,
            if self.cookie_secure { " Secure;" } else { "" },
            TOKEN_TTL_DAYS * 24 * 60 * 60,
        );
        let value =
            HeaderValue::from_str(&cookie).map_err(|e| AuthError::Cookie(e.to_string()))?;

        Ok((token, value))
    }

    /// Build a Set-Cookie value that removes the session cookie
    ///
    /// Idempotent; safe to send whether or not a session exists.
    pub fn clear(&self) -> HeaderValue {
        if self.cookie_secure {
            HeaderValue::from_static(CLEAR_COOKIE_SECURE)
        } else {
            HeaderValue::from_static(CLEAR_COOKIE)
        }
    }

    /// Resolve the caller from the request's session cookie
    ///
    /// An absent cookie, a bad or expired token, a deleted account, and
    /// a store failure all come back as `None`; an anonymous request is
    /// not an error.
    pub async fn resolve_user(&self, headers: &HeaderMap) -> Option<AuthUser> {
        let token = cookie_value(headers, AUTH_COOKIE)?;

        let claims = match self.jwt.validate_token(&token) {
            Ok(claims) => claims,
            Err(err) => {
                debug!("Rejected session token: {}", err);
                return None;
            }
        };

        let id: i64 = claims.sub.parse().ok()?;

        // The token alone is not trusted for identity or role; stale
        // claims must not outlive the account state.
        match self.db.get_user_by_id(id).await {
            Ok(Some(user)) => Some(AuthUser {
                id: user.id,
                email: user.email,
                role: user.role,
            }),
            Ok(None) => None,
            Err(err) => {
                debug!("User lookup for session failed: {}", err);
                None
            }
        }
    }
}

/// Pull a single cookie out of the Cookie header
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie = headers.get("cookie")?;
    let s = cookie.to_str().ok()?;
    for part in s.split(';') {
        let p = part.trim();
        if let Some((k, v)) = p.split_once('=') {
            if k == name {
                return Some(v.to_string());
            }
        }
    }
    None
}
