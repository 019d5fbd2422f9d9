//! Authentication extractors and routes

use axum::{
    Json, Router,
    extract::{FromRef, FromRequestParts, State},
    http::{HeaderName, HeaderValue, header::SET_COOKIE, request::Parts},
    routing::{get, post},
};
use gatehouse_auth::{AuthUser, hash_password, verify_password};
use gatehouse_db::{DbError, NewUser, UserRole, normalize_email};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{AuthResponse, CredentialsRequest, LogoutResponse, UserView};

// ==================== Auth Extractors ====================

/// Extractor for an authenticated caller (required)
///
/// Rejects with 401 when the request carries no resolvable session.
pub struct RequireAuth(pub AuthUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let user = app_state
            .sessions
            .resolve_user(&parts.headers)
            .await
            .ok_or(ApiError::Unauthorized)?;

        debug!("Authenticated user: {} ({})", user.email, user.role.as_str());
        Ok(RequireAuth(user))
    }
}

/// Extractor for an admin caller (required)
///
/// Authentication is checked first: an anonymous request gets 401,
/// a known non-admin gets 403.
pub struct RequireAdmin(pub AuthUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;

        if !user.role.is_admin() {
            return Err(ApiError::Forbidden);
        }

        Ok(RequireAdmin(user))
    }
}

// ==================== Input Validation ====================

/// Maximum allowed email length (RFC 5321 mailbox limit)
const MAX_EMAIL_LENGTH: usize = 254;
/// Minimum allowed password length
const MIN_PASSWORD_LENGTH: usize = 8;
/// Maximum allowed password length (prevent DoS with very large passwords)
const MAX_PASSWORD_LENGTH: usize = 256;

/// Validate email shape and length
fn validate_email(email: &str) -> Result<(), ApiError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ApiError::Validation("Email cannot be empty".to_string()));
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ApiError::Validation(format!(
            "Email exceeds maximum length of {} characters",
            MAX_EMAIL_LENGTH
        )));
    }
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !well_formed {
        return Err(ApiError::Validation(
            "Email is not a well-formed address".to_string(),
        ));
    }
    Ok(())
}

/// Validate password length
fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::Validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::Validation(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

// ==================== Auth Routes ====================

/// POST /auth/signup
async fn signup(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<([(HeaderName, HeaderValue); 1], Json<AuthResponse>), ApiError> {
    validate_email(&request.email)?;
    validate_password(&request.password)?;

    let email = normalize_email(&request.email);

    // Advisory pre-check; the unique constraint is the real arbiter
    // under concurrent signups with the same email.
    if state.db.get_user_by_email(&email).await?.is_some() {
        return Err(ApiError::EmailInUse);
    }

    let password_hash = hash_password(&request.password)?;

    let user = state
        .db
        .insert_user(NewUser {
            email,
            password_hash,
            role: UserRole::User,
        })
        .await
        .map_err(|err| match err {
            DbError::Duplicate(_) => ApiError::EmailInUse,
            other => ApiError::Database(other),
        })?;

    let (_token, cookie) = state.sessions.establish(&user)?;

    info!("New account: {}", user.email);

    Ok((
        [(SET_COOKIE, cookie)],
        Json(AuthResponse {
            user: UserView::from(&user),
        }),
    ))
}

/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<([(HeaderName, HeaderValue); 1], Json<AuthResponse>), ApiError> {
    validate_email(&request.email)?;
    validate_password(&request.password)?;

    debug!("Login attempt for {}", request.email);

    let user = state.db.get_user_by_email(&request.email).await?;

    // Always run verification so an unknown email costs the same as a
    // wrong password. The dummy is a well-formed Argon2 hash that no
    // password matches.
    const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$dGltaW5nX2F0dGFja19wcmV2ZW50aW9u$K8rI5T7VdQ8xkO0GqK5K2w";

    let hash_to_verify = user.as_ref().map_or(DUMMY_HASH, |u| u.password_hash.as_str());
    let password_valid = verify_password(&request.password, hash_to_verify);

    let user = match (user, password_valid) {
        (Some(user), true) => user,
        _ => return Err(ApiError::InvalidCredentials),
    };

    let (_token, cookie) = state.sessions.establish(&user)?;

    info!("User {} logged in", user.email);

    Ok((
        [(SET_COOKIE, cookie)],
        Json(AuthResponse {
            user: UserView::from(&user),
        }),
    ))
}

/// GET /auth/me
async fn me(RequireAuth(user): RequireAuth) -> Json<AuthResponse> {
    Json(AuthResponse {
        user: UserView::from(user),
    })
}

/// POST /auth/logout
///
/// Unconditional: clearing an absent session is still a success.
async fn logout(
    State(state): State<AppState>,
) -> ([(HeaderName, HeaderValue); 1], Json<LogoutResponse>) {
    (
        [(SET_COOKIE, state.sessions.clear())],
        Json(LogoutResponse { success: true }),
    )
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, Response, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::routes::{create_router, testing::test_state};
    use crate::state::AppState;

    async fn test_app() -> (Router, AppState) {
        let state = test_state().await;
        (create_router(state.clone()), state)
    }

    fn post_json(path: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_with_cookie(path: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    /// Extract `name=value` from the response's Set-Cookie header
    fn session_cookie(response: &Response<Body>) -> String {
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("response should carry Set-Cookie")
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn body_json(response: Response<Body>) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn credentials(email: &str, password: &str) -> Value {
        json!({ "email": email, "password": password })
    }

    #[tokio::test]
    async fn test_signup_normalizes_email() {
        let (app, _) = test_app().await;

        let response = app
            .oneshot(post_json(
                "/auth/signup",
                &credentials("NEW@EXAMPLE.COM", "password123"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["user"]["email"], "new@example.com");
        assert_eq!(body["user"]["role"], "USER");
    }

    #[tokio::test]
    async fn test_signup_sets_session_cookie() {
        let (app, _) = test_app().await;

        let response = app
            .oneshot(post_json(
                "/auth/signup",
                &credentials("alice@example.com", "password123"),
            ))
            .await
            .unwrap();

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(set_cookie.starts_with("auth_token="));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("SameSite=Lax"));
        assert!(set_cookie.contains("Max-Age=604800"));
    }

    #[tokio::test]
    async fn test_signup_omits_password_hash() {
        let (app, _) = test_app().await;

        let response = app
            .oneshot(post_json(
                "/auth/signup",
                &credentials("alice@example.com", "password123"),
            ))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert!(body["user"].get("password_hash").is_none());
        assert!(body["user"].get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn test_signup_rejects_duplicate_email() {
        let (app, state) = test_app().await;

        let first = app
            .clone()
            .oneshot(post_json(
                "/auth/signup",
                &credentials("taken@example.com", "password123"),
            ))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        // Same address in a different case
        let second = app
            .oneshot(post_json(
                "/auth/signup",
                &credentials("TAKEN@example.com", "password456"),
            ))
            .await
            .unwrap();

        assert_eq!(second.status(), StatusCode::BAD_REQUEST);
        let body = body_json(second).await;
        assert_eq!(body["error"], "Email already in use");

        assert_eq!(state.db.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_signup_rejects_short_password() {
        let (app, state) = test_app().await;

        let response = app
            .oneshot(post_json(
                "/auth/signup",
                &credentials("alice@example.com", "short"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(!state.db.has_users().await.unwrap());
    }

    #[tokio::test]
    async fn test_signup_rejects_malformed_email() {
        let (app, state) = test_app().await;

        for email in ["", "not-an-email", "@example.com", "a@b", "a b@example.com"] {
            let response = app
                .clone()
                .oneshot(post_json("/auth/signup", &credentials(email, "password123")))
                .await
                .unwrap();
            assert_eq!(
                response.status(),
                StatusCode::UNPROCESSABLE_ENTITY,
                "email {:?} should be rejected",
                email
            );
        }
        assert!(!state.db.has_users().await.unwrap());
    }

    #[tokio::test]
    async fn test_login_failure_is_uniform() {
        let (app, _) = test_app().await;

        app.clone()
            .oneshot(post_json(
                "/auth/signup",
                &credentials("alice@example.com", "password123"),
            ))
            .await
            .unwrap();

        let wrong_password = app
            .clone()
            .oneshot(post_json(
                "/auth/login",
                &credentials("alice@example.com", "wrong-password"),
            ))
            .await
            .unwrap();
        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);

        let unknown_email = app
            .oneshot(post_json(
                "/auth/login",
                &credentials("nobody@example.com", "password123"),
            ))
            .await
            .unwrap();
        assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

        // Identical bodies: the caller cannot tell which part was wrong
        let first = body_json(wrong_password).await;
        let second = body_json(unknown_email).await;
        assert_eq!(first, second);
        assert_eq!(first["error"], "Invalid email or password");
    }

    #[tokio::test]
    async fn test_login_establishes_session() {
        let (app, _) = test_app().await;

        app.clone()
            .oneshot(post_json(
                "/auth/signup",
                &credentials("alice@example.com", "password123"),
            ))
            .await
            .unwrap();

        let login = app
            .clone()
            .oneshot(post_json(
                "/auth/login",
                &credentials("  ALICE@example.com ", "password123"),
            ))
            .await
            .unwrap();
        assert_eq!(login.status(), StatusCode::OK);

        let cookie = session_cookie(&login);
        let me = app
            .oneshot(get_with_cookie("/auth/me", Some(&cookie)))
            .await
            .unwrap();

        assert_eq!(me.status(), StatusCode::OK);
        let body = body_json(me).await;
        assert_eq!(body["user"]["email"], "alice@example.com");
    }

    #[tokio::test]
    async fn test_me_without_cookie() {
        let (app, _) = test_app().await;

        let response = app.oneshot(get_with_cookie("/auth/me", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_me_with_fresh_signup_cookie() {
        let (app, _) = test_app().await;

        let signup = app
            .clone()
            .oneshot(post_json(
                "/auth/signup",
                &credentials("alice@example.com", "password123"),
            ))
            .await
            .unwrap();
        let signup_body = body_json(
            app.clone()
                .oneshot(get_with_cookie("/auth/me", Some(&session_cookie(&signup))))
                .await
                .unwrap(),
        )
        .await;

        assert_eq!(signup_body["user"]["email"], "alice@example.com");
        assert_eq!(signup_body["user"]["role"], "USER");
    }

    #[tokio::test]
    async fn test_logout_flow() {
        let (app, _) = test_app().await;

        let signup = app
            .clone()
            .oneshot(post_json(
                "/auth/signup",
                &credentials("alice@example.com", "password123"),
            ))
            .await
            .unwrap();
        let cookie = session_cookie(&signup);

        let logout = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/logout")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(logout.status(), StatusCode::OK);
        let cleared = session_cookie(&logout);
        assert_eq!(cleared, "auth_token=");
        let body = body_json(logout).await;
        assert_eq!(body["success"], true);

        // The cleared cookie no longer authenticates
        let me = app
            .oneshot(get_with_cookie("/auth/me", Some(&cleared)))
            .await
            .unwrap();
        assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_without_session_succeeds() {
        let (app, _) = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/logout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_tampered_cookie_is_anonymous() {
        let (app, _) = test_app().await;

        let signup = app
            .clone()
            .oneshot(post_json(
                "/auth/signup",
                &credentials("alice@example.com", "password123"),
            ))
            .await
            .unwrap();
        let cookie = session_cookie(&signup);

        let mut tampered = cookie.clone();
        tampered.pop();
        tampered.push(if cookie.ends_with('A') { 'B' } else { 'A' });

        let me = app
            .oneshot(get_with_cookie("/auth/me", Some(&tampered)))
            .await
            .unwrap();
        assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
    }
}
