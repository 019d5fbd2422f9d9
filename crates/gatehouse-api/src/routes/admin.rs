//! Admin routes

use axum::{Json, Router, extract::State, routing::get};

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::RequireAdmin;
use super::types::UserRecord;

/// GET /admin/users (Admin only)
async fn list_users(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserRecord>>, ApiError> {
    let users = state.db.list_users().await?;

    Ok(Json(users.iter().map(UserRecord::from).collect()))
}

/// Create admin routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/users", get(list_users))
}
