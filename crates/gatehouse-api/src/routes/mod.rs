//! API routes

mod admin;
mod auth;
mod health;
pub mod types;

use axum::Router;

use crate::state::AppState;

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .merge(health::routes())
        // Session lifecycle
        .merge(auth::routes())
        // Admin surface
        .merge(admin::routes())
        .with_state(state)
}
