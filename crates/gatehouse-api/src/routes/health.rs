//! Health check endpoint

use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Database reachability probe result
#[derive(Debug, Serialize, Deserialize)]
pub struct DbHealth {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health status response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub name: String,
    pub version: String,
    pub status: String,
    pub db: DbHealth,
}

/// Health check handler
///
/// Always HTTP 200; a failing store degrades the status instead of
/// failing the endpoint.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db = match state.db.ping().await {
        Ok(()) => DbHealth {
            ok: true,
            error: None,
        },
        Err(err) => DbHealth {
            ok: false,
            error: Some(err.to_string()),
        },
    };

    Json(HealthResponse {
        name: state.service_name.to_string(),
        version: state.service_version.to_string(),
        status: if db.ok { "ok" } else { "degraded" }.to_string(),
        db,
    })
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
