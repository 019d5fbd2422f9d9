//! Application state

use gatehouse_auth::SessionManager;
use gatehouse_db::Database;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: Arc<SessionManager>,
    /// Service name reported by the health endpoint
    pub service_name: &'static str,
    /// Service version reported by the health endpoint
    pub service_version: &'static str,
}

impl AppState {
    pub fn new(
        db: Database,
        sessions: Arc<SessionManager>,
        service_name: &'static str,
        service_version: &'static str,
    ) -> Self {
        Self {
            db,
            sessions,
            service_name,
            service_version,
        }
    }
}
