//! Gatehouse REST API
//!
//! This crate provides the Axum-based HTTP layer for Gatehouse:
//! route assembly, shared application state, and the wire-facing
//! error taxonomy.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
