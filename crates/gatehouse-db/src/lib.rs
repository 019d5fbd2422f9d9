//! Gatehouse Database Layer
//!
//! This crate provides the persistence layer for Gatehouse,
//! using SQLite via sqlx for account storage.

pub mod error;
pub mod models;
pub mod repository;
mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::Database;

/// Re-export sqlx types for convenience
pub use sqlx::SqlitePool;
