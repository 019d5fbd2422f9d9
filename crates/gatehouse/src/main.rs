//! Gatehouse - email/password authentication service

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::Config;
use gatehouse_api::{AppState, create_router};
use gatehouse_auth::{JwtManager, SessionManager, TOKEN_TTL_DAYS, hash_password};
use gatehouse_db::{Database, NewUser, UserRole};

/// Gatehouse - email/password authentication service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "GATEHOUSE_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "GATEHOUSE_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Initialize logging
    init_logging(&config.logging.level);

    info!("Starting Gatehouse v{}", env!("CARGO_PKG_VERSION"));

    if config.server.is_production() && config.uses_default_secret() {
        warn!("Running in production with the default JWT secret");
    }

    // Make sure the database directory exists
    if let Some(parent) = Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // Initialize database
    let db_url = format!("sqlite:{}?mode=rwc", config.database.path);
    let db = Database::new(&db_url).await?;

    // Seed the configured admin account if the store is empty
    bootstrap_admin(&db, &config).await?;

    // Initialize session management
    let jwt = JwtManager::new(&config.auth.jwt_secret, TOKEN_TTL_DAYS);
    let sessions = Arc::new(SessionManager::new(
        jwt,
        db.clone(),
        config.server.is_production(),
    ));

    // Create application state
    let state = AppState::new(
        db,
        sessions,
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    );

    // Create router
    let app = create_router(state).layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Seed the configured admin account on an empty store
async fn bootstrap_admin(db: &Database, config: &Config) -> Result<()> {
    let (Some(email), Some(password)) = (
        config.bootstrap.admin_email.as_deref(),
        config.bootstrap.admin_password.as_deref(),
    ) else {
        return Ok(());
    };

    if db.has_users().await? {
        return Ok(());
    }

    info!("Creating bootstrap admin account: {}", email);
    let password_hash = hash_password(password)?;
    db.insert_user(NewUser {
        email: email.to_string(),
        password_hash,
        role: UserRole::Admin,
    })
    .await?;

    Ok(())
}

/// Initialize logging
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}
