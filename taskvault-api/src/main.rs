//! # TaskVault API Server
//!
//! Task-management HTTP API providing:
//! - User registration and login with JWT access + refresh tokens
//! - Refresh-token rotation and revocation
//! - Per-user task CRUD with a status state machine
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskvault-api
//! ```

use taskvault_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskvault_shared::db::{migrations, pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskvault_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TaskVault API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = Config::from_env()?;
    let bind_address = config.bind_address();

    // Initialize database pool and run migrations
    let db_config = pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    };
    let db = pool::create_pool(db_config).await?;
    migrations::run_migrations(&db).await?;

    // Build application
    let state = AppState::new(db, config);
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
