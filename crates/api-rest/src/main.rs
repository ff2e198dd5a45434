//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development and debugging when you only want the REST server
//! (with OpenAPI/Swagger UI). Deployments normally use the workspace's main
//! `hms-run` binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{app, AppState};
use api_shared::TokenSet;
use hms_core::{db, CoreConfig};

/// Main entry point for the HMS REST API server.
///
/// Starts the REST API server on the configured address (default: 0.0.0.0:3000).
///
/// # Environment Variables
/// - `HMS_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `HMS_DATABASE_URL`: SQLite database URL
/// - `HMS_ASSET_BASE_URL`: Base URL for stored image paths
/// - `HMS_API_TOKENS`: Bearer token table (`token=Role:id`, comma-separated)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the database cannot be opened or migrated,
/// - the token table is malformed, or
/// - the server address cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("hms_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("HMS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting HMS REST API on {}", addr);

    let cfg = CoreConfig::from_env()?;
    let pool = db::connect(cfg.database_url()).await?;
    let tokens = TokenSet::from_env()?;

    let state = AppState::new(pool, cfg, tokens);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
