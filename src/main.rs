//! Main entry point for the HMS backend.
//!
//! Opens (and migrates) the SQLite database, loads the bearer token table,
//! and serves the REST API.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use api_shared::TokenSet;
use hms_core::{db, CoreConfig};

/// Main entry point for the HMS application.
///
/// # Environment Variables
/// - `HMS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `HMS_DATABASE_URL`: SQLite database URL (default: "sqlite://hms.db?mode=rwc")
/// - `HMS_ASSET_BASE_URL`: Base URL for stored image paths (default: "/storage")
/// - `HMS_API_TOKENS`: Bearer token table (`token=Role:id`, comma-separated)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("hms=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("HMS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = CoreConfig::from_env()?;
    let pool = db::connect(cfg.database_url()).await?;
    let tokens = TokenSet::from_env()?;

    tracing::info!("++ Starting HMS REST on {}", rest_addr);

    let state = AppState::new(pool, cfg, tokens);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, api_rest::app(state)).await?;

    Ok(())
}
