use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rust_logistics_api::config::Config;
use rust_logistics_api::handlers::AppState;
use rust_logistics_api::router::build_router;

/// Main entry point for the application.
///
/// Initializes logging, loads the configuration, builds every external
/// client exactly once, and serves the router.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_logistics_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Build clients (token provider, Firestore, identity, CRM)
    let state = AppState::from_config(config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize clients: {}", e))?;
    tracing::info!("✓ External clients initialized");

    // Start server
    let addr = format!("0.0.0.0:{}", state.config.port);
    let app = build_router(Arc::new(state))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
