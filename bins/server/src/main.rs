//! Warden API Server
//!
//! Main entry point for the dormitory ledger and clearance service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use warden_api::{AppState, create_router};
use warden_core::Engine;
use warden_core::ledger::CategoryAliases;
use warden_db::{SeaStore, connect_pool};
use warden_shared::{AppConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warden=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = connect_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;
    info!("Connected to database");

    let aliases = CategoryAliases::with_extra(&config.ledger.category_aliases)
        .context("invalid ledger category aliases")?;
    let store = Arc::new(SeaStore::new(db, aliases));
    let engine = Engine::new(store, &config.ledger, &config.receipts)
        .context("failed to start ledger engine")?;
    info!(
        auto_create_term = config.ledger.auto_create_term,
        page_size = config.ledger.page_size,
        dorm_name = %config.receipts.dorm_name,
        "Ledger engine configured"
    );

    let jwt_service = JwtService::new((&config.jwt).into());

    let state = AppState {
        engine: Arc::new(engine),
        jwt_service: Arc::new(jwt_service),
    };
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
