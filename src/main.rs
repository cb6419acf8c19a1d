mod actions;
mod agent;
mod config;
mod errors;
mod market;
mod models;
mod routes;
mod service;

use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::actions::ActionDispatcher;
use crate::agent::RigProvider;
use crate::config::AppConfig;
use crate::market::{MarketData, StaticMarket};
use crate::routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (development convenience)
    dotenvy::dotenv().ok();

    // Initialise tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roma_assistant=debug,tower_http=debug".into()),
        )
        .init();

    // ── Configuration ─────────────────────────────────────────────────────────
    let config = AppConfig::from_env().context("Invalid configuration (see .env.example)")?;

    // ── Dependency wiring ─────────────────────────────────────────────────────
    let market: Arc<dyn MarketData> = Arc::new(StaticMarket::default());
    let provider = RigProvider::from_settings(&config.provider, market.clone())
        .context("Failed to set up the LLM provider")?;
    let dispatcher = ActionDispatcher::new(market);
    let state = AppState::new(Arc::new(provider), dispatcher, config.turn);

    // ── Router ────────────────────────────────────────────────────────────────
    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // ── Listen ────────────────────────────────────────────────────────────────
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on http://{addr}/");

    axum::serve(listener, app).await?;
    Ok(())
}
