mod config;
mod errors;
mod evaluation;
mod llm_client;
mod resume;
mod routes;
mod state;
mod submissions;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::evaluation::Evaluator;
use crate::routes::build_router;
use crate::state::AppState;
use crate::submissions::SubmissionRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("screener_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screener API v{}", env!("CARGO_PKG_VERSION"));

    let evaluator = Evaluator::from_config(&config)?;
    if evaluator.is_model_configured() {
        info!(models = ?evaluator.models(), "Model evaluation enabled");
    } else {
        warn!("GEMINI_API_KEY not set; submissions receive a placeholder evaluation");
    }

    let state = AppState {
        evaluator,
        registry: SubmissionRegistry::new(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
