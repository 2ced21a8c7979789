//! Rephrase Trainer - vocabulary practice against a local LLM
//!
//! The learner rephrases a random topic in one of three modes and gets a
//! model example plus coaching feedback from an `OpenAI`-compatible endpoint.

mod api;
mod chat;
mod config;
mod db;
mod evaluation;
mod llm;
mod practice;
mod runtime;
mod settings;
mod state_machine;

use api::{create_router, AppState};
use chat::ChatService;
use config::AppConfig;
use db::Database;
use llm::{LoggingClient, OpenAICompatClient};
use runtime::SessionHandle;
use settings::SettingsService;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rephrase_trainer=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = AppConfig::from_env();

    // Ensure database directory exists
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path.display(), "Opening settings database");
    let db = Database::open(&config.db_path)?;
    let settings = Arc::new(SettingsService::load(db)?);

    if !settings.get().has_api_key() {
        tracing::warn!("No API key saved yet. Set one via PUT /api/settings.");
    }

    let client = Arc::new(LoggingClient::new(OpenAICompatClient::new(
        config.endpoint.clone(),
        config.request_timeout,
    )?));
    tracing::info!(
        endpoint = %config.endpoint,
        timeout_secs = config.request_timeout.as_secs(),
        "Completion client ready"
    );

    let session = SessionHandle::spawn(client.clone(), settings.clone());
    let chat = ChatService::new(client, settings.clone());
    let state = AppState::new(session, settings, chat);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Rephrase trainer listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
