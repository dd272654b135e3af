use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use chat_api_server::config::Settings;
use chat_api_server::document::load_system_prompt;
use chat_api_server::logging::{init_tracing, ActivityLogger, LoggerConfig};
use chat_api_server::routes::build_router;
use chat_api_server::services::conversation::{ConversationStore, ExpirySweeper};
use chat_api_server::services::{LlmService, QueryService};
use chat_api_server::shutdown::shutdown_signal;
use chat_api_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first: logging options live in it
    let settings = Settings::load()?;

    init_tracing(&settings.logging)?;
    info!("🚀 Starting chat API server...");
    info!("✅ Configuration loaded");

    // Every conversation is seeded from this; no prompt, no service
    let system_prompt = load_system_prompt(&settings.system_prompt_path())?;

    let logger = ActivityLogger::new(LoggerConfig::default());

    let store = Arc::new(ConversationStore::new(system_prompt, logger.clone()));
    let sweeper = Arc::new(ExpirySweeper::new(
        store.clone(),
        &settings.memory,
        logger.clone(),
    ));
    info!(
        "✅ Conversation memory ready (expiry: {} min, sweep interval: {} s)",
        settings.memory.expiration_minutes, settings.memory.sweep_interval_seconds
    );

    let llm_service = Arc::new(LlmService::new(settings.llm.clone())?);

    let query_service = Arc::new(QueryService::new(
        store.clone(),
        sweeper.clone(),
        llm_service,
        logger,
        settings.prompts.fallback_reply.clone(),
    ));

    let app = build_router(AppState {
        query_service,
        store,
        sweeper: sweeper.clone(),
    });

    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    info!("🎯 Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweeper.shutdown();
    info!("👋 Server stopped");

    Ok(())
}
