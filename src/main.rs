// src/main.rs

use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sage::config::CONFIG;
use sage::orchestrator::{OrchestratorSettings, ResponseOrchestrator};
use sage::provider::{GeminiProvider, GroqProvider, ProviderClient};
use sage::server::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let level = CONFIG
        .log_level
        .parse::<Level>()
        .unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Sage response router");
    info!("Primary model: {} (Groq)", CONFIG.groq_model);
    info!("Vision/fallback model: {} (Gemini)", CONFIG.gemini_model);

    // Provider clients are built once here and injected, never constructed
    // at module scope.
    let primary: Arc<dyn ProviderClient> = Arc::new(GroqProvider::from_config(&CONFIG)?);
    let vision: Arc<dyn ProviderClient> = Arc::new(GeminiProvider::from_config(&CONFIG)?);

    let orchestrator = Arc::new(ResponseOrchestrator::new(
        primary,
        vision,
        OrchestratorSettings::from_config(&CONFIG),
    ));

    let app = server::router(Arc::new(AppState { orchestrator }));

    let bind_address = CONFIG.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
