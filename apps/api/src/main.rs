mod bank;
mod config;
mod errors;
mod evaluation;
mod interview;
mod llm_client;
mod models;
mod reporting;
mod routes;
mod speech;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::bank::QuestionBank;
use crate::config::Config;
use crate::evaluation::Evaluator;
use crate::interview::SessionOrchestrator;
use crate::llm_client::LlmClient;
use crate::reporting::ReportAggregator;
use crate::routes::build_router;
use crate::speech::SpeechBridge;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (panics on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting interview API v{}", env!("CARGO_PKG_VERSION"));

    // Load the question corpus (an empty bank is degraded, not fatal)
    let bank = Arc::new(QuestionBank::load(&config.questions_path));
    info!("Question bank loaded ({} questions)", bank.len());

    // Initialize LLM client when a key is present
    let llm = config.llm_api_key.clone().map(|key| {
        LlmClient::new(key, config.llm_api_base.clone(), config.llm_model.clone())
    });
    match &llm {
        Some(_) => info!("LLM client initialized (model: {})", config.llm_model),
        None => warn!("DASHSCOPE_API_KEY not set; evaluation and reporting run rule-based"),
    }

    let evaluator = Evaluator::new(llm.clone());
    let aggregator = ReportAggregator::new(llm);
    let orchestrator = Arc::new(SessionOrchestrator::new(
        bank.clone(),
        evaluator,
        aggregator,
    ));

    // Initialize the realtime speech bridge
    let speech = Arc::new(SpeechBridge::from_config(&config));
    info!(
        "Speech bridge initialized (asr: {}, tts: {})",
        speech.asr_configured(),
        speech.tts_configured()
    );

    // Build app state
    let state = AppState {
        bank,
        orchestrator,
        speech,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
