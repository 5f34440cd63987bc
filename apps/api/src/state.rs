use std::sync::Arc;

use crate::bank::QuestionBank;
use crate::config::Config;
use crate::interview::SessionOrchestrator;
use crate::speech::SpeechBridge;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub bank: Arc<QuestionBank>,
    pub orchestrator: Arc<SessionOrchestrator>,
    pub speech: Arc<SpeechBridge>,
    pub config: Config,
}
