use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
///
/// Reports which capabilities are live. The service starts even with an empty
/// question bank or missing AI credentials, so clients use this to tell a
/// degraded deployment from a broken one.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "interview-api",
        "question_count": state.bank.len(),
        "llm_configured": state.config.llm_api_key.is_some(),
        "asr_configured": state.speech.asr_configured(),
        "tts_configured": state.speech.tts_configured(),
    }))
}
