//! Axum route handlers for the speech endpoints.

use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::error;

use crate::errors::AppError;
use crate::speech::SpeechError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

fn default_sample_rate() -> u32 {
    16000
}

fn default_format() -> String {
    "pcm".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Deserialize)]
pub struct TranscribeRequest {
    /// Base64-encoded audio payload.
    pub audio: String,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SynthesizeResponse {
    /// Base64-encoded PCM audio (24 kHz mono, 16-bit).
    pub audio: String,
    pub format: String,
    pub sample_rate: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/speech/asr
///
/// Transcribes one base64-encoded utterance.
pub async fn handle_transcribe(
    State(state): State<AppState>,
    Json(request): Json<TranscribeRequest>,
) -> Result<Json<TranscribeResponse>, AppError> {
    let audio = base64::engine::general_purpose::STANDARD
        .decode(&request.audio)
        .map_err(|e| AppError::Validation(format!("audio is not valid base64: {e}")))?;
    if audio.is_empty() {
        return Err(AppError::Validation("audio cannot be empty".to_string()));
    }

    let text = state
        .speech
        .speech_to_text(&audio, request.sample_rate, &request.format, &request.language)
        .await?;

    Ok(Json(TranscribeResponse { text }))
}

/// POST /api/v1/speech/tts
///
/// Synthesizes the full utterance and returns it base64-encoded.
pub async fn handle_synthesize(
    State(state): State<AppState>,
    Json(request): Json<SynthesizeRequest>,
) -> Result<Json<SynthesizeResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    let audio = state.speech.text_to_speech(&request.text).await?;

    Ok(Json(SynthesizeResponse {
        audio: base64::engine::general_purpose::STANDARD.encode(&audio),
        format: "pcm".to_string(),
        sample_rate: 24000,
    }))
}

/// POST /api/v1/speech/tts/stream
///
/// Streams raw PCM chunks as they arrive from the provider. A synthesis
/// failure after the response has started can only truncate the stream, so
/// the unconfigured case is rejected up front.
pub async fn handle_synthesize_stream(
    State(state): State<AppState>,
    Json(request): Json<SynthesizeRequest>,
) -> Result<Response, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }
    if !state.speech.tts_configured() {
        return Err(SpeechError::Unconfigured("TTS").into());
    }

    let (tx, rx) = mpsc::unbounded_channel::<Result<bytes::Bytes, std::io::Error>>();
    let speech = state.speech.clone();
    let text = request.text;
    tokio::spawn(async move {
        let result = speech
            .text_to_speech_stream(&text, |chunk| {
                let _ = tx.send(Ok(chunk));
            })
            .await;
        if let Err(e) = result {
            error!("Streaming synthesis failed mid-stream: {e}");
        }
    });

    let body = Body::from_stream(UnboundedReceiverStream::new(rx));
    Ok(([(header::CONTENT_TYPE, "audio/pcm")], body).into_response())
}
