//! SpeechBridge: synchronous-facing ASR/TTS operations over the provider's
//! event-stream protocol. Holds no session state; every call opens its own
//! channel, drives it to completion under a deadline, and tears it down on
//! every exit path.

pub mod channel;
pub mod handlers;

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use thiserror::Error;
use tokio::time::{sleep, timeout};
use tracing::debug;

use crate::config::Config;
use crate::speech::channel::{
    ChannelEvent, RealtimeChannel, RealtimeConnector, SessionConfig, SessionMode, WsConnector,
};

/// Audio is fed in fixed-size chunks with a pacing delay so the provider's
/// ingest buffer is never overrun.
const AUDIO_CHUNK_SIZE: usize = 3200;
const TEXT_CHUNK_CHARS: usize = 50;
const CHUNK_PACING: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("{0} credential not configured")]
    Unconfigured(&'static str),

    #[error("speech provider error: {0}")]
    Provider(String),

    #[error("speech transport error: {0}")]
    Transport(String),

    #[error("{0} timed out")]
    Timeout(&'static str),
}

/// Completion deadlines. A field rather than constants so tests can shrink
/// them.
#[derive(Debug, Clone, Copy)]
pub struct SpeechTimeouts {
    pub asr: Duration,
    pub tts: Duration,
}

impl Default for SpeechTimeouts {
    fn default() -> Self {
        SpeechTimeouts {
            asr: Duration::from_secs(30),
            tts: Duration::from_secs(60),
        }
    }
}

/// Credential + endpoint for one speech capability.
#[derive(Debug, Clone)]
struct Endpoint {
    api_key: String,
    api_base: String,
    model: String,
}

pub struct SpeechBridge {
    connector: Box<dyn RealtimeConnector>,
    asr: Option<Endpoint>,
    tts: Option<Endpoint>,
    tts_voice: String,
    timeouts: SpeechTimeouts,
}

impl SpeechBridge {
    pub fn from_config(config: &Config) -> Self {
        let asr = config.asr_key().map(|key| Endpoint {
            api_key: key.to_string(),
            api_base: config.asr_api_base.clone(),
            model: config.asr_model.clone(),
        });
        let tts = config.tts_key().map(|key| Endpoint {
            api_key: key.to_string(),
            api_base: config.tts_api_base.clone(),
            model: config.tts_model.clone(),
        });
        Self::new(
            Box::new(WsConnector),
            asr,
            tts,
            config.tts_voice.clone(),
            SpeechTimeouts::default(),
        )
    }

    fn new(
        connector: Box<dyn RealtimeConnector>,
        asr: Option<Endpoint>,
        tts: Option<Endpoint>,
        tts_voice: String,
        timeouts: SpeechTimeouts,
    ) -> Self {
        SpeechBridge {
            connector,
            asr,
            tts,
            tts_voice,
            timeouts,
        }
    }

    pub fn asr_configured(&self) -> bool {
        self.asr.is_some()
    }

    pub fn tts_configured(&self) -> bool {
        self.tts.is_some()
    }

    /// Transcribes one utterance. Feeds paced audio chunks, signals end of
    /// input, then waits for the completion event under the ASR deadline.
    pub async fn speech_to_text(
        &self,
        audio: &[u8],
        sample_rate: u32,
        format: &str,
        language: &str,
    ) -> Result<String, SpeechError> {
        let endpoint = self.asr.as_ref().ok_or(SpeechError::Unconfigured("ASR"))?;
        let config = SessionConfig {
            api_base: endpoint.api_base.clone(),
            api_key: endpoint.api_key.clone(),
            model: endpoint.model.clone(),
            mode: SessionMode::Transcription {
                language: language.to_string(),
                sample_rate,
                format: format.to_string(),
            },
        };

        let mut channel = self.connector.open(config).await?;
        let result = drive_transcription(channel.as_mut(), audio, self.timeouts.asr).await;
        channel.close().await;
        result
    }

    /// Synthesizes speech for `text`, buffering audio deltas until the
    /// provider signals the session finished.
    pub async fn text_to_speech(&self, text: &str) -> Result<Bytes, SpeechError> {
        let mut buffer = BytesMut::new();
        self.synthesize(text, |chunk| buffer.extend_from_slice(&chunk))
            .await?;
        Ok(buffer.freeze())
    }

    /// Streaming variant: audio deltas are handed to `on_chunk` as they
    /// arrive instead of being buffered.
    pub async fn text_to_speech_stream(
        &self,
        text: &str,
        on_chunk: impl FnMut(Bytes),
    ) -> Result<(), SpeechError> {
        self.synthesize(text, on_chunk).await
    }

    async fn synthesize(
        &self,
        text: &str,
        on_chunk: impl FnMut(Bytes),
    ) -> Result<(), SpeechError> {
        let endpoint = self.tts.as_ref().ok_or(SpeechError::Unconfigured("TTS"))?;
        let config = SessionConfig {
            api_base: endpoint.api_base.clone(),
            api_key: endpoint.api_key.clone(),
            model: endpoint.model.clone(),
            mode: SessionMode::Synthesis {
                voice: self.tts_voice.clone(),
            },
        };

        let mut channel = self.connector.open(config).await?;
        let result = drive_synthesis(channel.as_mut(), text, self.timeouts.tts, on_chunk).await;
        channel.close().await;
        result
    }
}

async fn drive_transcription(
    channel: &mut dyn RealtimeChannel,
    audio: &[u8],
    deadline: Duration,
) -> Result<String, SpeechError> {
    for chunk in audio.chunks(AUDIO_CHUNK_SIZE) {
        channel.send_audio(chunk).await?;
        sleep(CHUNK_PACING).await;
    }
    channel.end_input().await?;

    timeout(deadline, async {
        loop {
            match channel.next_event().await {
                Some(ChannelEvent::TranscriptionCompleted { transcript }) => {
                    debug!("Transcription completed: {} chars", transcript.len());
                    return Ok(transcript);
                }
                Some(ChannelEvent::Error { message }) => {
                    return Err(SpeechError::Provider(message));
                }
                // Audio deltas and session.finished carry no transcript;
                // only the completion or error event resolves the wait.
                Some(_) => continue,
                None => {
                    return Err(SpeechError::Transport(
                        "channel closed before transcription completed".to_string(),
                    ));
                }
            }
        }
    })
    .await
    .map_err(|_| SpeechError::Timeout("transcription"))?
}

async fn drive_synthesis(
    channel: &mut dyn RealtimeChannel,
    text: &str,
    deadline: Duration,
    mut on_chunk: impl FnMut(Bytes),
) -> Result<(), SpeechError> {
    for chunk in char_chunks(text, TEXT_CHUNK_CHARS) {
        channel.send_text(chunk).await?;
        sleep(CHUNK_PACING).await;
    }
    channel.end_input().await?;

    timeout(deadline, async {
        loop {
            match channel.next_event().await {
                Some(ChannelEvent::AudioDelta { audio }) => on_chunk(audio),
                Some(ChannelEvent::SessionFinished) => return Ok(()),
                Some(ChannelEvent::Error { message }) => {
                    return Err(SpeechError::Provider(message));
                }
                Some(ChannelEvent::TranscriptionCompleted { .. }) => continue,
                None => {
                    return Err(SpeechError::Transport(
                        "channel closed before synthesis finished".to_string(),
                    ));
                }
            }
        }
    })
    .await
    .map_err(|_| SpeechError::Timeout("synthesis"))?
}

/// Splits on char boundaries so multi-byte text cannot break a chunk.
fn char_chunks(text: &str, size: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == size {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}
