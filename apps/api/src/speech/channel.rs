//! Realtime channel abstraction over the provider's bidirectional event
//! stream, plus the websocket transport implementation.
//!
//! The provider speaks an event protocol: the client opens a socket, sends a
//! `session.update` configuration message, appends input, and receives named
//! events until the session finishes. `RealtimeChannel` narrows that to the
//! four events the bridge cares about, delivered through an internal queue
//! fed by a spawned read task.

use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use crate::speech::SpeechError;

// ────────────────────────────────────────────────────────────────────────────
// Seam types
// ────────────────────────────────────────────────────────────────────────────

/// Provider events the bridge consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    TranscriptionCompleted { transcript: String },
    AudioDelta { audio: Bytes },
    SessionFinished,
    Error { message: String },
}

/// What the opened session is for; drives the `session.update` payload.
#[derive(Debug, Clone)]
pub enum SessionMode {
    Transcription {
        language: String,
        sample_rate: u32,
        format: String,
    },
    Synthesis {
        voice: String,
    },
}

/// Everything needed to dial and configure one provider session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub mode: SessionMode,
}

/// One open streaming session. Input methods push to the provider; events
/// arrive through `next_event`, fed by the transport's read task.
#[async_trait]
pub trait RealtimeChannel: Send {
    async fn send_audio(&mut self, chunk: &[u8]) -> Result<(), SpeechError>;
    async fn send_text(&mut self, chunk: &str) -> Result<(), SpeechError>;
    async fn end_input(&mut self) -> Result<(), SpeechError>;
    /// Next provider event; `None` means the transport closed.
    async fn next_event(&mut self) -> Option<ChannelEvent>;
    async fn close(&mut self);
}

/// Opens channels. The bridge owns one connector; tests substitute a
/// scripted implementation.
#[async_trait]
pub trait RealtimeConnector: Send + Sync {
    async fn open(&self, config: SessionConfig) -> Result<Box<dyn RealtimeChannel>, SpeechError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Websocket transport
// ────────────────────────────────────────────────────────────────────────────

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

const EVENT_QUEUE_DEPTH: usize = 64;

/// Wire shape of provider events. Unknown types are ignored by the reader.
#[derive(Debug, Deserialize)]
struct ProviderEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    transcript: Option<String>,
    #[serde(default)]
    delta: Option<String>,
    #[serde(default)]
    error: Option<ProviderEventError>,
}

#[derive(Debug, Deserialize)]
struct ProviderEventError {
    #[serde(default)]
    message: String,
}

pub struct WsConnector;

#[async_trait]
impl RealtimeConnector for WsConnector {
    async fn open(&self, config: SessionConfig) -> Result<Box<dyn RealtimeChannel>, SpeechError> {
        let mut request = config
            .api_base
            .clone()
            .into_client_request()
            .map_err(|e| SpeechError::Transport(format!("invalid provider URL: {e}")))?;
        request.headers_mut().insert(
            "Authorization",
            format!("Bearer {}", config.api_key)
                .parse()
                .map_err(|e| SpeechError::Transport(format!("invalid API key header: {e}")))?,
        );

        let (stream, _) = connect_async(request)
            .await
            .map_err(|e| SpeechError::Transport(format!("websocket connect failed: {e}")))?;
        let (mut writer, reader) = stream.split();

        let session_update = match &config.mode {
            SessionMode::Transcription {
                language,
                sample_rate,
                format,
            } => json!({
                "type": "session.update",
                "session": {
                    "model": config.model,
                    "output_modalities": ["text"],
                    "input_audio_format": format,
                    "input_audio_transcription": {
                        "language": language,
                        "sample_rate": sample_rate,
                    },
                },
            }),
            SessionMode::Synthesis { voice } => json!({
                "type": "session.update",
                "session": {
                    "model": config.model,
                    "voice": voice,
                    "response_format": "pcm_24000hz_mono_16bit",
                    "mode": "server_commit",
                },
            }),
        };
        writer
            .send(Message::Text(session_update.to_string()))
            .await
            .map_err(|e| SpeechError::Transport(format!("session.update failed: {e}")))?;

        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let read_task = tokio::spawn(read_loop(reader, event_tx));

        Ok(Box::new(WsChannel {
            writer,
            events: event_rx,
            read_task,
        }))
    }
}

/// Parses incoming frames into `ChannelEvent`s until the socket closes or
/// the receiving side hangs up.
async fn read_loop(mut reader: WsSource, events: mpsc::Sender<ChannelEvent>) {
    while let Some(frame) = reader.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                let _ = events
                    .send(ChannelEvent::Error {
                        message: format!("transport error: {e}"),
                    })
                    .await;
                break;
            }
        };

        let event: ProviderEvent = match serde_json::from_str(&text) {
            Ok(event) => event,
            Err(e) => {
                warn!("Unparsable provider event, skipping: {e}");
                continue;
            }
        };

        let mapped = match event.event_type.as_str() {
            "conversation.item.input_audio_transcription.completed" => {
                Some(ChannelEvent::TranscriptionCompleted {
                    transcript: event.transcript.unwrap_or_default(),
                })
            }
            "response.audio.delta" => match event.delta.as_deref() {
                Some(delta) if !delta.is_empty() => {
                    match base64::engine::general_purpose::STANDARD.decode(delta) {
                        Ok(audio) => Some(ChannelEvent::AudioDelta {
                            audio: Bytes::from(audio),
                        }),
                        Err(e) => {
                            warn!("Undecodable audio delta, skipping: {e}");
                            None
                        }
                    }
                }
                _ => None,
            },
            "session.finished" => Some(ChannelEvent::SessionFinished),
            "error" => Some(ChannelEvent::Error {
                message: event
                    .error
                    .map(|e| e.message)
                    .unwrap_or_else(|| "Unknown error".to_string()),
            }),
            other => {
                debug!("Ignoring provider event type {other}");
                None
            }
        };

        if let Some(event) = mapped {
            if events.send(event).await.is_err() {
                break;
            }
        }
    }
}

struct WsChannel {
    writer: WsSink,
    events: mpsc::Receiver<ChannelEvent>,
    read_task: JoinHandle<()>,
}

impl WsChannel {
    async fn send_json(&mut self, payload: serde_json::Value) -> Result<(), SpeechError> {
        self.writer
            .send(Message::Text(payload.to_string()))
            .await
            .map_err(|e| SpeechError::Transport(format!("websocket send failed: {e}")))
    }
}

#[async_trait]
impl RealtimeChannel for WsChannel {
    async fn send_audio(&mut self, chunk: &[u8]) -> Result<(), SpeechError> {
        let audio = base64::engine::general_purpose::STANDARD.encode(chunk);
        self.send_json(json!({
            "type": "input_audio_buffer.append",
            "audio": audio,
        }))
        .await
    }

    async fn send_text(&mut self, chunk: &str) -> Result<(), SpeechError> {
        self.send_json(json!({
            "type": "input_text_buffer.append",
            "text": chunk,
        }))
        .await
    }

    async fn end_input(&mut self) -> Result<(), SpeechError> {
        self.send_json(json!({ "type": "session.finish" })).await
    }

    async fn next_event(&mut self) -> Option<ChannelEvent> {
        self.events.recv().await
    }

    async fn close(&mut self) {
        let _ = self.writer.send(Message::Close(None)).await;
        let _ = self.writer.close().await;
        self.read_task.abort();
    }
}
