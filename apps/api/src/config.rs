use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// AI credentials are optional: the evaluation and reporting paths degrade to
/// rule-based fallbacks without them, and the speech endpoints report the
/// capability as unavailable.
#[derive(Debug, Clone)]
pub struct Config {
    /// DashScope key used for chat-completion calls.
    pub llm_api_key: Option<String>,
    pub llm_api_base: String,
    pub llm_model: String,

    /// ASR key; falls back to `llm_api_key` when unset.
    pub asr_api_key: Option<String>,
    pub asr_api_base: String,
    pub asr_model: String,

    /// TTS key; falls back to `llm_api_key` when unset.
    pub tts_api_key: Option<String>,
    pub tts_api_base: String,
    pub tts_model: String,
    pub tts_voice: String,

    /// Path to the question corpus JSON file.
    pub questions_path: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            llm_api_key: optional_env("DASHSCOPE_API_KEY"),
            llm_api_base: std::env::var("LLM_API_BASE").unwrap_or_else(|_| {
                "https://dashscope.aliyuncs.com/compatible-mode/v1".to_string()
            }),
            llm_model: std::env::var("LLM_MODEL").unwrap_or_else(|_| "deepseek-v3".to_string()),

            asr_api_key: optional_env("ASR_API_KEY"),
            asr_api_base: std::env::var("ASR_API_BASE").unwrap_or_else(|_| {
                "wss://dashscope.aliyuncs.com/api-ws/v1/realtime".to_string()
            }),
            asr_model: std::env::var("ASR_MODEL")
                .unwrap_or_else(|_| "qwen3-asr-flash-realtime".to_string()),

            tts_api_key: optional_env("TTS_API_KEY"),
            tts_api_base: std::env::var("TTS_API_BASE").unwrap_or_else(|_| {
                "wss://dashscope.aliyuncs.com/api-ws/v1/realtime".to_string()
            }),
            tts_model: std::env::var("TTS_MODEL")
                .unwrap_or_else(|_| "qwen3-tts-flash-realtime".to_string()),
            tts_voice: std::env::var("TTS_VOICE").unwrap_or_else(|_| "Maia".to_string()),

            questions_path: std::env::var("QUESTIONS_PATH")
                .unwrap_or_else(|_| "data/questions.json".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Key for ASR calls: service-specific key first, then the shared LLM key.
    pub fn asr_key(&self) -> Option<&str> {
        self.asr_api_key.as_deref().or(self.llm_api_key.as_deref())
    }

    /// Key for TTS calls: service-specific key first, then the shared LLM key.
    pub fn tts_key(&self) -> Option<&str> {
        self.tts_api_key.as_deref().or(self.llm_api_key.as_deref())
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_config() -> Config {
        Config {
            llm_api_key: None,
            llm_api_base: String::new(),
            llm_model: String::new(),
            asr_api_key: None,
            asr_api_base: String::new(),
            asr_model: String::new(),
            tts_api_key: None,
            tts_api_base: String::new(),
            tts_model: String::new(),
            tts_voice: String::new(),
            questions_path: String::new(),
            port: 8000,
            rust_log: "info".to_string(),
        }
    }

    #[test]
    fn test_asr_key_falls_back_to_llm_key() {
        let config = Config {
            llm_api_key: Some("shared".to_string()),
            ..bare_config()
        };
        assert_eq!(config.asr_key(), Some("shared"));
        assert_eq!(config.tts_key(), Some("shared"));
    }

    #[test]
    fn test_service_key_wins_over_fallback() {
        let config = Config {
            llm_api_key: Some("shared".to_string()),
            tts_api_key: Some("tts-own".to_string()),
            ..bare_config()
        };
        assert_eq!(config.tts_key(), Some("tts-own"));
    }

    #[test]
    fn test_no_keys_means_no_capability() {
        let config = bare_config();
        assert_eq!(config.asr_key(), None);
        assert_eq!(config.tts_key(), None);
    }
}
