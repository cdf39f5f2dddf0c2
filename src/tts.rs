//! **Synthesizer backends** — turn text into an opaque audio artifact.
//!
//! Implement [`Synthesizer`] for any speech model. The orchestrator never
//! looks inside the artifact; it only forwards bytes, format tag and duration
//! to the delivery channel. Production binding is an OpenAI-compatible
//! `/audio/speech` endpoint; [`PlaceholderSynthesizer`] keeps the pipeline
//! runnable without any model or API key.

use crate::error::{VoiceError, VoiceResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One synthesized reply: opaque bytes plus enough metadata for delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioArtifact {
    /// Encoded audio; the container format is whatever the backend produced.
    pub bytes: Vec<u8>,
    /// Format tag for the delivery channel (e.g. "mp3", "wav").
    pub format: String,
    /// Audio length, when the backend knows it.
    pub duration: Option<Duration>,
}

/// Backend that turns text into audio bytes. Implement for a local model or
/// a remote speech API. Calls may take unbounded time; the orchestrator wraps
/// every call in [`crate::guard::SynthesisGuard`].
pub trait Synthesizer: Send + Sync {
    /// Synthesize one reply. Must invoke the underlying model exactly once.
    fn synthesize(&self, text: &str) -> VoiceResult<AudioArtifact>;
}

/// Placeholder synthesizer: returns an empty artifact immediately. Use for
/// wiring and tests where no speech model is available.
#[derive(Debug, Default)]
pub struct PlaceholderSynthesizer;

impl Synthesizer for PlaceholderSynthesizer {
    fn synthesize(&self, _text: &str) -> VoiceResult<AudioArtifact> {
        Ok(AudioArtifact {
            bytes: Vec::new(),
            format: "none".to_string(),
            duration: Some(Duration::ZERO),
        })
    }
}

/// Production synthesizer: OpenAI-compatible speech API (OpenAI, OpenRouter,
/// or a self-hosted gateway in front of a local model).
#[derive(Debug, Clone)]
pub struct HttpSynthesizer {
    /// Base URL without trailing slash (e.g. https://api.openai.com/v1).
    pub base_url: String,
    /// Bearer API key.
    pub api_key: String,
    /// TTS model identifier (e.g. tts-1).
    pub model: String,
    /// Voice name understood by the endpoint.
    pub voice: String,
    /// Cap on one HTTP round trip. The orchestrator's guard bounds how long
    /// a turn *waits*; this bounds how long an abandoned call can pin its
    /// pool thread and socket when the endpoint hangs.
    pub request_timeout: Duration,
    client: reqwest::blocking::Client,
}

/// Map the endpoint's Content-Type to a format tag for the delivery channel.
fn format_from_content_type(content_type: Option<&str>) -> Option<&'static str> {
    match content_type?.split(';').next()?.trim() {
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/wav" | "audio/x-wav" | "audio/wave" => Some("wav"),
        "audio/ogg" => Some("ogg"),
        "audio/opus" => Some("opus"),
        "audio/aac" => Some("aac"),
        "audio/flac" => Some("flac"),
        _ => None,
    }
}

impl HttpSynthesizer {
    /// Default cap on one HTTP round trip.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Build from environment: `VOX_TTS_API_URL`, `VOX_TTS_API_KEY`,
    /// `VOX_TTS_MODEL` (default tts-1), `VOX_TTS_VOICE` (default alloy).
    pub fn from_env() -> VoiceResult<Self> {
        let base_url = std::env::var("VOX_TTS_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let api_key = std::env::var("VOX_TTS_API_KEY")
            .map_err(|_| VoiceError::Config("TTS requires VOX_TTS_API_KEY".to_string()))?;
        let model = std::env::var("VOX_TTS_MODEL").unwrap_or_else(|_| "tts-1".to_string());
        let voice = std::env::var("VOX_TTS_VOICE").unwrap_or_else(|_| "alloy".to_string());
        Self::new(base_url, api_key, model, voice)
    }

    /// Create with explicit config (e.g. for tests or non-env wiring).
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        voice: impl Into<String>,
    ) -> VoiceResult<Self> {
        Self::with_request_timeout(base_url, api_key, model, voice, Self::DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create with an explicit HTTP round-trip cap (e.g. guard deadline plus
    /// a margin).
    pub fn with_request_timeout(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        voice: impl Into<String>,
        request_timeout: Duration,
    ) -> VoiceResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| VoiceError::Synthesis(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            voice: voice.into(),
            request_timeout,
            client,
        })
    }
}

impl Synthesizer for HttpSynthesizer {
    fn synthesize(&self, text: &str) -> VoiceResult<AudioArtifact> {
        let text = text.trim();
        if text.is_empty() {
            return Err(VoiceError::Synthesis("empty text".to_string()));
        }
        let url = format!("{}/audio/speech", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": self.model,
            "input": text,
            "voice": self.voice,
            "response_format": "mp3",
        });
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| VoiceError::Synthesis(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().unwrap_or_default();
            return Err(VoiceError::Synthesis(format!("TTS API error {status}: {body}")));
        }
        // Trust the Content-Type when the endpoint sets a recognizable one;
        // otherwise assume the format we asked for
        let format = res
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|ct| format_from_content_type(Some(ct)))
            .unwrap_or("mp3")
            .to_string();
        let bytes = res
            .bytes()
            .map_err(|e| VoiceError::Synthesis(e.to_string()))?
            .to_vec();
        Ok(AudioArtifact {
            bytes,
            format,
            duration: None,
        })
    }
}
