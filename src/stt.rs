//! **Recognizer backends** — turn captured audio into text.
//!
//! Implement [`Recognizer`] for any speech-to-text model. The orchestrator
//! treats the incoming audio as opaque bytes in whatever container the chat
//! transport delivered (ogg, wav, ...); format handling belongs to the
//! backend. Production binding is an OpenAI-compatible `/audio/transcriptions`
//! endpoint; [`PlaceholderRecognizer`] keeps the loop runnable without a model.

use crate::error::{VoiceError, VoiceResult};
use std::time::Duration;

/// One recognition result.
#[derive(Debug, Clone)]
pub struct Transcription {
    /// Recognized text, trimmed. Empty if nothing was detected.
    pub text: String,
    /// Model confidence, when the backend reports one.
    pub confidence: Option<f32>,
    /// Audio length, when the backend reports it.
    pub duration: Option<Duration>,
}

/// Backend for converting audio bytes to text.
pub trait Recognizer: Send + Sync {
    /// Transcribe one utterance. `language_hint` is a BCP-47-ish code the
    /// model may use to bias decoding (e.g. "yue"); backends may ignore it.
    fn recognize(&self, audio: &[u8], language_hint: &str) -> VoiceResult<Transcription>;
}

/// Placeholder recognizer: returns a fixed string. Use for testing the turn
/// flow without a speech model.
#[derive(Debug, Default)]
pub struct PlaceholderRecognizer {
    /// If set, return this instead of the default message.
    pub response: Option<String>,
}

impl PlaceholderRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(s: String) -> Self {
        Self { response: Some(s) }
    }
}

impl Recognizer for PlaceholderRecognizer {
    fn recognize(&self, audio: &[u8], _language_hint: &str) -> VoiceResult<Transcription> {
        let text = match self.response {
            Some(ref r) => r.clone(),
            None => format!("[recognizer placeholder: {} bytes]", audio.len()),
        };
        Ok(Transcription {
            text,
            confidence: None,
            duration: None,
        })
    }
}

/// Production recognizer: OpenAI-compatible transcription API (Whisper-style).
#[derive(Debug, Clone)]
pub struct HttpRecognizer {
    /// Base URL without trailing slash (e.g. https://api.openai.com/v1).
    pub base_url: String,
    /// Bearer API key.
    pub api_key: String,
    /// Model: whisper-1, gpt-4o-transcribe, etc.
    pub model: String,
    client: reqwest::blocking::Client,
}

impl HttpRecognizer {
    /// Build from environment: `VOX_STT_API_URL`, `VOX_STT_API_KEY`,
    /// `VOX_STT_MODEL` (default whisper-1).
    pub fn from_env() -> VoiceResult<Self> {
        let base_url = std::env::var("VOX_STT_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let api_key = std::env::var("VOX_STT_API_KEY")
            .map_err(|_| VoiceError::Config("STT requires VOX_STT_API_KEY".to_string()))?;
        let model = std::env::var("VOX_STT_MODEL").unwrap_or_else(|_| "whisper-1".to_string());
        Self::new(base_url, api_key, model)
    }

    /// Create with explicit config.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> VoiceResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| VoiceError::Recognition(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        })
    }
}

impl Recognizer for HttpRecognizer {
    fn recognize(&self, audio: &[u8], language_hint: &str) -> VoiceResult<Transcription> {
        if audio.is_empty() {
            return Err(VoiceError::Recognition("empty audio".to_string()));
        }
        let url = format!(
            "{}/audio/transcriptions",
            self.base_url.trim_end_matches('/')
        );
        let part = reqwest::blocking::multipart::Part::bytes(audio.to_vec())
            .file_name("audio.ogg")
            .mime_str("application/octet-stream")
            .map_err(|e| VoiceError::Recognition(e.to_string()))?;
        let mut form = reqwest::blocking::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json");
        if !language_hint.trim().is_empty() {
            form = form.text("language", language_hint.trim().to_string());
        }
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .map_err(|e| VoiceError::Recognition(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().unwrap_or_default();
            return Err(VoiceError::Recognition(format!(
                "STT API error {status}: {body}"
            )));
        }
        let json: serde_json::Value = res
            .json()
            .map_err(|e| VoiceError::Recognition(e.to_string()))?;
        let text = json
            .get("text")
            .and_then(|t| t.as_str())
            .unwrap_or("")
            .trim()
            .to_string();
        let duration = json
            .get("duration")
            .and_then(|d| d.as_f64())
            .map(Duration::from_secs_f64);
        Ok(Transcription {
            text,
            confidence: None,
            duration,
        })
    }
}
