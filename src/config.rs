//! Voice layer configuration.
//!
//! All tunables the orchestrator needs in one place: the synthesis deadline,
//! the speech character budget, the recognizer language hint, the reserved
//! control tokens, and the acknowledgement texts for toggle turns. Defaults
//! match the production deployment (Cantonese assistant, 50 s TTS budget).

use crate::control::ControlTokens;
use std::time::Duration;

/// Configuration for the response orchestration layer.
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Hard wall-clock deadline for one synthesis call (default: 50 s).
    pub timeout: Duration,

    /// Character budget for text handed to the synthesizer; text beyond this
    /// is truncated for the audio channel only. 0 means unlimited.
    /// (default: 80)
    pub truncation_limit: usize,

    /// Language hint passed to the recognizer (default: "yue", Cantonese).
    pub default_language: String,

    /// Reserved tokens that toggle voice output.
    pub tokens: ControlTokens,

    /// Display text for a turn that enabled voice output.
    pub enable_ack: String,

    /// Display text for a turn that disabled voice output.
    pub disable_ack: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(50),
            truncation_limit: 80,
            default_language: "yue".to_string(),
            tokens: ControlTokens::default(),
            enable_ack: "Voice output enabled.".to_string(),
            disable_ack: "Voice output disabled.".to_string(),
        }
    }
}

impl VoiceConfig {
    /// Build from environment: `VOX_SYNTH_TIMEOUT_SECS`, `VOX_SPEECH_CHAR_LIMIT`,
    /// `VOX_DEFAULT_LANGUAGE`. Unset or unparsable values fall back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(secs) = std::env::var("VOX_SYNTH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(limit) = std::env::var("VOX_SPEECH_CHAR_LIMIT")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
        {
            config.truncation_limit = limit;
        }
        if let Ok(lang) = std::env::var("VOX_DEFAULT_LANGUAGE") {
            if !lang.trim().is_empty() {
                config.default_language = lang.trim().to_string();
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production() {
        let config = VoiceConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(50));
        assert_eq!(config.truncation_limit, 80);
        assert_eq!(config.default_language, "yue");
        assert!(!config.enable_ack.is_empty());
        assert!(!config.disable_ack.is_empty());
    }
}
