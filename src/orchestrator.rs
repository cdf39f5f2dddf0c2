//! **Response orchestrator** — decide what each turn delivers.
//!
//! For every outgoing turn: detect control tokens, consult the persisted
//! toggle, budget the speech text, run the guarded synthesis, and assemble a
//! [`ResponseResult`]. Audio is strictly best-effort: the user always gets the
//! full text, and no synthesis failure or timeout ever fails the turn.

use crate::budget;
use crate::config::VoiceConfig;
use crate::control::{ControlParser, ControlSignal};
use crate::error::{VoiceError, VoiceResult};
use crate::guard::{SynthesisGuard, SynthesisOutcome};
use crate::stt::Recognizer;
use crate::toggle::VoiceOutputState;
use crate::tts::{AudioArtifact, Synthesizer};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// What a control-signal turn did, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    None,
    VoiceEnabled,
    VoiceDisabled,
}

/// Everything the delivery channel needs for one outgoing turn.
///
/// `display_text` is always the full, untruncated text; `audio_text` is what
/// was handed to the synthesizer (shortened when `truncated` is set). The two
/// are computed independently from the same source — this layer never shortens
/// the display channel.
///
/// Serializable so a transport layer can ship it as-is.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseResult {
    pub success: bool,
    pub display_text: String,
    /// Present iff synthesis succeeded.
    pub audio: Option<AudioArtifact>,
    /// The text given to the synthesizer, when a synthesis was attempted.
    pub audio_text: Option<String>,
    pub timed_out: bool,
    pub truncated: bool,
    pub action: ControlAction,
}

impl ResponseResult {
    fn text_only(display_text: String) -> Self {
        Self {
            success: true,
            display_text,
            audio: None,
            audio_text: None,
            timed_out: false,
            truncated: false,
            action: ControlAction::None,
        }
    }
}

/// Result of running one incoming voice message through the recognizer and
/// the control parser. A spoken control token toggles voice output exactly
/// like a typed one and yields empty pass-through text.
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscribeResult {
    /// Recognized text to hand to the agent; empty for pure control turns.
    pub text: String,
    pub confidence: Option<f32>,
    pub duration: Option<Duration>,
    pub action: ControlAction,
    /// Toggle state after any control action was applied.
    pub voice_enabled: bool,
}

/// The façade composing parser, toggle, budget and guard. One instance per
/// session; turns for a session are expected to be processed sequentially.
pub struct ResponseOrchestrator {
    config: VoiceConfig,
    parser: ControlParser,
    toggle: VoiceOutputState,
    guard: SynthesisGuard,
    synthesizer: Arc<dyn Synthesizer>,
    recognizer: Option<Arc<dyn Recognizer>>,
}

impl ResponseOrchestrator {
    /// Create an orchestrator with its toggle persisted at `state_path`.
    pub fn new(
        config: VoiceConfig,
        state_path: impl Into<PathBuf>,
        synthesizer: Arc<dyn Synthesizer>,
    ) -> Self {
        let parser = ControlParser::new(config.tokens.clone());
        let guard = SynthesisGuard::new(config.timeout);
        let toggle = VoiceOutputState::open(state_path);
        Self {
            config,
            parser,
            toggle,
            guard,
            synthesizer,
            recognizer: None,
        }
    }

    /// Attach a recognizer so [`transcribe`](Self::transcribe) works.
    pub fn with_recognizer(mut self, recognizer: Arc<dyn Recognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Whether voice output is currently on.
    pub fn voice_enabled(&self) -> bool {
        self.toggle.get()
    }

    /// Human-readable toggle status.
    pub fn voice_status(&self) -> String {
        self.toggle.status_line()
    }

    /// Handle one outgoing turn.
    ///
    /// A standalone control token toggles voice output and returns an
    /// acknowledgement turn. Anything else is text to deliver: when the
    /// toggle is off the result is text-only; when it is on, a budgeted,
    /// deadline-guarded synthesis attempt decorates the text with audio.
    /// The only hard failure is empty input.
    pub async fn respond(&self, text: &str) -> VoiceResult<ResponseResult> {
        match self.parser.parse(text) {
            ControlSignal::Enable => return Ok(self.apply_toggle(true).await),
            ControlSignal::Disable => return Ok(self.apply_toggle(false).await),
            ControlSignal::None => {}
        }

        if text.trim().is_empty() {
            return Err(VoiceError::InvalidInput(
                "no text to respond with".to_string(),
            ));
        }

        if !self.toggle.get() {
            debug!("Voice output disabled; delivering text only");
            return Ok(ResponseResult::text_only(text.to_string()));
        }

        Ok(self.speak(text, ControlAction::None).await)
    }

    /// Synthesize regardless of the toggle (still budgeted and guarded).
    /// For callers that must speak — e.g. an explicit "read this aloud".
    pub async fn speak_now(&self, text: &str) -> VoiceResult<ResponseResult> {
        if text.trim().is_empty() {
            return Err(VoiceError::InvalidInput(
                "no text to respond with".to_string(),
            ));
        }
        Ok(self.speak(text, ControlAction::None).await)
    }

    /// Run one incoming voice message: recognize, then apply any spoken
    /// control token. Recognition errors propagate — unlike synthesis, the
    /// turn cannot proceed without text.
    pub fn transcribe(&self, audio: &[u8]) -> VoiceResult<TranscribeResult> {
        let recognizer = self
            .recognizer
            .as_ref()
            .ok_or_else(|| VoiceError::Config("no recognizer configured".to_string()))?;
        let transcription = recognizer.recognize(audio, &self.config.default_language)?;

        let action = match self.parser.parse(&transcription.text) {
            ControlSignal::Enable => {
                info!("Spoken control token: enabling voice output");
                self.toggle.set(true);
                ControlAction::VoiceEnabled
            }
            ControlSignal::Disable => {
                info!("Spoken control token: disabling voice output");
                self.toggle.set(false);
                ControlAction::VoiceDisabled
            }
            ControlSignal::None => ControlAction::None,
        };

        // A pure control utterance carries no conversational content
        let text = if action == ControlAction::None {
            transcription.text
        } else {
            String::new()
        };

        Ok(TranscribeResult {
            text,
            confidence: transcription.confidence,
            duration: transcription.duration,
            action,
            voice_enabled: self.toggle.get(),
        })
    }

    /// Execute a toggle turn and build its acknowledgement. When voice just
    /// became enabled, a spoken confirmation is attempted through the same
    /// pipeline; its failure never fails the toggle.
    async fn apply_toggle(&self, enable: bool) -> ResponseResult {
        self.toggle.set(enable);
        info!("{}", self.toggle.status_line());

        let (ack, action) = if enable {
            (self.config.enable_ack.clone(), ControlAction::VoiceEnabled)
        } else {
            (self.config.disable_ack.clone(), ControlAction::VoiceDisabled)
        };

        if enable {
            let mut result = self.speak(&ack, action).await;
            // Audio on the ack is a courtesy; the toggle already committed
            result.success = true;
            result
        } else {
            ResponseResult {
                action,
                ..ResponseResult::text_only(ack)
            }
        }
    }

    /// Budget, guard, assemble. `display_text` is always the full input;
    /// every audio-path failure is absorbed into the diagnostic flags.
    async fn speak(&self, text: &str, action: ControlAction) -> ResponseResult {
        let (spoken, truncated) = budget::apply(text, self.config.truncation_limit);
        if truncated {
            debug!(
                "Speech text budgeted to {} chars (display keeps {})",
                self.config.truncation_limit,
                text.chars().count()
            );
        }

        let outcome = self.guard.run(Arc::clone(&self.synthesizer), &spoken).await;
        let timed_out = outcome.timed_out();

        ResponseResult {
            success: true,
            display_text: text.to_string(),
            audio: outcome.into_artifact(),
            audio_text: Some(spoken),
            timed_out,
            truncated,
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tts::PlaceholderSynthesizer;
    use tempfile::tempdir;

    fn orchestrator(dir: &tempfile::TempDir) -> ResponseOrchestrator {
        ResponseOrchestrator::new(
            VoiceConfig::default(),
            dir.path().join("toggle.json"),
            Arc::new(PlaceholderSynthesizer),
        )
    }

    #[tokio::test]
    async fn empty_input_is_the_only_hard_failure() {
        let dir = tempdir().unwrap();
        let orch = orchestrator(&dir);
        assert!(matches!(
            orch.respond("   ").await,
            Err(VoiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn disabled_toggle_skips_synthesis() {
        let dir = tempdir().unwrap();
        let orch = orchestrator(&dir);
        let result = orch.respond("你好").await.unwrap();
        assert!(result.success);
        assert_eq!(result.display_text, "你好");
        assert!(result.audio.is_none());
        assert!(result.audio_text.is_none());
        assert_eq!(result.action, ControlAction::None);
    }

    #[tokio::test]
    async fn speak_now_bypasses_toggle() {
        let dir = tempdir().unwrap();
        let orch = orchestrator(&dir);
        assert!(!orch.voice_enabled());
        let result = orch.speak_now("讀出嚟").await.unwrap();
        assert!(result.audio.is_some());
        assert_eq!(result.audio_text.as_deref(), Some("讀出嚟"));
    }

    #[tokio::test]
    async fn transcribe_requires_a_recognizer() {
        let dir = tempdir().unwrap();
        let orch = orchestrator(&dir);
        assert!(matches!(
            orch.transcribe(&[1, 2, 3]),
            Err(VoiceError::Config(_))
        ));
    }
}
