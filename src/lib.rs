//! # Voxbridge — voice response orchestration
//!
//! Brokers voice-enabled turns between a text-first conversational agent and
//! two external speech models (a recognizer and a synthesizer). The agent
//! produces text; this crate decides whether that text also gets audio, bounds
//! the time spent synthesizing it, and keeps a persisted per-session toggle —
//! while guaranteeing the user always receives the complete text.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                  Response Orchestrator                      │
//! │  ┌───────────┐  ┌──────────────┐  ┌──────────────────┐    │
//! │  │  Control  │→ │ Voice Toggle │→ │   Text Budget    │    │
//! │  │  Parser   │  │ (JSON file)  │  │  (audio only)    │    │
//! │  └───────────┘  └──────────────┘  └──────────────────┘    │
//! │                                            ↓               │
//! │  ┌──────────────┐              ┌──────────────────────┐   │
//! │  │   Delivery   │←─────────────│   Synthesis Guard    │   │
//! │  │ (text+audio) │   artifact   │  (hard deadline)     │   │
//! │  └──────────────┘              └──────────────────────┘   │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Audio is best-effort: synthesis timeouts and failures surface as flags on
//! [`ResponseResult`], never as failed turns.

pub mod budget;
pub mod config;
pub mod control;
pub mod error;
pub mod guard;
pub mod orchestrator;
pub mod stt;
pub mod toggle;
pub mod tts;

pub use config::VoiceConfig;
pub use control::{ControlParser, ControlSignal, ControlTokens};
pub use error::{VoiceError, VoiceResult};
pub use guard::{SynthesisGuard, SynthesisOutcome};
pub use orchestrator::{ControlAction, ResponseOrchestrator, ResponseResult, TranscribeResult};
pub use stt::{HttpRecognizer, PlaceholderRecognizer, Recognizer, Transcription};
pub use toggle::VoiceOutputState;
pub use tts::{AudioArtifact, HttpSynthesizer, PlaceholderSynthesizer, Synthesizer};
