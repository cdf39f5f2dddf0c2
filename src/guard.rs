//! **Synthesis guard** — the one place the pipeline may wait on a model.
//!
//! Runs a single [`Synthesizer`] call on the blocking pool and races it
//! against a timer. On timeout the wait is abandoned: the caller is released
//! within the deadline plus scheduling overhead, while the underlying call is
//! left to finish on its pool thread and its result is discarded.

use crate::error::VoiceError;
use crate::tts::{AudioArtifact, Synthesizer};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// What one guarded synthesis attempt produced.
#[derive(Debug)]
pub enum SynthesisOutcome {
    /// The model finished within the deadline.
    Completed {
        artifact: AudioArtifact,
        elapsed: Duration,
    },
    /// The deadline passed first; the wait was abandoned.
    TimedOut { waited: Duration },
    /// The model reported an error before the deadline.
    Failed { error: String, elapsed: Duration },
}

impl SynthesisOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, SynthesisOutcome::Completed { .. })
    }

    pub fn timed_out(&self) -> bool {
        matches!(self, SynthesisOutcome::TimedOut { .. })
    }

    /// The artifact, if synthesis completed.
    pub fn into_artifact(self) -> Option<AudioArtifact> {
        match self {
            SynthesisOutcome::Completed { artifact, .. } => Some(artifact),
            _ => None,
        }
    }
}

/// Wraps every synthesizer call with a hard wall-clock deadline.
#[derive(Debug, Clone)]
pub struct SynthesisGuard {
    timeout: Duration,
}

impl SynthesisGuard {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Invoke the synthesizer exactly once, bounded by the configured
    /// deadline. Never returns an error: failures and timeouts come back as
    /// outcome variants so the caller can keep the text channel alive.
    pub async fn run(&self, synthesizer: Arc<dyn Synthesizer>, text: &str) -> SynthesisOutcome {
        let started = Instant::now();
        let owned = text.to_string();
        let job = tokio::task::spawn_blocking(move || synthesizer.synthesize(&owned));

        match tokio::time::timeout(self.timeout, job).await {
            Ok(Ok(Ok(artifact))) => {
                let elapsed = started.elapsed();
                debug!(
                    "Synthesis completed in {:.2}s ({} bytes)",
                    elapsed.as_secs_f32(),
                    artifact.bytes.len()
                );
                SynthesisOutcome::Completed { artifact, elapsed }
            }
            Ok(Ok(Err(e))) => {
                let elapsed = started.elapsed();
                warn!("Synthesis failed after {:.2}s: {}", elapsed.as_secs_f32(), e);
                SynthesisOutcome::Failed {
                    error: e.to_string(),
                    elapsed,
                }
            }
            Ok(Err(join_err)) => {
                let elapsed = started.elapsed();
                let error = VoiceError::Synthesis(format!("synthesis task aborted: {join_err}"));
                warn!("{error}");
                SynthesisOutcome::Failed {
                    error: error.to_string(),
                    elapsed,
                }
            }
            Err(_) => {
                let waited = started.elapsed();
                warn!(
                    "Synthesis exceeded {:.1}s deadline; abandoning wait and discarding result",
                    self.timeout.as_secs_f32()
                );
                SynthesisOutcome::TimedOut { waited }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VoiceResult;
    use crate::tts::PlaceholderSynthesizer;

    struct SlowSynth(Duration);

    impl Synthesizer for SlowSynth {
        fn synthesize(&self, _text: &str) -> VoiceResult<AudioArtifact> {
            std::thread::sleep(self.0);
            Ok(AudioArtifact {
                bytes: vec![0u8; 4],
                format: "wav".to_string(),
                duration: None,
            })
        }
    }

    struct FailingSynth;

    impl Synthesizer for FailingSynth {
        fn synthesize(&self, _text: &str) -> VoiceResult<AudioArtifact> {
            Err(VoiceError::Synthesis("model exploded".to_string()))
        }
    }

    #[tokio::test]
    async fn fast_call_completes() {
        let guard = SynthesisGuard::new(Duration::from_secs(5));
        let outcome = guard.run(Arc::new(PlaceholderSynthesizer), "hi").await;
        assert!(outcome.succeeded());
        assert!(outcome.into_artifact().is_some());
    }

    #[tokio::test]
    async fn slow_call_times_out_within_bound() {
        let guard = SynthesisGuard::new(Duration::from_millis(50));
        let started = Instant::now();
        let outcome = guard
            .run(Arc::new(SlowSynth(Duration::from_secs(2))), "hi")
            .await;
        assert!(outcome.timed_out());
        // Released well before the synthesizer's 2s sleep finishes
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn backend_error_is_reported_not_raised() {
        let guard = SynthesisGuard::new(Duration::from_secs(5));
        let outcome = guard.run(Arc::new(FailingSynth), "hi").await;
        assert!(!outcome.succeeded());
        assert!(!outcome.timed_out());
        match outcome {
            SynthesisOutcome::Failed { error, .. } => assert!(error.contains("model exploded")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
