//! **Voice output toggle** — the one piece of state that outlives a turn.
//!
//! A per-session JSON record `{enabled, last_updated}` controlling whether
//! synthesis is attempted. Reads come from the in-memory copy under a mutex;
//! writes go to disk via write-then-rename so a concurrent reader of the file
//! never sees a half-written record. A missing or corrupt file fails closed:
//! voice output starts disabled and the anomaly is logged, never raised.

use crate::error::{VoiceError, VoiceResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ToggleRecord {
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
}

/// Persisted enable/disable flag for voice output, one instance per session.
pub struct VoiceOutputState {
    path: PathBuf,
    record: Mutex<ToggleRecord>,
}

impl VoiceOutputState {
    /// Open the toggle backed by `path`. First use (no file yet) starts
    /// disabled; an unreadable or corrupt file also starts disabled.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let record = Self::load(&path);
        Self {
            path,
            record: Mutex::new(record),
        }
    }

    fn load(path: &Path) -> ToggleRecord {
        if !path.exists() {
            return ToggleRecord::default();
        }
        match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Toggle state at {} is corrupt ({}); failing closed", path.display(), e);
                    ToggleRecord::default()
                }
            },
            Err(e) => {
                warn!("Toggle state at {} unreadable ({}); failing closed", path.display(), e);
                ToggleRecord::default()
            }
        }
    }

    /// Current flag. Never errors: store problems were already absorbed at
    /// load time and reads hit the in-memory copy.
    pub fn get(&self) -> bool {
        self.lock().enabled
    }

    /// When the flag last changed, if it ever has.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.lock().last_updated
    }

    /// Set the flag. Idempotent: setting the current value neither rewrites
    /// the file nor touches `last_updated`. A persist failure is logged and
    /// the in-memory flag still changes, so the session keeps working.
    pub fn set(&self, enabled: bool) {
        let mut record = self.lock();
        if record.enabled == enabled {
            return;
        }
        self.commit(&mut record, enabled);
    }

    /// Flip the flag and return the new value. Read and write happen under
    /// one lock acquisition, so concurrent flips never collapse into one.
    pub fn toggle(&self) -> bool {
        let mut record = self.lock();
        let next = !record.enabled;
        self.commit(&mut record, next);
        next
    }

    /// Human-readable status, for logs and the status command.
    pub fn status_line(&self) -> String {
        let state = if self.get() { "enabled" } else { "disabled" };
        format!("voice output: {state}")
    }

    /// Apply a committed change to the held record and persist it. A persist
    /// failure is logged and the in-memory flag still changes, so the
    /// session keeps working.
    fn commit(&self, record: &mut ToggleRecord, enabled: bool) {
        record.enabled = enabled;
        record.last_updated = Some(Utc::now());
        if let Err(e) = self.persist(record) {
            warn!("Failed to persist voice toggle ({}); state is in-memory only", e);
        } else {
            debug!("Voice output toggle persisted: enabled={}", enabled);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ToggleRecord> {
        // A poisoned lock means a panic mid-update; the record itself is
        // always internally consistent, so keep serving it.
        self.record.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Write the record to a sibling temp file, then rename over the real
    /// path. Rename is atomic on the same filesystem, so readers of the file
    /// see either the old record or the new one, never a torn write.
    fn persist(&self, record: &ToggleRecord) -> VoiceResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(record)
            .map_err(|e| VoiceError::StateStore(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn starts_disabled_on_first_use() {
        let dir = tempdir().unwrap();
        let state = VoiceOutputState::open(dir.path().join("toggle.json"));
        assert!(!state.get());
        assert!(state.last_updated().is_none());
    }

    #[test]
    fn set_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("toggle.json");

        let state = VoiceOutputState::open(&path);
        state.set(true);
        assert!(state.get());
        assert!(state.last_updated().is_some());

        let reopened = VoiceOutputState::open(&path);
        assert!(reopened.get());
    }

    #[test]
    fn set_is_idempotent() {
        let dir = tempdir().unwrap();
        let state = VoiceOutputState::open(dir.path().join("toggle.json"));
        state.set(true);
        let first = state.last_updated();
        state.set(true);
        assert!(state.get());
        assert_eq!(state.last_updated(), first);
    }

    #[test]
    fn toggle_round_trip_restores_value() {
        let dir = tempdir().unwrap();
        let state = VoiceOutputState::open(dir.path().join("toggle.json"));
        let original = state.get();
        assert_ne!(state.toggle(), original);
        assert_eq!(state.toggle(), original);
        assert_eq!(state.get(), original);
    }

    #[test]
    fn concurrent_flips_never_collapse() {
        let dir = tempdir().unwrap();
        let state = VoiceOutputState::open(dir.path().join("toggle.json"));

        // An even total of flips from any interleaving must restore the
        // original value
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..25 {
                        state.toggle();
                    }
                });
            }
        });
        assert!(!state.get());
    }

    #[test]
    fn corrupt_file_fails_closed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("toggle.json");
        fs::write(&path, "{not json at all").unwrap();

        let state = VoiceOutputState::open(&path);
        assert!(!state.get());

        // Still usable after the bad load
        state.set(true);
        assert!(state.get());
        assert!(VoiceOutputState::open(&path).get());
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("toggle.json");
        let state = VoiceOutputState::open(&path);
        state.set(true);
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn status_line_tracks_state() {
        let dir = tempdir().unwrap();
        let state = VoiceOutputState::open(dir.path().join("toggle.json"));
        assert_eq!(state.status_line(), "voice output: disabled");
        state.set(true);
        assert_eq!(state.status_line(), "voice output: enabled");
    }
}
