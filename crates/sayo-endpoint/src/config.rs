use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Thresholds and timeouts driving endpoint decisions. All values are
/// injected; the defaults match the reference tuning for 16 kHz mono input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// RMS level (normalized samples in [-1, 1]) above which a frame counts
    /// as speech.
    pub silence_threshold: f32,
    /// Continuous silence required after speech before the utterance is
    /// considered finished.
    pub silence_duration_ms: u64,
    /// Hard cutoff for one recording session, speech or not.
    pub max_record_duration_ms: u64,
    /// How long to wait for speech onset before giving up on the session.
    pub initial_silence_timeout_ms: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            silence_threshold: 0.02,
            silence_duration_ms: 1_000,
            max_record_duration_ms: 30_000,
            initial_silence_timeout_ms: 10_000,
        }
    }
}

impl EndpointConfig {
    pub fn silence_duration(&self) -> Duration {
        Duration::from_millis(self.silence_duration_ms)
    }

    pub fn max_record_duration(&self) -> Duration {
        Duration::from_millis(self.max_record_duration_ms)
    }

    pub fn initial_silence_timeout(&self) -> Duration {
        Duration::from_millis(self.initial_silence_timeout_ms)
    }
}
