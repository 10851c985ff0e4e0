use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// One fixed-size frame of mono samples as produced by the capture thread.
/// Immutable once produced; ownership moves through the frame queue to the
/// recording session.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Monotonically increasing per capture stream.
    pub seq: u64,
    /// Normalized samples in [-1, 1].
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub captured_at: Instant,
}

impl AudioFrame {
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }
}

/// A complete recorded utterance: the session's frames concatenated in
/// arrival order.
#[derive(Debug, Clone)]
pub struct Utterance {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Utterance {
    pub fn from_frames(frames: &[AudioFrame]) -> Option<Self> {
        let first = frames.first()?;
        let sample_rate = first.sample_rate;
        let total: usize = frames.iter().map(|f| f.samples.len()).sum();

        let mut samples = Vec::with_capacity(total);
        for frame in frames {
            samples.extend_from_slice(&frame.samples);
        }
        Some(Self {
            samples,
            sample_rate,
        })
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Input device name; `None` picks the host default.
    pub device: Option<String>,
    /// Samples per emitted mono frame.
    pub frame_size_samples: usize,
    /// Bound on the capture-to-session frame queue.
    pub queue_capacity: usize,
    /// How long the session blocks on an empty queue before re-checking
    /// timeouts and the exit flag.
    pub queue_wait_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device: None,
            frame_size_samples: 1024,
            queue_capacity: 64,
            queue_wait_ms: 250,
        }
    }
}

impl CaptureConfig {
    pub fn queue_wait(&self) -> Duration {
        Duration::from_millis(self.queue_wait_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(seq: u64, samples: Vec<f32>) -> AudioFrame {
        AudioFrame {
            seq,
            samples,
            sample_rate: 16_000,
            captured_at: Instant::now(),
        }
    }

    #[test]
    fn utterance_concatenates_in_arrival_order() {
        let frames = vec![
            frame(0, vec![0.1, 0.2]),
            frame(1, vec![0.3]),
            frame(2, vec![0.4, 0.5]),
        ];
        let utterance = Utterance::from_frames(&frames).unwrap();
        assert_eq!(utterance.samples, vec![0.1, 0.2, 0.3, 0.4, 0.5]);
        assert_eq!(utterance.sample_rate, 16_000);
    }

    #[test]
    fn utterance_from_no_frames_is_none() {
        assert!(Utterance::from_frames(&[]).is_none());
    }

    #[test]
    fn frame_duration_follows_sample_rate() {
        let f = frame(0, vec![0.0; 1_600]);
        assert_eq!(f.duration(), Duration::from_millis(100));
    }
}
