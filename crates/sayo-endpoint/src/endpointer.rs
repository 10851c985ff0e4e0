use crate::config::EndpointConfig;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceActivityState {
    Idle,
    Speaking,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Continuous silence after speech reached the configured duration.
    Silence,
    /// The session hit the hard recording cutoff.
    MaxDuration,
    /// No speech onset within the initial-silence window.
    NoSpeech,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointEvent {
    SpeechStart,
    End(EndReason),
}

/// Endpoint decision core for one recording session.
///
/// Pure over its inputs: the same sequence of `(rms, now)` pairs with the
/// same config always yields the same decisions. Mutable state is exactly
/// the voice-activity state and the silence-timer origin; the session start
/// is fixed at construction. The caller stops feeding frames once an
/// `End` event is returned.
pub struct Endpointer {
    state: VoiceActivityState,
    silence_since: Option<Instant>,
    session_start: Instant,

    silence_threshold: f32,
    silence_duration: Duration,
    max_record_duration: Duration,
    initial_silence_timeout: Duration,
}

impl Endpointer {
    pub fn new(config: &EndpointConfig, session_start: Instant) -> Self {
        Self {
            state: VoiceActivityState::Idle,
            silence_since: None,
            session_start,
            silence_threshold: config.silence_threshold,
            silence_duration: config.silence_duration(),
            max_record_duration: config.max_record_duration(),
            initial_silence_timeout: config.initial_silence_timeout(),
        }
    }

    /// Feed one frame's energy level, sampled at `now`.
    pub fn process(&mut self, rms: f32, now: Instant) -> Option<EndpointEvent> {
        if let Some(event) = self.check_timeouts(now) {
            return Some(event);
        }

        match self.state {
            VoiceActivityState::Idle => {
                if rms > self.silence_threshold {
                    self.state = VoiceActivityState::Speaking;
                    self.silence_since = None;
                    return Some(EndpointEvent::SpeechStart);
                }
                None
            }
            VoiceActivityState::Speaking => {
                if rms < self.silence_threshold {
                    // Silence must be continuous for the full duration; any
                    // frame back above threshold disarms the timer.
                    let since = *self.silence_since.get_or_insert(now);
                    if now.duration_since(since) >= self.silence_duration {
                        return Some(EndpointEvent::End(EndReason::Silence));
                    }
                } else {
                    self.silence_since = None;
                }
                None
            }
        }
    }

    /// Elapsed-time rules alone. The recorder calls this on queue-empty
    /// wakes: an armed silence timer or a session timeout must fire even
    /// when no frames arrive to carry the decision.
    pub fn check_timeouts(&mut self, now: Instant) -> Option<EndpointEvent> {
        if now.duration_since(self.session_start) >= self.max_record_duration {
            return Some(EndpointEvent::End(EndReason::MaxDuration));
        }

        match self.state {
            VoiceActivityState::Idle => {
                if now.duration_since(self.session_start) >= self.initial_silence_timeout {
                    return Some(EndpointEvent::End(EndReason::NoSpeech));
                }
                None
            }
            VoiceActivityState::Speaking => {
                if let Some(since) = self.silence_since {
                    if now.duration_since(since) >= self.silence_duration {
                        return Some(EndpointEvent::End(EndReason::Silence));
                    }
                }
                None
            }
        }
    }

    pub fn state(&self) -> VoiceActivityState {
        self.state
    }

    pub fn session_start(&self) -> Instant {
        self.session_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> EndpointConfig {
        EndpointConfig {
            silence_threshold: 0.02,
            silence_duration_ms: 1_000,
            max_record_duration_ms: 30_000,
            initial_silence_timeout_ms: 10_000,
        }
    }

    const FRAME: Duration = Duration::from_millis(64);

    /// Runs a sequence of RMS values spaced one frame apart and returns
    /// every emitted event with its frame index.
    fn run(levels: &[f32], config: &EndpointConfig) -> Vec<(usize, EndpointEvent)> {
        let t0 = Instant::now();
        let mut ep = Endpointer::new(config, t0);
        let mut events = Vec::new();
        for (i, &rms) in levels.iter().enumerate() {
            if let Some(ev) = ep.process(rms, t0 + FRAME * (i as u32 + 1)) {
                events.push((i, ev));
                if matches!(ev, EndpointEvent::End(_)) {
                    break;
                }
            }
        }
        events
    }

    #[test]
    fn all_silence_never_enters_speaking() {
        let cfg = test_config();
        let t0 = Instant::now();
        let mut ep = Endpointer::new(&cfg, t0);

        for i in 1..=100 {
            let event = ep.process(0.001, t0 + FRAME * i);
            assert_eq!(event, None);
            assert_eq!(ep.state(), VoiceActivityState::Idle);
        }

        // The session must end via the no-speech timeout, never the
        // silence-after-speech path.
        let event = ep.process(0.001, t0 + Duration::from_secs(10));
        assert_eq!(event, Some(EndpointEvent::End(EndReason::NoSpeech)));
    }

    #[test]
    fn speech_then_silence_ends_exactly_once() {
        let cfg = test_config();
        // 10 speech frames, then enough silence frames to cover 1s.
        let mut levels = vec![0.1f32; 10];
        levels.extend(vec![0.001f32; 40]);

        let events = run(&levels, &cfg);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], (0, EndpointEvent::SpeechStart));

        // Silence arms at frame 10; 1s / 64ms ≈ 15.6 frames later the
        // window closes, so the end decision lands on frame 26.
        let (end_idx, end_ev) = events[1];
        assert_eq!(end_ev, EndpointEvent::End(EndReason::Silence));
        assert_eq!(end_idx, 26);
    }

    #[test]
    fn brief_dip_below_threshold_resets_the_silence_timer() {
        let cfg = test_config();
        let t0 = Instant::now();
        let mut ep = Endpointer::new(&cfg, t0);

        assert_eq!(
            ep.process(0.1, t0 + FRAME),
            Some(EndpointEvent::SpeechStart)
        );
        // 800ms of silence, not enough to end.
        assert_eq!(ep.process(0.001, t0 + Duration::from_millis(100)), None);
        assert_eq!(ep.process(0.001, t0 + Duration::from_millis(900)), None);
        // Speech resumes; the timer must disarm.
        assert_eq!(ep.process(0.1, t0 + Duration::from_millis(950)), None);
        // A fresh silence run has to last the full duration again.
        assert_eq!(ep.process(0.001, t0 + Duration::from_millis(1_000)), None);
        assert_eq!(ep.process(0.001, t0 + Duration::from_millis(1_900)), None);
        assert_eq!(
            ep.process(0.001, t0 + Duration::from_millis(2_000)),
            Some(EndpointEvent::End(EndReason::Silence))
        );
    }

    #[test]
    fn continuous_speech_hits_max_duration_at_the_boundary() {
        let cfg = test_config();
        let t0 = Instant::now();
        let mut ep = Endpointer::new(&cfg, t0);

        assert_eq!(
            ep.process(0.1, t0 + FRAME),
            Some(EndpointEvent::SpeechStart)
        );
        assert_eq!(
            ep.process(0.1, t0 + Duration::from_millis(29_999)),
            None
        );
        assert_eq!(
            ep.process(0.1, t0 + Duration::from_secs(30)),
            Some(EndpointEvent::End(EndReason::MaxDuration))
        );
    }

    #[test]
    fn queue_empty_wake_completes_an_armed_silence_timer() {
        let cfg = test_config();
        let t0 = Instant::now();
        let mut ep = Endpointer::new(&cfg, t0);

        ep.process(0.1, t0 + FRAME);
        ep.process(0.001, t0 + Duration::from_millis(200));

        // No more frames arrive; the timeout check alone must end the
        // session once the window elapses.
        assert_eq!(ep.check_timeouts(t0 + Duration::from_millis(1_000)), None);
        assert_eq!(
            ep.check_timeouts(t0 + Duration::from_millis(1_200)),
            Some(EndpointEvent::End(EndReason::Silence))
        );
    }

    #[test]
    fn queue_empty_wake_fires_the_no_speech_timeout() {
        let cfg = test_config();
        let t0 = Instant::now();
        let mut ep = Endpointer::new(&cfg, t0);

        assert_eq!(ep.check_timeouts(t0 + Duration::from_secs(9)), None);
        assert_eq!(
            ep.check_timeouts(t0 + Duration::from_secs(10)),
            Some(EndpointEvent::End(EndReason::NoSpeech))
        );
    }

    #[test]
    fn low_level_noise_never_triggers_speech() {
        use rand::Rng;

        let cfg = test_config();
        let t0 = Instant::now();
        let mut ep = Endpointer::new(&cfg, t0);
        let mut rng = rand::thread_rng();

        for i in 1..=100 {
            // Noise fluctuating well below the threshold.
            let rms = rng.gen_range(0.0..0.015);
            let event = ep.process(rms, t0 + FRAME * i);
            assert_eq!(event, None);
            assert_eq!(ep.state(), VoiceActivityState::Idle);
        }
    }

    #[test]
    fn identical_frame_sequences_yield_identical_decisions() {
        let cfg = test_config();
        let mut levels = vec![0.001f32; 5];
        levels.extend(vec![0.08f32; 12]);
        levels.extend(vec![0.001f32; 30]);

        let first = run(&levels, &cfg);
        let second = run(&levels, &cfg);
        assert_eq!(first, second);
    }
}
