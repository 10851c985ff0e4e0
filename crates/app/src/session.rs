use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sayo_audio::{AudioFrame, Utterance};
use sayo_endpoint::{EndReason, EndpointConfig, Endpointer, EndpointEvent, VoiceActivityState};
use sayo_foundation::{AudioError, SharedClock};

/// Outcome of one listen-record cycle.
#[derive(Debug)]
pub enum SessionResult {
    Utterance(Utterance),
    /// Nothing worth forwarding: no speech onset, or an empty buffer.
    Timeout,
    /// An out-of-band exit request arrived mid-session.
    ExitRequested,
}

/// Where the conversation loop gets its sessions from. The seam exists so
/// loop behavior is testable without a microphone.
pub trait SessionSource {
    fn next_session(&mut self) -> Result<SessionResult, AudioError>;
}

/// Drives one recording session at a time: drains the frame queue with a
/// bounded wait, feeds the endpointer, and accumulates the utterance.
pub struct UtteranceRecorder {
    frame_rx: Receiver<AudioFrame>,
    endpoint_config: EndpointConfig,
    queue_wait: Duration,
    exit_flag: Arc<AtomicBool>,
    device_failed: Arc<AtomicBool>,
    clock: SharedClock,
}

impl UtteranceRecorder {
    pub fn new(
        frame_rx: Receiver<AudioFrame>,
        endpoint_config: EndpointConfig,
        queue_wait: Duration,
        exit_flag: Arc<AtomicBool>,
        device_failed: Arc<AtomicBool>,
        clock: SharedClock,
    ) -> Self {
        Self {
            frame_rx,
            endpoint_config,
            queue_wait,
            exit_flag,
            device_failed,
            clock,
        }
    }

    /// Records until the endpointer ends the session, the exit flag is
    /// raised, or the device fails. The exit flag is observed within one
    /// queue wait even mid-recording, and partial audio is discarded.
    pub fn record_session(&mut self) -> Result<SessionResult, AudioError> {
        // Frames belonging to the previous session must never leak into
        // this one.
        while self.frame_rx.try_recv().is_ok() {}

        let mut endpointer = Endpointer::new(&self.endpoint_config, self.clock.now());
        let mut frames: Vec<AudioFrame> = Vec::new();

        tracing::debug!("listening for speech");
        loop {
            if self.exit_flag.load(Ordering::SeqCst) {
                tracing::info!("exit requested; aborting session");
                return Ok(SessionResult::ExitRequested);
            }
            // Cleared on observation so the loop can try a fresh session.
            if self.device_failed.swap(false, Ordering::SeqCst) {
                return Err(AudioError::DeviceFailed(
                    "input stream reported a fatal error".to_string(),
                ));
            }

            match self.frame_rx.recv_timeout(self.queue_wait) {
                Ok(frame) => {
                    let level = sayo_endpoint::rms(&frame.samples);
                    match endpointer.process(level, self.clock.now()) {
                        Some(EndpointEvent::SpeechStart) => {
                            tracing::debug!(seq = frame.seq, "speech started");
                            frames.push(frame);
                        }
                        Some(EndpointEvent::End(reason)) => {
                            // The triggering frame sits past the endpoint
                            // decision and is not part of the utterance.
                            return Ok(finish(reason, frames));
                        }
                        None => {
                            if endpointer.state() == VoiceActivityState::Speaking {
                                frames.push(frame);
                            }
                        }
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    // No frames for a while is itself an end condition;
                    // elapsed-time rules still apply.
                    if let Some(EndpointEvent::End(reason)) =
                        endpointer.check_timeouts(self.clock.now())
                    {
                        return Ok(finish(reason, frames));
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(AudioError::QueueDisconnected);
                }
            }
        }
    }
}

fn finish(reason: EndReason, frames: Vec<AudioFrame>) -> SessionResult {
    tracing::info!(?reason, frames = frames.len(), "recording session ended");
    match Utterance::from_frames(&frames) {
        Some(utterance) if !utterance.is_empty() && reason != EndReason::NoSpeech => {
            SessionResult::Utterance(utterance)
        }
        _ => SessionResult::Timeout,
    }
}

impl SessionSource for UtteranceRecorder {
    fn next_session(&mut self) -> Result<SessionResult, AudioError> {
        self.record_session()
    }
}
