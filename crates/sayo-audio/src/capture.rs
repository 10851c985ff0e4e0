use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};

use crossbeam_channel::{Sender, TrySendError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::chunker::FrameChunker;
use crate::frame::{AudioFrame, CaptureConfig};
use sayo_foundation::AudioError;

/// Negotiated stream parameters, reported back to the caller once the
/// stream is live.
#[derive(Debug, Clone, Copy)]
pub struct StreamInfo {
    pub sample_rate: u32,
    pub channels: u16,
}

#[derive(Debug, Default)]
pub struct CaptureStats {
    pub frames_captured: AtomicU64,
    pub frames_dropped: AtomicU64,
}

/// Handle to the dedicated capture thread. The cpal stream lives entirely
/// on that thread; the rest of the system sees only the frame queue and
/// the failure flag.
pub struct CaptureThread {
    handle: JoinHandle<()>,
    running: Arc<AtomicBool>,
    device_failed: Arc<AtomicBool>,
    stats: Arc<CaptureStats>,
}

impl CaptureThread {
    pub fn spawn(
        config: CaptureConfig,
        frame_tx: Sender<AudioFrame>,
    ) -> Result<(Self, StreamInfo), AudioError> {
        let running = Arc::new(AtomicBool::new(true));
        let device_failed = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(CaptureStats::default());

        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<StreamInfo, AudioError>>(1);

        let thread_running = running.clone();
        let thread_failed = device_failed.clone();
        let thread_stats = stats.clone();

        let handle = thread::Builder::new()
            .name("audio-capture".to_string())
            .spawn(move || {
                run_capture(
                    config,
                    frame_tx,
                    ready_tx,
                    thread_running,
                    thread_failed,
                    thread_stats,
                );
            })
            .map_err(|e| AudioError::DeviceFailed(format!("failed to spawn capture thread: {e}")))?;

        let info = match ready_rx.recv_timeout(Duration::from_secs(3)) {
            Ok(Ok(info)) => info,
            Ok(Err(e)) => {
                let _ = handle.join();
                return Err(e);
            }
            Err(_) => {
                running.store(false, Ordering::SeqCst);
                let _ = handle.join();
                return Err(AudioError::DeviceFailed(
                    "capture stream did not start within 3s".to_string(),
                ));
            }
        };

        tracing::info!(
            sample_rate = info.sample_rate,
            channels = info.channels,
            "audio capture started"
        );

        Ok((
            Self {
                handle,
                running,
                device_failed,
                stats,
            },
            info,
        ))
    }

    /// Set when the cpal stream reports a fatal error; the in-progress
    /// session observes this and aborts.
    pub fn failure_flag(&self) -> Arc<AtomicBool> {
        self.device_failed.clone()
    }

    pub fn stats(&self) -> Arc<CaptureStats> {
        self.stats.clone()
    }

    pub fn stop(self) {
        self.running.store(false, Ordering::SeqCst);
        let _ = self.handle.join();
    }
}

/// Everything the audio callback needs; owned by the single stream closure
/// that matches the device's sample format.
struct CallbackState {
    chunker: FrameChunker,
    frame_tx: Sender<AudioFrame>,
    stats: Arc<CaptureStats>,
}

impl CallbackState {
    /// Never blocks the hardware callback: a full queue drops the frame
    /// and counts it.
    fn handle(&mut self, samples: &[f32]) {
        let now = Instant::now();
        let frame_tx = &self.frame_tx;
        let stats = &self.stats;
        self.chunker.push(samples, now, |frame| {
            match frame_tx.try_send(frame) {
                Ok(()) => {
                    stats.frames_captured.fetch_add(1, Ordering::Relaxed);
                }
                Err(TrySendError::Full(_)) => {
                    stats.frames_dropped.fetch_add(1, Ordering::Relaxed);
                }
                Err(TrySendError::Disconnected(_)) => {}
            }
        });
    }
}

fn run_capture(
    config: CaptureConfig,
    frame_tx: Sender<AudioFrame>,
    ready_tx: Sender<Result<StreamInfo, AudioError>>,
    running: Arc<AtomicBool>,
    device_failed: Arc<AtomicBool>,
    stats: Arc<CaptureStats>,
) {
    let stream = match open_stream(&config, frame_tx, device_failed.clone(), stats.clone()) {
        Ok((stream, info)) => {
            let _ = ready_tx.send(Ok(info));
            stream
        }
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    let mut reported_drops = 0u64;
    let mut last_report = Instant::now();
    while running.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(100));

        // Overruns are non-fatal: log the running total and keep capturing.
        let dropped = stats.frames_dropped.load(Ordering::Relaxed);
        if dropped > reported_drops && last_report.elapsed() >= Duration::from_secs(5) {
            tracing::warn!(dropped, "frame queue overran; frames were dropped");
            reported_drops = dropped;
            last_report = Instant::now();
        }
    }

    drop(stream);
    tracing::info!("audio capture thread shutting down");
}

fn open_stream(
    config: &CaptureConfig,
    frame_tx: Sender<AudioFrame>,
    device_failed: Arc<AtomicBool>,
    stats: Arc<CaptureStats>,
) -> Result<(cpal::Stream, StreamInfo), AudioError> {
    let host = cpal::default_host();
    let device = match &config.device {
        Some(name) => host
            .input_devices()
            .map_err(|e| AudioError::DeviceFailed(e.to_string()))?
            .find(|d| d.name().map(|n| &n == name).unwrap_or(false))
            .ok_or_else(|| AudioError::DeviceNotFound {
                name: Some(name.clone()),
            })?,
        None => host
            .default_input_device()
            .ok_or(AudioError::DeviceNotFound { name: None })?,
    };

    if let Ok(name) = device.name() {
        tracing::info!(device = %name, "selected input device");
    }

    let (stream_config, sample_format) = negotiate_config(&device)?;
    let info = StreamInfo {
        sample_rate: stream_config.sample_rate.0,
        channels: stream_config.channels,
    };

    let mut state = CallbackState {
        chunker: FrameChunker::new(config.frame_size_samples, info.channels, info.sample_rate),
        frame_tx,
        stats,
    };

    // A stream error is fatal to the current session only; the flag is
    // surfaced by the recorder as a DeviceFailed error.
    let err_fn = move |err: cpal::StreamError| {
        tracing::error!("audio stream error: {err}");
        device_failed.store(true, Ordering::SeqCst);
    };

    thread_local! {
        static CONVERT_BUFFER: std::cell::RefCell<Vec<f32>> =
            const { std::cell::RefCell::new(Vec::new()) };
    }

    let stream = match sample_format {
        SampleFormat::F32 => device.build_input_stream(
            &stream_config,
            move |data: &[f32], _: &_| state.handle(data),
            err_fn,
            None,
        )?,
        SampleFormat::I16 => device.build_input_stream(
            &stream_config,
            move |data: &[i16], _: &_| {
                CONVERT_BUFFER.with(|buf| {
                    let mut converted = buf.borrow_mut();
                    converted.clear();
                    converted.reserve(data.len());
                    for &s in data {
                        converted.push(s as f32 / 32768.0);
                    }
                    state.handle(&converted);
                });
            },
            err_fn,
            None,
        )?,
        SampleFormat::U16 => device.build_input_stream(
            &stream_config,
            move |data: &[u16], _: &_| {
                CONVERT_BUFFER.with(|buf| {
                    let mut converted = buf.borrow_mut();
                    converted.clear();
                    converted.reserve(data.len());
                    // Center unsigned samples before normalizing.
                    for &s in data {
                        converted.push((s as i32 - 32768) as f32 / 32768.0);
                    }
                    state.handle(&converted);
                });
            },
            err_fn,
            None,
        )?,
        other => {
            return Err(AudioError::FormatNotSupported {
                format: format!("{other:?}"),
            });
        }
    };

    stream.play()?;
    Ok((stream, info))
}

fn negotiate_config(device: &cpal::Device) -> Result<(StreamConfig, SampleFormat), AudioError> {
    if let Ok(default_config) = device.default_input_config() {
        return Ok((
            StreamConfig {
                channels: default_config.channels(),
                sample_rate: default_config.sample_rate(),
                buffer_size: cpal::BufferSize::Default,
            },
            default_config.sample_format(),
        ));
    }

    if let Some(config) = device.supported_input_configs()?.next() {
        let config = config.with_max_sample_rate();
        return Ok((
            StreamConfig {
                channels: config.channels(),
                sample_rate: config.sample_rate(),
                buffer_size: cpal::BufferSize::Default,
            },
            config.sample_format(),
        ));
    }

    Err(AudioError::FormatNotSupported {
        format: "no supported input formats".to_string(),
    })
}
