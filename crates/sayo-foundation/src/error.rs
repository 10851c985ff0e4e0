use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Audio subsystem error: {0}")]
    Audio(#[from] AudioError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Fatal error, cannot recover: {0}")]
    Fatal(String),
}

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Input device not found: {name:?}")]
    DeviceNotFound { name: Option<String> },

    #[error("Input device failed: {0}")]
    DeviceFailed(String),

    #[error("Format not supported: {format}")]
    FormatNotSupported { format: String },

    #[error("Frame queue disconnected; capture thread is gone")]
    QueueDisconnected,

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Build stream error: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Play stream error: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("Supported stream configs error: {0}")]
    SupportedStreamConfigs(#[from] cpal::SupportedStreamConfigsError),
}

impl AudioError {
    /// A device error aborts the in-progress session; the loop logs it and
    /// starts the next session. Everything else tears the pipeline down.
    pub fn is_session_fatal_only(&self) -> bool {
        matches!(
            self,
            AudioError::DeviceFailed(_) | AudioError::Playback(_)
        )
    }
}
