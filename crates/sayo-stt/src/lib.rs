//! Speech-to-text seam: the core loop only sees the [`Transcriber`] trait.

pub mod wav;
pub mod whisper_http;

use sayo_audio::Utterance;
use thiserror::Error;

pub use wav::encode_wav;
pub use whisper_http::{WhisperHttpConfig, WhisperHttpTranscriber};

#[derive(Error, Debug)]
pub enum SttError {
    #[error("WAV encoding failed: {0}")]
    Encode(#[from] hound::Error),

    #[error("Transcription request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transcription service error: {0}")]
    Service(String),
}

/// Best-effort transcription. An empty string means no speech was
/// recognized; that is a result, not an error.
pub trait Transcriber: Send {
    fn transcribe(&self, utterance: &Utterance) -> Result<String, SttError>;
}

/// Recognizes nothing. Used when no transcription endpoint is configured,
/// which keeps the rest of the pipeline exercisable.
#[derive(Debug, Default)]
pub struct NoopTranscriber;

impl Transcriber for NoopTranscriber {
    fn transcribe(&self, _utterance: &Utterance) -> Result<String, SttError> {
        Ok(String::new())
    }
}
