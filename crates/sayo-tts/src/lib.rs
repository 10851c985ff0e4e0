//! Text-to-speech seam: the core loop only sees the [`Synthesizer`] trait.

pub mod error;
pub mod voicevox;

pub use error::{TtsError, TtsResult};
pub use voicevox::{VoicevoxConfig, VoicevoxSynthesizer};

/// A playable synthesis result.
#[derive(Debug, Clone)]
pub struct SpeechAudio {
    pub wav: Vec<u8>,
}

/// Turns text into playable audio. `Ok(None)` means there is nothing to
/// play (empty text).
pub trait Synthesizer: Send {
    fn synthesize(&self, text: &str) -> TtsResult<Option<SpeechAudio>>;
}
