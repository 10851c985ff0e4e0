use thiserror::Error;

#[derive(Error, Debug)]
pub enum TtsError {
    #[error("TTS engine not available: {0}")]
    EngineNotAvailable(String),

    #[error("Synthesis request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Synthesis failed: {0}")]
    Synthesis(String),
}

pub type TtsResult<T> = Result<T, TtsError>;
