use crate::wav::encode_wav;
use crate::{SttError, Transcriber};
use sayo_audio::Utterance;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, serde::Serialize, Deserialize)]
#[serde(default)]
pub struct WhisperHttpConfig {
    /// Full URL of the transcription endpoint.
    pub endpoint: String,
    /// Language hint passed with the upload.
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for WhisperHttpConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:9000/transcribe".to_string(),
            language: "ja".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    #[serde(default)]
    text: String,
}

/// Blocking client for a Whisper-compatible HTTP transcription service.
/// Uploads the utterance as a WAV multipart part and returns the
/// recognized text; an empty string means nothing was recognized.
pub struct WhisperHttpTranscriber {
    config: WhisperHttpConfig,
    client: reqwest::blocking::Client,
}

impl WhisperHttpTranscriber {
    pub fn new(config: WhisperHttpConfig) -> Result<Self, SttError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }
}

impl Transcriber for WhisperHttpTranscriber {
    fn transcribe(&self, utterance: &Utterance) -> Result<String, SttError> {
        let wav = encode_wav(utterance)?;
        tracing::debug!(
            bytes = wav.len(),
            duration_ms = utterance.duration().as_millis() as u64,
            "uploading utterance for transcription"
        );

        let part = reqwest::blocking::multipart::Part::bytes(wav)
            .file_name("utterance.wav")
            .mime_str("audio/wav")
            .map_err(|e| SttError::Service(e.to_string()))?;
        let form = reqwest::blocking::multipart::Form::new()
            .part("file", part)
            .text("language", self.config.language.clone());

        let response = self
            .client
            .post(&self.config.endpoint)
            .multipart(form)
            .send()?;

        if !response.status().is_success() {
            return Err(SttError::Service(format!(
                "transcription endpoint returned {}",
                response.status()
            )));
        }

        let body: TranscribeResponse = response.json()?;
        Ok(body.text)
    }
}
