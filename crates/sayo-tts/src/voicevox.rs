use crate::{SpeechAudio, Synthesizer, TtsError, TtsResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoicevoxConfig {
    /// Engine base URL, no trailing slash.
    pub base_url: String,
    /// VOICEVOX speaker (voice) id.
    pub speaker_id: u32,
    pub timeout_secs: u64,
}

impl Default for VoicevoxConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:50021".to_string(),
            speaker_id: 46,
            timeout_secs: 30,
        }
    }
}

/// Blocking client for a local VOICEVOX engine. Synthesis is two calls:
/// `/audio_query` builds the prosody query, `/synthesis` renders it to WAV.
pub struct VoicevoxSynthesizer {
    config: VoicevoxConfig,
    client: reqwest::blocking::Client,
}

impl VoicevoxSynthesizer {
    pub fn new(config: VoicevoxConfig) -> TtsResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    /// Connects to the engine and verifies it responds before the loop
    /// starts depending on it.
    pub fn connect(config: VoicevoxConfig) -> TtsResult<Self> {
        let synth = Self::new(config)?;
        let version = synth
            .engine_version()
            .map_err(|e| TtsError::EngineNotAvailable(format!(
                "VOICEVOX is not reachable at {}: {e}",
                synth.config.base_url
            )))?;
        tracing::info!(%version, "VOICEVOX engine is running");
        Ok(synth)
    }

    pub fn engine_version(&self) -> TtsResult<String> {
        let response = self
            .client
            .get(format!("{}/version", self.config.base_url))
            .send()?
            .error_for_status()?;
        Ok(response.json::<String>()?)
    }

    fn audio_query(&self, text: &str) -> TtsResult<serde_json::Value> {
        let response = self
            .client
            .post(format!("{}/audio_query", self.config.base_url))
            .query(&[
                ("text", text),
                ("speaker", &self.config.speaker_id.to_string()),
            ])
            .send()?
            .error_for_status()?;
        Ok(response.json()?)
    }

    fn render(&self, query: &serde_json::Value) -> TtsResult<Vec<u8>> {
        let response = self
            .client
            .post(format!("{}/synthesis", self.config.base_url))
            .query(&[("speaker", self.config.speaker_id.to_string())])
            .json(query)
            .send()?
            .error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }
}

impl Synthesizer for VoicevoxSynthesizer {
    fn synthesize(&self, text: &str) -> TtsResult<Option<SpeechAudio>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        tracing::debug!(%text, "synthesizing speech");
        let query = self.audio_query(text)?;
        let wav = self.render(&query)?;
        if wav.is_empty() {
            return Err(TtsError::Synthesis("engine returned no audio".to_string()));
        }
        Ok(Some(SpeechAudio { wav }))
    }
}
