use crate::activation::ActivationRules;
use crate::announce::AnnounceConfig;
use crate::reason::GeminiConfig;
use serde::{Deserialize, Serialize};

use sayo_audio::CaptureConfig;
use sayo_endpoint::EndpointConfig;
use sayo_foundation::AppError;
use sayo_stt::WhisperHttpConfig;
use sayo_tts::VoicevoxConfig;

/// Fixed phrases the loop speaks on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Spoken when Dormant and no hotword was heard.
    pub hotword_prompt: String,
    /// Spoken before shutting down on an exit phrase.
    pub farewell: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            hotword_prompt: "小夜にご用ですか？".to_string(),
            farewell: "はい、終了しますね。".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: "sayo_log.db".to_string(),
        }
    }
}

/// Composed application settings. Every section has defaults, so an empty
/// (or absent) `sayo.toml` yields a runnable configuration; only the Gemini
/// API key has to come from the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub audio: CaptureConfig,
    pub endpoint: EndpointConfig,
    pub activation: ActivationRules,
    pub speech: SpeechConfig,
    /// Absent means transcription is disabled (the no-op transcriber).
    pub whisper: Option<WhisperHttpConfig>,
    pub voicevox: VoicevoxConfig,
    pub gemini: GeminiConfig,
    pub storage: StorageConfig,
    pub announce: AnnounceConfig,
}

impl AppConfig {
    pub fn load(path: Option<&str>) -> Result<Self, AppError> {
        sayo_foundation::load_settings(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_reference_tuning() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.endpoint.silence_threshold, 0.02);
        assert_eq!(cfg.endpoint.silence_duration_ms, 1_000);
        assert_eq!(cfg.endpoint.max_record_duration_ms, 30_000);
        assert_eq!(cfg.audio.frame_size_samples, 1024);
        assert_eq!(cfg.voicevox.speaker_id, 46);
        assert!(cfg.whisper.is_none());
    }

    #[test]
    fn partial_toml_overrides_one_section() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[endpoint]\nsilence_threshold = 0.05\n\n[whisper]\nendpoint = \"http://localhost:9000/transcribe\"\nlanguage = \"ja\"\ntimeout_secs = 30\n"
        )
        .unwrap();

        let cfg = AppConfig::load(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(cfg.endpoint.silence_threshold, 0.05);
        // Untouched sections keep their defaults.
        assert_eq!(cfg.endpoint.silence_duration_ms, 1_000);
        assert_eq!(cfg.whisper.unwrap().timeout_secs, 30);
    }
}
