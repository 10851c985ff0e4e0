use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use sayo_foundation::AppError;

/// Produces a reply for forwarded text. Failures are absorbed: on any
/// error the implementation returns a fixed fallback string so the loop
/// never crashes on a collaborator.
pub trait Reasoner: Send {
    fn respond(&self, text: &str) -> String;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Falls back to the `GEMINI_API_KEY` environment variable.
    pub api_key: Option<String>,
    pub model: String,
    /// Persona/system text, passed through verbatim.
    pub system_instruction: String,
    /// Spoken when the API call fails.
    pub fallback_reply: String,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            system_instruction: String::new(),
            fallback_reply:
                "すみません、ご主人。少し考えごとをしていました。もう一度お願いできますか？"
                    .to_string(),
            timeout_secs: 30,
        }
    }
}

pub struct GeminiReasoner {
    config: GeminiConfig,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl GeminiReasoner {
    pub fn new(config: GeminiConfig) -> Result<Self, AppError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .ok_or_else(|| {
                AppError::Config(
                    "no Gemini API key: set gemini.api_key or GEMINI_API_KEY".to_string(),
                )
            })?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;
        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.config.model
        );

        let mut body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });
        if !self.config.system_instruction.is_empty() {
            body["system_instruction"] = json!({
                "parts": [{ "text": self.config.system_instruction }]
            });
        }

        let response: serde_json::Value = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        let text = response["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("no text in Gemini response"))?;
        Ok(text.trim().to_string())
    }
}

impl Reasoner for GeminiReasoner {
    fn respond(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }

        match self.generate(text) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("reasoner call failed, using fallback reply: {e}");
                self.config.fallback_reply.clone()
            }
        }
    }
}
