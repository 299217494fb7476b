use super::{SpeechSynthesizer, ensure_parent};
use crate::config::{Config, ELEVENLABS_KEY_VAR};
use crate::error::{ConfigError, ServiceError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio::fs;

/// Alternate narrator. Only built when explicitly requested, since the
/// default Google voice needs no key. The voice decides the language, so the
/// requested language is not forwarded.
pub struct ElevenLabsTts {
    client: Client,
    api_key: String,
    base_url: String,
    voice_id: String,
    model_id: String,
}

impl ElevenLabsTts {
    pub fn new(client: Client, cfg: &Config) -> Result<Self, ConfigError> {
        let api_key = cfg.elevenlabs_key.clone().ok_or(ConfigError::MissingApiKey {
            var: ELEVENLABS_KEY_VAR,
        })?;
        let s = &cfg.settings;
        Ok(Self {
            client,
            api_key,
            base_url: s.elevenlabs_base_url.trim_end_matches('/').to_string(),
            voice_id: s.eleven_voice_id.clone(),
            model_id: s.eleven_model_id.clone(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsTts {
    async fn synthesize(&self, text: &str, _language: &str, out_path: &Path) -> Result<()> {
        let url = format!(
            "{}/v1/text-to-speech/{}?output_format=mp3_44100_128",
            self.base_url, self.voice_id
        );

        let body = serde_json::json!({
            "text": text,
            "model_id": self.model_id,
        });

        let resp = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .timeout(Duration::from_secs(300))
            .send()
            .await
            .context("ElevenLabs request failed")?;

        if !resp.status().is_success() {
            return Err(ServiceError::Status {
                service: "ElevenLabs TTS",
                status: resp.status().as_u16(),
            }
            .into());
        }

        let bytes = resp.bytes().await.context("ElevenLabs response read failed")?;
        if bytes.is_empty() {
            return Err(ServiceError::EmptyAudio { service: "ElevenLabs TTS" }.into());
        }
        ensure_parent(out_path).await?;
        fs::write(out_path, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", out_path.display()))?;
        Ok(())
    }
}
