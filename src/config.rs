use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

pub const PEXELS_KEY_VAR: &str = "PEXELS_API_KEY";
pub const ELEVENLABS_KEY_VAR: &str = "ELEVENLABS_API_KEY";

/// Fixed pipeline parameters. Every field has a default, so a config file
/// only needs the values it wants to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub script_file: PathBuf,
    pub clips_dir: PathBuf,
    pub output_dir: PathBuf,
    pub scene_duration_secs: u32,
    pub width: u32,
    pub height: u32,
    /// Variant width the resolver aims for when picking a download.
    pub preferred_width: u32,
    pub query_tokens: usize,
    pub language: String,
    pub scene_pause_ms: u64,
    /// Time allowed to establish a connection.
    pub connect_timeout_secs: u64,
    /// Longest silence tolerated between reads; a slow but steady body is fine.
    pub read_timeout_secs: u64,
    pub download_chunk_bytes: usize,
    pub pexels_base_url: String,
    pub gtts_base_url: String,
    pub elevenlabs_base_url: String,
    pub eleven_voice_id: String,
    pub eleven_model_id: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            script_file: PathBuf::from("script.txt"),
            clips_dir: PathBuf::from("clips"),
            output_dir: PathBuf::from("output"),
            scene_duration_secs: 6,
            width: 1280,
            height: 720,
            preferred_width: 1280,
            query_tokens: 6,
            language: "en".to_string(),
            scene_pause_ms: 500,
            connect_timeout_secs: 30,
            read_timeout_secs: 60,
            download_chunk_bytes: 1024 * 1024,
            pexels_base_url: "https://api.pexels.com".to_string(),
            gtts_base_url: "https://translate.google.com".to_string(),
            elevenlabs_base_url: "https://api.elevenlabs.io".to_string(),
            eleven_voice_id: "JBFqnCBsd6RMkjVDRZzb".to_string(),
            eleven_model_id: "eleven_multilingual_v2".to_string(),
        }
    }
}

impl Settings {
    pub fn scene_pause(&self) -> Duration {
        Duration::from_millis(self.scene_pause_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn frame_size(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.clips_dir.join("list.txt")
    }

    pub fn raw_clip_path(&self, index: usize) -> PathBuf {
        self.clips_dir.join(format!("raw_{}.mp4", index))
    }

    pub fn trimmed_clip_path(&self, index: usize) -> PathBuf {
        self.clips_dir.join(format!("trimmed_{}.mp4", index))
    }

    pub fn placeholder_clip_path(&self, index: usize) -> PathBuf {
        self.clips_dir.join(format!("black_{}.mp4", index))
    }

    pub fn combined_path(&self) -> PathBuf {
        self.output_dir.join("combined.mp4")
    }

    pub fn narration_path(&self) -> PathBuf {
        self.output_dir.join("audio.mp3")
    }

    pub fn final_path(&self) -> PathBuf {
        self.output_dir.join("final.mp4")
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let bad = |reason: &str| ConfigError::InvalidConfig {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };
        if self.scene_duration_secs == 0 {
            return Err(bad("scene_duration_secs must be positive"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(bad("width and height must be positive"));
        }
        if self.query_tokens == 0 {
            return Err(bad("query_tokens must be positive"));
        }
        if self.connect_timeout_secs == 0 || self.read_timeout_secs == 0 {
            return Err(bad("timeouts must be positive"));
        }
        if self.download_chunk_bytes == 0 {
            return Err(bad("download_chunk_bytes must be positive"));
        }
        Ok(())
    }

    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if fs::metadata(path).await.is_err() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()).into());
        }
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let settings: Settings =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidConfig {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        settings.validate(path)?;
        Ok(settings)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub pexels_key: String,
    /// Read for completeness; only the ElevenLabs narrator uses it.
    pub elevenlabs_key: Option<String>,
    pub settings: Settings,
}

impl Config {
    pub fn from_env(settings: Settings) -> Result<Self, ConfigError> {
        Self::from_lookup(settings, |var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(settings: Settings, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let pexels_key = non_empty(PEXELS_KEY_VAR).ok_or(ConfigError::MissingApiKey {
            var: PEXELS_KEY_VAR,
        })?;

        Ok(Self {
            pexels_key,
            elevenlabs_key: non_empty(ELEVENLABS_KEY_VAR),
            settings,
        })
    }
}
