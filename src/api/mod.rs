use crate::config::Settings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;

pub mod elevenlabs;
pub mod gtts;
pub mod pexels;

/// Where stock footage comes from.
#[async_trait]
pub trait ClipSource: Send + Sync {
    /// Direct download URL for the best-fitting clip, or `None` when the
    /// service has nothing usable for `query`.
    async fn search(&self, query: &str) -> Result<Option<String>>;

    async fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text` in `language` and write the audio to `out_path`.
    async fn synthesize(&self, text: &str, language: &str, out_path: &Path) -> Result<()>;
}

/// Shared HTTP client. Timeouts bound connecting and each read, never the
/// whole transfer, so large clips can stream for as long as bytes keep coming.
pub fn http_client(settings: &Settings) -> Result<Client> {
    Client::builder()
        .connect_timeout(settings.connect_timeout())
        .read_timeout(settings.read_timeout())
        .build()
        .context("Failed to build HTTP client")
}

pub(crate) async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create dir {}", parent.display()))?;
    }
    Ok(())
}
