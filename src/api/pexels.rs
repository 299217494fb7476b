//! Pexels video search and clip download.

use super::{ClipSource, ensure_parent};
use crate::config::Config;
use crate::error::ServiceError;
use crate::logi;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};

#[derive(Debug, Deserialize)]
struct VideoSearchResponse {
    #[serde(default)]
    videos: Vec<Video>,
}

#[derive(Debug, Deserialize)]
struct Video {
    #[serde(default)]
    video_files: Vec<VideoFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoFile {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub link: Option<String>,
}

/// The variant whose width is closest to `target`. Variants without a width
/// count as zero wide; ties go to the earliest variant.
pub fn closest_width(files: &[VideoFile], target: u32) -> Option<&VideoFile> {
    files
        .iter()
        .min_by_key(|f| f.width.unwrap_or(0).abs_diff(target))
}

pub struct PexelsClient {
    client: Client,
    api_key: String,
    base_url: String,
    preferred_width: u32,
    chunk_bytes: usize,
}

impl PexelsClient {
    pub fn new(client: Client, cfg: &Config) -> Self {
        let s = &cfg.settings;
        Self {
            client,
            api_key: cfg.pexels_key.clone(),
            base_url: s.pexels_base_url.trim_end_matches('/').to_string(),
            preferred_width: s.preferred_width,
            chunk_bytes: s.download_chunk_bytes,
        }
    }
}

#[async_trait]
impl ClipSource for PexelsClient {
    async fn search(&self, query: &str) -> Result<Option<String>> {
        let url = format!("{}/videos/search", self.base_url);
        let resp = self
            .client
            .get(url)
            .header("Authorization", &self.api_key)
            .query(&[("query", query), ("per_page", "1")])
            .send()
            .await
            .context("Pexels search request failed")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                service: "Pexels search",
                status: status.as_u16(),
            }
            .into());
        }

        let body: VideoSearchResponse = resp
            .json()
            .await
            .context("Pexels search response parse failed")?;

        let Some(video) = body.videos.first() else {
            return Ok(None);
        };
        Ok(closest_width(&video.video_files, self.preferred_width).and_then(|f| f.link.clone()))
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        logi(format!("Downloading {} -> {}", url, dest.display()));
        let mut resp = self
            .client
            .get(url)
            .send()
            .await
            .context("Clip download request failed")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                service: "Clip download",
                status: status.as_u16(),
            }
            .into());
        }

        ensure_parent(dest).await?;
        let file = fs::File::create(dest)
            .await
            .with_context(|| format!("Failed to create {}", dest.display()))?;
        let mut out = BufWriter::with_capacity(self.chunk_bytes, file);
        while let Some(chunk) = resp.chunk().await.context("Clip download interrupted")? {
            out.write_all(&chunk).await?;
        }
        out.flush().await?;
        Ok(())
    }
}
