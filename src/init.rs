use crate::config::Settings;
use crate::ffmpeg;
use crate::{logi, logw};
use anyhow::Result;
use std::path::Path;
use tokio::fs;
use walkdir::WalkDir;

pub async fn ensure_directories(settings: &Settings) -> Result<()> {
    for dir in [&settings.clips_dir, &settings.output_dir] {
        if !dir.exists() {
            fs::create_dir_all(dir).await?;
            logi(format!("Created directory: {}", dir.display()));
        }
    }
    Ok(())
}

/// Remove everything under `dir_path`, keeping the directory itself.
pub async fn clear_directory_contents(dir_path: &Path) -> Result<()> {
    if !dir_path.is_dir() {
        return Ok(());
    }

    for entry in WalkDir::new(dir_path).min_depth(1).contents_first(true) {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_dir() {
            fs::remove_dir(path).await?;
        } else {
            fs::remove_file(path).await?;
        }
    }

    Ok(())
}

pub async fn check_ffmpeg(program: &str) -> bool {
    let found = ffmpeg::check_available(program).await;
    if !found {
        logw(format!("{} not found in PATH. Please install FFmpeg.", program));
    }
    found
}
