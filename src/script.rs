use crate::error::ConfigError;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// One line of the input script. Indices start at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    pub index: usize,
    pub text: String,
}

impl Scene {
    /// The first `max_tokens` whitespace-delimited words, re-joined with single spaces.
    pub fn search_query(&self, max_tokens: usize) -> String {
        self.text
            .split_whitespace()
            .take(max_tokens)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub fn parse_scenes(text: &str) -> Vec<Scene> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, line)| Scene {
            index: i + 1,
            text: line.to_string(),
        })
        .collect()
}

pub async fn load_scenes(path: &Path) -> Result<Vec<Scene>> {
    if fs::metadata(path).await.is_err() {
        return Err(ConfigError::ScriptNotFound(path.to_path_buf()).into());
    }

    let text = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read script: {}", path.display()))?;

    let scenes = parse_scenes(&text);
    if scenes.is_empty() {
        return Err(ConfigError::EmptyScript(path.to_path_buf()).into());
    }
    Ok(scenes)
}

/// Narration is the whole script read straight through, one scene per line.
pub fn narration_text(scenes: &[Scene]) -> String {
    scenes
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
