use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Entry path as the concat demuxer will see it: relative entries resolve
/// against the list file's own directory, not the working directory.
fn entry_path(list_dir: &Path, clip: &Path) -> PathBuf {
    if clip.is_absolute() != list_dir.is_absolute() {
        return clip.to_path_buf();
    }
    pathdiff::diff_paths(clip, list_dir).unwrap_or_else(|| clip.to_path_buf())
}

fn quote(path: &Path) -> String {
    format!("'{}'", path.display().to_string().replace('\'', "'\\''"))
}

pub fn render(list_txt: &Path, clips: &[PathBuf]) -> String {
    let list_dir = list_txt.parent().unwrap_or(Path::new(""));
    let mut out = String::new();
    for clip in clips {
        out.push_str("file ");
        out.push_str(&quote(&entry_path(list_dir, clip)));
        out.push('\n');
    }
    out
}

pub async fn write(list_txt: &Path, clips: &[PathBuf]) -> Result<()> {
    let mut listf = fs::File::create(list_txt)
        .await
        .with_context(|| format!("Failed to create {}", list_txt.display()))?;
    listf.write_all(render(list_txt, clips).as_bytes()).await?;
    listf.flush().await?;
    Ok(())
}
