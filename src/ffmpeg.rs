use crate::config::Settings;
use crate::error::ToolError;
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// The four ways the pipeline drives the external media tool.
#[async_trait]
pub trait MediaTranscoder: Send + Sync {
    /// Solid black clip at the canonical frame size and scene duration.
    async fn color_clip(&self, settings: &Settings, out_mp4: &Path) -> Result<()>;

    /// Trim to the scene duration, then scale and pad to the canonical frame.
    async fn normalize_clip(&self, settings: &Settings, in_mp4: &Path, out_mp4: &Path)
    -> Result<()>;

    async fn concat(&self, list_txt: &Path, out_mp4: &Path) -> Result<()>;

    /// Copy the video stream, encode the audio, stop at the shorter input.
    async fn mux(&self, video_in: &Path, audio_in: &Path, out_mp4: &Path) -> Result<()>;
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

pub fn color_clip_args(settings: &Settings, out_mp4: &Path) -> Vec<String> {
    let dur = settings.scene_duration_secs.to_string();
    let mut args = strings(&["-y", "-f", "lavfi", "-i"]);
    args.push(format!("color=black:s={}:d={}", settings.frame_size(), dur));
    args.extend(strings(&["-c:v", "libx264", "-t"]));
    args.push(dur);
    args.push(path_arg(out_mp4));
    args
}

pub fn scale_pad_filter(width: u32, height: u32) -> String {
    format!(
        "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2",
        w = width,
        h = height
    )
}

pub fn normalize_args(settings: &Settings, in_mp4: &Path, out_mp4: &Path) -> Vec<String> {
    let mut args = strings(&["-y", "-i"]);
    args.push(path_arg(in_mp4));
    args.extend(strings(&["-ss", "0", "-t"]));
    args.push(settings.scene_duration_secs.to_string());
    args.push("-vf".to_string());
    args.push(scale_pad_filter(settings.width, settings.height));
    args.extend(strings(&["-c:v", "libx264", "-preset", "fast", "-c:a", "aac"]));
    args.push(path_arg(out_mp4));
    args
}

pub fn concat_args(list_txt: &Path, out_mp4: &Path) -> Vec<String> {
    let mut args = strings(&["-y", "-f", "concat", "-safe", "0", "-i"]);
    args.push(path_arg(list_txt));
    args.extend(strings(&["-c:v", "libx264", "-c:a", "aac", "-preset", "fast"]));
    args.push(path_arg(out_mp4));
    args
}

pub fn mux_args(video_in: &Path, audio_in: &Path, out_mp4: &Path) -> Vec<String> {
    let mut args = strings(&["-y", "-i"]);
    args.push(path_arg(video_in));
    args.push("-i".to_string());
    args.push(path_arg(audio_in));
    args.extend(strings(&["-c:v", "copy", "-c:a", "aac", "-shortest"]));
    args.push(path_arg(out_mp4));
    args
}

pub async fn run_cmd(program: &str, args: &[String]) -> Result<()> {
    debug!("Executing: {} {}", program, args.join(" "));
    let status = Command::new(program)
        .args(args)
        .status()
        .await
        .map_err(|source| ToolError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !status.success() {
        return Err(ToolError::Failed {
            program: program.to_string(),
            args: args.to_vec(),
            status: status.to_string(),
        }
        .into());
    }

    Ok(())
}

pub async fn check_available(program: &str) -> bool {
    match Command::new(program).arg("-version").output().await {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}

pub struct Ffmpeg {
    program: String,
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl Ffmpeg {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl MediaTranscoder for Ffmpeg {
    async fn color_clip(&self, settings: &Settings, out_mp4: &Path) -> Result<()> {
        run_cmd(&self.program, &color_clip_args(settings, out_mp4)).await
    }

    async fn normalize_clip(
        &self,
        settings: &Settings,
        in_mp4: &Path,
        out_mp4: &Path,
    ) -> Result<()> {
        run_cmd(&self.program, &normalize_args(settings, in_mp4, out_mp4)).await
    }

    async fn concat(&self, list_txt: &Path, out_mp4: &Path) -> Result<()> {
        run_cmd(&self.program, &concat_args(list_txt, out_mp4)).await
    }

    async fn mux(&self, video_in: &Path, audio_in: &Path, out_mp4: &Path) -> Result<()> {
        run_cmd(&self.program, &mux_args(video_in, audio_in, out_mp4)).await
    }
}
