use crate::api::{ClipSource, SpeechSynthesizer};
use crate::config::Settings;
use crate::ffmpeg::MediaTranscoder;
use crate::script::{self, Scene};
use crate::{init, logi, logok, logw, manifest};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// The external capabilities one run depends on.
pub struct Services<'a> {
    pub clips: &'a dyn ClipSource,
    pub media: &'a dyn MediaTranscoder,
    pub speech: &'a dyn SpeechSynthesizer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipReference {
    pub index: usize,
    /// `None` means the search came back empty and a placeholder is needed.
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipOrigin {
    Downloaded,
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneClip {
    pub index: usize,
    pub path: PathBuf,
    pub origin: ClipOrigin,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub clips: Vec<SceneClip>,
    pub manifest: PathBuf,
    pub combined: PathBuf,
    pub narration: PathBuf,
    pub final_video: PathBuf,
}

pub async fn resolve_scene(
    settings: &Settings,
    clips: &dyn ClipSource,
    scene: &Scene,
) -> Result<ClipReference> {
    let keywords = scene.search_query(settings.query_tokens);
    logi(format!("Scene {}: searching for '{}'", scene.index, keywords));
    let url = clips
        .search(&keywords)
        .await
        .with_context(|| format!("Search failed for scene {}", scene.index))?;
    Ok(ClipReference {
        index: scene.index,
        url,
    })
}

pub async fn acquire_clip(
    settings: &Settings,
    services: &Services<'_>,
    reference: &ClipReference,
) -> Result<SceneClip> {
    let index = reference.index;
    let Some(url) = reference.url.as_deref() else {
        logw(format!(
            "No video found for scene {}, using a {}s black clip.",
            index, settings.scene_duration_secs
        ));
        let black = settings.placeholder_clip_path(index);
        services
            .media
            .color_clip(settings, &black)
            .await
            .with_context(|| format!("Placeholder clip failed for scene {}", index))?;
        return Ok(SceneClip {
            index,
            path: black,
            origin: ClipOrigin::Placeholder,
        });
    };

    let raw = settings.raw_clip_path(index);
    services
        .clips
        .download(url, &raw)
        .await
        .with_context(|| format!("Download failed for scene {}", index))?;
    Ok(SceneClip {
        index,
        path: raw,
        origin: ClipOrigin::Downloaded,
    })
}

/// Placeholders are generated at the target format already and pass through.
pub async fn normalize_clip(
    settings: &Settings,
    media: &dyn MediaTranscoder,
    clip: SceneClip,
) -> Result<SceneClip> {
    if clip.origin == ClipOrigin::Placeholder {
        return Ok(clip);
    }
    let trimmed = settings.trimmed_clip_path(clip.index);
    media
        .normalize_clip(settings, &clip.path, &trimmed)
        .await
        .with_context(|| format!("Normalize failed for scene {}", clip.index))?;
    Ok(SceneClip {
        path: trimmed,
        ..clip
    })
}

pub async fn concatenate(
    settings: &Settings,
    media: &dyn MediaTranscoder,
    clips: &[SceneClip],
) -> Result<(PathBuf, PathBuf)> {
    let list_txt = settings.manifest_path();
    let paths: Vec<PathBuf> = clips.iter().map(|c| c.path.clone()).collect();
    manifest::write(&list_txt, &paths).await?;

    let combined = settings.combined_path();
    logi(format!("Concatenating {} clips -> {}", clips.len(), combined.display()));
    media.concat(&list_txt, &combined).await.context("Concat failed")?;
    logok(format!("Concat OK: {}", combined.display()));
    Ok((list_txt, combined))
}

pub async fn narrate(
    settings: &Settings,
    speech: &dyn SpeechSynthesizer,
    scenes: &[Scene],
) -> Result<PathBuf> {
    let text = script::narration_text(scenes);
    let audio = settings.narration_path();
    logi(format!(
        "Synthesizing narration ({} chars, lang={}) -> {}",
        text.chars().count(),
        settings.language,
        audio.display()
    ));
    speech
        .synthesize(&text, &settings.language, &audio)
        .await
        .context("Narration failed")?;
    logok(format!("Narration OK: {}", audio.display()));
    Ok(audio)
}

/// Load the script, then run every stage. Script problems surface before
/// any service or tool is touched.
pub async fn run_generation(settings: &Settings, services: &Services<'_>) -> Result<RunSummary> {
    let scenes = script::load_scenes(&settings.script_file).await?;
    logi(format!(
        "Loaded {} scenes from {}",
        scenes.len(),
        settings.script_file.display()
    ));
    generate(settings, services, &scenes).await
}

pub async fn generate(
    settings: &Settings,
    services: &Services<'_>,
    scenes: &[Scene],
) -> Result<RunSummary> {
    init::ensure_directories(settings).await?;

    let mut clips = Vec::with_capacity(scenes.len());
    for scene in scenes {
        let reference = resolve_scene(settings, services.clips, scene).await?;
        let clip = acquire_clip(settings, services, &reference).await?;
        let downloaded = clip.origin == ClipOrigin::Downloaded;
        let clip = normalize_clip(settings, services.media, clip).await?;
        logok(format!("Scene {} ready: {}", clip.index, clip.path.display()));
        clips.push(clip);

        if downloaded {
            tokio::time::sleep(settings.scene_pause()).await;
        }
    }

    let (manifest, combined) = concatenate(settings, services.media, &clips).await?;
    let narration = narrate(settings, services.speech, scenes).await?;

    let final_video = settings.final_path();
    logi(format!("Muxing -> {}", final_video.display()));
    services
        .media
        .mux(&combined, &narration, &final_video)
        .await
        .context("Mux failed")?;
    logok(format!("Done! final video at: {}", final_video.display()));

    Ok(RunSummary {
        clips,
        manifest,
        combined,
        narration,
        final_video,
    })
}
