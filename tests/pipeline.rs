//! End-to-end runs of the generator with deterministic stand-ins for the
//! search service, the media tool and the speech service.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use script_reel::api::{ClipSource, SpeechSynthesizer};
use script_reel::ffmpeg::MediaTranscoder;
use script_reel::generator::ClipOrigin;
use script_reel::{ConfigError, Services, Settings, run_generation};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

#[derive(Default)]
struct Calls(Mutex<Vec<String>>);

impl Calls {
    fn push(&self, call: String) {
        self.0.lock().unwrap().push(call);
    }

    fn all(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

struct FakeSource {
    results: HashMap<String, String>,
    fail_search: bool,
    calls: Calls,
}

impl FakeSource {
    fn with(results: &[(&str, &str)]) -> Self {
        Self {
            results: results
                .iter()
                .map(|(q, u)| (q.to_string(), u.to_string()))
                .collect(),
            fail_search: false,
            calls: Calls::default(),
        }
    }
}

#[async_trait]
impl ClipSource for FakeSource {
    async fn search(&self, query: &str) -> Result<Option<String>> {
        self.calls.push(format!("search {query}"));
        if self.fail_search {
            return Err(anyhow!("HTTP 503"));
        }
        Ok(self.results.get(query).cloned())
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        self.calls.push(format!("download {url}"));
        std::fs::write(dest, format!("DOWNLOADED {url}"))?;
        Ok(())
    }
}

#[derive(Default)]
struct FakeMedia {
    calls: Calls,
}

#[async_trait]
impl MediaTranscoder for FakeMedia {
    async fn color_clip(&self, settings: &Settings, out_mp4: &Path) -> Result<()> {
        self.calls.push("color".into());
        std::fs::write(
            out_mp4,
            format!("BLACK {} {}s", settings.frame_size(), settings.scene_duration_secs),
        )?;
        Ok(())
    }

    async fn normalize_clip(&self, settings: &Settings, in_mp4: &Path, out_mp4: &Path) -> Result<()> {
        self.calls.push("normalize".into());
        let raw = std::fs::read_to_string(in_mp4)?;
        std::fs::write(
            out_mp4,
            format!("TRIMMED {} {}s {raw}", settings.frame_size(), settings.scene_duration_secs),
        )?;
        Ok(())
    }

    async fn concat(&self, list_txt: &Path, out_mp4: &Path) -> Result<()> {
        self.calls.push("concat".into());
        let list = std::fs::read_to_string(list_txt)?;
        std::fs::write(out_mp4, list)?;
        Ok(())
    }

    async fn mux(&self, video_in: &Path, audio_in: &Path, out_mp4: &Path) -> Result<()> {
        self.calls.push("mux".into());
        let video = std::fs::read_to_string(video_in)?;
        let audio = std::fs::read_to_string(audio_in)?;
        std::fs::write(out_mp4, format!("{video}+{audio}"))?;
        Ok(())
    }
}

#[derive(Default)]
struct FakeSpeech {
    texts: Calls,
}

#[async_trait]
impl SpeechSynthesizer for FakeSpeech {
    async fn synthesize(&self, text: &str, language: &str, out_path: &Path) -> Result<()> {
        self.texts.push(text.to_string());
        std::fs::write(out_path, format!("AUDIO[{language}]"))?;
        Ok(())
    }
}

fn settings_in(dir: &TempDir) -> Settings {
    Settings {
        script_file: dir.path().join("script.txt"),
        clips_dir: dir.path().join("clips"),
        output_dir: dir.path().join("output"),
        scene_pause_ms: 0,
        ..Settings::default()
    }
}

fn write_script(settings: &Settings, text: &str) {
    std::fs::write(&settings.script_file, text).unwrap();
}

#[tokio::test]
async fn two_found_scenes_produce_full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(&dir);
    write_script(&settings, "a cat playing\n\na dog running\n");

    let source = FakeSource::with(&[
        ("a cat playing", "https://videos.test/cat.mp4"),
        ("a dog running", "https://videos.test/dog.mp4"),
    ]);
    let media = FakeMedia::default();
    let speech = FakeSpeech::default();
    let services = Services {
        clips: &source,
        media: &media,
        speech: &speech,
    };

    let summary = run_generation(&settings, &services).await.unwrap();

    assert_eq!(summary.clips.len(), 2);
    for (i, clip) in summary.clips.iter().enumerate() {
        assert_eq!(clip.index, i + 1);
        assert_eq!(clip.origin, ClipOrigin::Downloaded);
        assert_eq!(clip.path, settings.trimmed_clip_path(i + 1));
    }
    assert!(settings.raw_clip_path(1).exists());
    assert!(settings.raw_clip_path(2).exists());
    let trimmed = std::fs::read_to_string(settings.trimmed_clip_path(2)).unwrap();
    assert_eq!(trimmed, "TRIMMED 1280x720 6s DOWNLOADED https://videos.test/dog.mp4");

    let manifest = std::fs::read_to_string(&summary.manifest).unwrap();
    assert_eq!(manifest, "file 'trimmed_1.mp4'\nfile 'trimmed_2.mp4'\n");

    assert_eq!(speech.texts.all(), vec!["a cat playing\na dog running".to_string()]);
    assert!(summary.combined.exists());
    assert!(summary.narration.exists());
    let final_video = std::fs::read_to_string(&summary.final_video).unwrap();
    assert!(final_video.ends_with("+AUDIO[en]"));

    assert_eq!(
        source.calls.all(),
        vec![
            "search a cat playing",
            "download https://videos.test/cat.mp4",
            "search a dog running",
            "download https://videos.test/dog.mp4",
        ]
    );
    assert_eq!(media.calls.all(), vec!["normalize", "normalize", "concat", "mux"]);
}

#[tokio::test]
async fn empty_search_uses_placeholder_and_still_finishes() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(&dir);
    write_script(&settings, "an impossible purple elephant on mars\n");

    let source = FakeSource::with(&[]);
    let media = FakeMedia::default();
    let speech = FakeSpeech::default();
    let services = Services {
        clips: &source,
        media: &media,
        speech: &speech,
    };

    let summary = run_generation(&settings, &services).await.unwrap();

    assert_eq!(summary.clips.len(), 1);
    let clip = &summary.clips[0];
    assert_eq!(clip.origin, ClipOrigin::Placeholder);
    assert_eq!(clip.path, settings.placeholder_clip_path(1));
    assert_eq!(std::fs::read_to_string(&clip.path).unwrap(), "BLACK 1280x720 6s");
    assert!(!settings.raw_clip_path(1).exists());

    assert_eq!(
        source.calls.all(),
        vec!["search an impossible purple elephant on mars"]
    );
    assert_eq!(media.calls.all(), vec!["color", "concat", "mux"]);
    assert_eq!(
        std::fs::read_to_string(&summary.manifest).unwrap(),
        "file 'black_1.mp4'\n"
    );
    assert!(summary.final_video.exists());
}

#[tokio::test]
async fn mixed_scenes_keep_source_order() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(&dir);
    write_script(
        &settings,
        "one two three four five six seven\nnothing here\nsunset over the sea\n",
    );

    let source = FakeSource::with(&[
        ("one two three four five six", "https://videos.test/1.mp4"),
        ("sunset over the sea", "https://videos.test/3.mp4"),
    ]);
    let media = FakeMedia::default();
    let speech = FakeSpeech::default();
    let services = Services {
        clips: &source,
        media: &media,
        speech: &speech,
    };

    let summary = run_generation(&settings, &services).await.unwrap();

    let origins: Vec<_> = summary.clips.iter().map(|c| c.origin).collect();
    assert_eq!(
        origins,
        vec![ClipOrigin::Downloaded, ClipOrigin::Placeholder, ClipOrigin::Downloaded]
    );
    assert_eq!(
        std::fs::read_to_string(&summary.manifest).unwrap(),
        "file 'trimmed_1.mp4'\nfile 'black_2.mp4'\nfile 'trimmed_3.mp4'\n"
    );
    assert_eq!(
        speech.texts.all(),
        vec!["one two three four five six seven\nnothing here\nsunset over the sea".to_string()]
    );
}

#[tokio::test]
async fn blank_or_missing_script_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(&dir);

    let source = FakeSource::with(&[]);
    let media = FakeMedia::default();
    let speech = FakeSpeech::default();
    let services = Services {
        clips: &source,
        media: &media,
        speech: &speech,
    };

    let err = run_generation(&settings, &services).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::ScriptNotFound(_))
    ));

    write_script(&settings, "\n  \n\n");
    let err = run_generation(&settings, &services).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::EmptyScript(_))
    ));

    assert!(source.calls.all().is_empty());
    assert!(media.calls.all().is_empty());
    assert!(speech.texts.all().is_empty());
    assert!(!settings.clips_dir.exists());
}

#[tokio::test]
async fn search_failure_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(&dir);
    write_script(&settings, "a cat playing\na dog running\n");

    let mut source = FakeSource::with(&[("a cat playing", "https://videos.test/cat.mp4")]);
    source.fail_search = true;
    let media = FakeMedia::default();
    let speech = FakeSpeech::default();
    let services = Services {
        clips: &source,
        media: &media,
        speech: &speech,
    };

    let err = run_generation(&settings, &services).await.unwrap_err();
    assert!(format!("{err:#}").contains("HTTP 503"));
    assert_eq!(source.calls.all(), vec!["search a cat playing"]);
    assert!(media.calls.all().is_empty());
    assert!(speech.texts.all().is_empty());
}
