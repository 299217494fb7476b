use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use script_reel::api::{SpeechSynthesizer, http_client};
use script_reel::api::elevenlabs::ElevenLabsTts;
use script_reel::api::gtts::GoogleTts;
use script_reel::api::pexels::PexelsClient;
use script_reel::ffmpeg::Ffmpeg;
use script_reel::generator::generate;
use script_reel::{Config, ConfigError, Services, Settings, init, script};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Narrator {
    Gtts,
    Elevenlabs,
}

#[derive(Parser, Debug)]
#[command(name = "script-reel")]
#[command(about = "Turn a line-per-scene script into a narrated stock-footage video", long_about = None)]
struct Args {
    /// Script file, one scene per line
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// JSON file overriding pipeline settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Speech backend for the narration track
    #[arg(long, value_enum, default_value_t = Narrator::Gtts)]
    narrator: Narrator,

    /// Clear the clips directory before running
    #[arg(long)]
    fresh: bool,
}

async fn run(args: Args) -> Result<()> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path).await?,
        None => Settings::default(),
    };
    if let Some(script) = args.script {
        settings.script_file = script;
    }

    let cfg = Config::from_env(settings)?;
    let scenes = script::load_scenes(&cfg.settings.script_file).await?;
    info!(
        "Loaded {} scenes from {}",
        scenes.len(),
        cfg.settings.script_file.display()
    );
    let client = http_client(&cfg.settings)?;

    let speech: Box<dyn SpeechSynthesizer> = match args.narrator {
        Narrator::Gtts => Box::new(GoogleTts::new(client.clone(), &cfg)),
        Narrator::Elevenlabs => Box::new(ElevenLabsTts::new(client.clone(), &cfg)?),
    };
    let clips = PexelsClient::new(client, &cfg);
    let media = Ffmpeg::default();

    if args.fresh {
        init::clear_directory_contents(&cfg.settings.clips_dir).await?;
        info!("Cleared {}", cfg.settings.clips_dir.display());
    }
    init::check_ffmpeg(media.program()).await;

    let services = Services {
        clips: &clips,
        media: &media,
        speech: speech.as_ref(),
    };
    let summary = generate(&cfg.settings, &services, &scenes).await?;
    info!(
        "{} scenes, manifest {}, combined {}, narration {}, final {}",
        summary.clips.len(),
        summary.manifest.display(),
        summary.combined.display(),
        summary.narration.display(),
        summary.final_video.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(cfg_err) = err.downcast_ref::<ConfigError>() {
                error!("{}", cfg_err);
            } else {
                error!("{:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}
