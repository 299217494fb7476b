use std::path::PathBuf;
use thiserror::Error;

/// Fatal preconditions detected before any network or subprocess activity.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Set {var} in the environment")]
    MissingApiKey { var: &'static str },

    #[error("Script file not found: {0} (one line = one scene)")]
    ScriptNotFound(PathBuf),

    #[error("No scenes found in {0}")]
    EmptyScript(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Invalid config {path}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{service} returned HTTP {status}")]
    Status {
        service: &'static str,
        status: u16,
    },

    #[error("{service} returned no audio")]
    EmptyAudio { service: &'static str },
}

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command failed ({status}): {program} {}", .args.join(" "))]
    Failed {
        program: String,
        args: Vec<String>,
        status: String,
    },
}
