//! Error types for the command-line runner.

use demrelief_dem::{DemError, InvalidInput};
use demrelief_plot::PlotError;
use demrelief_scene::SceneError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Failed to read the config file from disk.
    #[error("failed to read config {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config {path}: {source}")]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// No API key from flag, environment or config file.
    #[error(
        "no OpenTopography API key: pass --api-key, set {} or set api.api_key in the config file",
        crate::config::API_KEY_ENV
    )]
    MissingApiKey,

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    #[error(transparent)]
    Dem(#[from] DemError),

    #[error(transparent)]
    Plot(#[from] PlotError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Writing command output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to encode JSON output.
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for runner operations.
pub type Result<T> = std::result::Result<T, RunnerError>;
