//! Error types for scene construction and rendering.

use demrelief_dem::{DemError, InvalidInput};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for scene operations.
pub type Result<T> = std::result::Result<T, SceneError>;

/// Errors that can occur while building or rendering a scene.
#[derive(Debug, Error)]
pub enum SceneError {
    /// A caller-supplied argument failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    /// Reading the DEM image failed.
    #[error(transparent)]
    Dem(#[from] DemError),

    /// An object the scene template promised is not in the document.
    #[error("Scene object \"{0}\" expected by the template does not exist")]
    MissingObject(String),

    /// A handle that this host never issued.
    #[error("Unknown {kind} handle {id}")]
    UnknownHandle {
        /// Handle kind ("plane", "camera", ...).
        kind: &'static str,
        /// Handle id.
        id: u32,
    },

    /// The renderer executable could not be started.
    #[error("Failed to launch renderer \"{executable}\": {source}")]
    Spawn {
        /// Executable path.
        executable: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The renderer exited unsuccessfully.
    #[error("Renderer exited with status {status:?}: {stderr}")]
    RendererFailed {
        /// Exit code, `None` if killed by a signal.
        status: Option<i32>,
        /// Tail of the renderer's standard error.
        stderr: String,
    },

    /// The renderer exited cleanly but did not produce the image.
    #[error("Renderer finished but {0} was not written")]
    OutputMissing(PathBuf),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
