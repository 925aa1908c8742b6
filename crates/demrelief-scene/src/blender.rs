//! Entry points that hand the scene to Blender.

use crate::error::{Result, SceneError};
use crate::scene::{build_scene, RenderJob, SceneTemplate};
use crate::script::BlenderScript;
use demrelief_dem::validate::check_output_path;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Executable looked up on `PATH` when none is configured.
pub const DEFAULT_EXECUTABLE: &str = "blender";

/// Extensions accepted for a written script.
pub const SCRIPT_EXTENSIONS: &[&str] = &["py"];

/// Lines of renderer stderr kept in [`SceneError::RendererFailed`].
const STDERR_TAIL_LINES: usize = 20;

/// Generate the Python program that builds `job`'s scene on top of `template`.
pub fn render_script(job: &RenderJob, template: &SceneTemplate) -> Result<String> {
    let mut script = BlenderScript::new();
    build_scene(&mut script, template, job)?;
    Ok(script.into_script())
}

/// Write the render program to `path` for running inside an open Blender session.
///
/// The script assumes the factory startup scene.
pub fn write_render_script<P: AsRef<Path>>(job: &RenderJob, path: P) -> Result<()> {
    let path = path.as_ref();
    check_output_path(path, SCRIPT_EXTENSIONS)?;
    let script = render_script(job, &SceneTemplate::default_startup())?;
    std::fs::write(path, script)?;
    info!(path = %path.display(), "render script written");
    Ok(())
}

/// Runs Blender headless as a child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlenderRunner {
    executable: PathBuf,
}

impl Default for BlenderRunner {
    fn default() -> Self {
        Self::new(DEFAULT_EXECUTABLE)
    }
}

impl BlenderRunner {
    pub fn new<P: Into<PathBuf>>(executable: P) -> Self {
        BlenderRunner {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Render `job` and wait for Blender to exit.
    ///
    /// Blender starts from its factory settings so user preferences and
    /// startup files cannot change the scene. Returns the output path.
    pub fn render(&self, job: &RenderJob) -> Result<PathBuf> {
        let script = render_script(job, &SceneTemplate::default_startup())?;
        remove_stale_output(&job.output_path)?;

        info!(
            executable = %self.executable.display(),
            dem = %job.dem_path.display(),
            output = %job.output_path.display(),
            "starting renderer"
        );
        let output = Command::new(&self.executable)
            .args([
                "--background",
                "--factory-startup",
                "--python-exit-code",
                "1",
                "--python-expr",
            ])
            .arg(&script)
            .output()
            .map_err(|source| SceneError::Spawn {
                executable: self.executable.clone(),
                source,
            })?;
        debug!(status = ?output.status.code(), "renderer exited");

        if !output.status.success() {
            return Err(SceneError::RendererFailed {
                status: output.status.code(),
                stderr: tail(&String::from_utf8_lossy(&output.stderr), STDERR_TAIL_LINES),
            });
        }
        if !job.output_path.is_file() {
            return Err(SceneError::OutputMissing(job.output_path.clone()));
        }

        info!(output = %job.output_path.display(), "render complete");
        Ok(job.output_path.clone())
    }
}

/// Delete an image left by an earlier run so only a fresh render counts.
fn remove_stale_output(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed previous render");
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.trim_end().lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}
