//! Subprocess handling, exercised with stand-in renderer executables.
#![cfg(unix)]

use demrelief_scene::{BlenderRunner, RenderConfig, RenderJob, SceneError};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fake_renderer(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

// A single test so no other thread forks while a stand-in is open for writing.
#[test]
fn test_runner_outcomes() {
    let dir = TempDir::new().unwrap();
    let dem = dir.path().join("dem.png");
    image::GrayImage::new(16, 8).save(&dem).unwrap();
    let output = dir.path().join("relief.png");
    let job = RenderJob::prepare(&dem, &output, RenderConfig::default()).unwrap();

    // Blender missing.
    let err = BlenderRunner::new(dir.path().join("no-such-blender"))
        .render(&job)
        .unwrap_err();
    assert!(matches!(err, SceneError::Spawn { .. }));

    // Script raised.
    let failing = fake_renderer(
        dir.path(),
        "failing",
        "echo 'Traceback: KeyError' >&2\nexit 1",
    );
    let err = BlenderRunner::new(failing).render(&job).unwrap_err();
    match err {
        SceneError::RendererFailed { status, stderr } => {
            assert_eq!(status, Some(1));
            assert!(stderr.contains("KeyError"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // Clean exit without an image.
    let silent = fake_renderer(dir.path(), "silent", "exit 0");
    let err = BlenderRunner::new(silent).render(&job).unwrap_err();
    assert!(matches!(err, SceneError::OutputMissing(path) if path == job.output_path));

    // Arguments arrive unsplit and the image is written.
    let args_log = dir.path().join("args.txt");
    let working = fake_renderer(
        dir.path(),
        "working",
        &format!(
            "printf '%s\\n' \"$1\" \"$2\" \"$3\" \"$4\" \"$5\" > '{}'\ntouch '{}'",
            args_log.display(),
            job.output_path.display()
        ),
    );
    let rendered = BlenderRunner::new(working).render(&job).unwrap();
    assert_eq!(rendered, job.output_path);
    assert!(output.is_file());

    let args = fs::read_to_string(&args_log).unwrap();
    assert_eq!(
        args.lines().collect::<Vec<_>>(),
        vec![
            "--background",
            "--factory-startup",
            "--python-exit-code",
            "1",
            "--python-expr"
        ]
    );

    // An image from the previous run does not count as output.
    assert!(output.is_file());
    let silent = dir.path().join("silent");
    let err = BlenderRunner::new(silent).render(&job).unwrap_err();
    assert!(matches!(err, SceneError::OutputMissing(_)));
    assert!(!output.exists());
}
