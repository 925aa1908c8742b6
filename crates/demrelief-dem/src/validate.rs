//! Input validation shared by every path-accepting operation.
//!
//! All checks are pure (apart from existence tests on the filesystem) and run
//! before any network or raster I/O.

use crate::error::InvalidInput;
use std::path::Path;

/// Extensions accepted for GeoTIFF elevation rasters.
pub const GEOTIFF_EXTENSIONS: &[&str] = &["tif", "tiff"];

/// Extensions accepted for viewable images (and GeoTIFFs).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "bmp", "tif", "tiff"];

/// Extensions accepted for rendered and plotted output.
pub const RENDER_EXTENSIONS: &[&str] = &["png"];

/// Check that a path only contains characters from `[a-zA-Z0-9_\-\\/.\s:]`.
pub fn check_characters(path: &Path) -> Result<(), InvalidInput> {
    let text = path.to_string_lossy();
    let valid = text.chars().all(|c| {
        c.is_ascii_alphanumeric()
            || matches!(c, '_' | '-' | '\\' | '/' | '.' | ':')
            || c.is_whitespace()
    });
    if valid {
        Ok(())
    } else {
        Err(InvalidInput::InvalidCharacters(text.into_owned()))
    }
}

/// Check that the path's extension is one of `allowed` (case-insensitive).
pub fn check_extension(path: &Path, allowed: &[&str]) -> Result<(), InvalidInput> {
    let matches = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        .unwrap_or(false);
    if matches {
        Ok(())
    } else {
        Err(InvalidInput::UnsupportedExtension {
            path: path.display().to_string(),
            allowed: allowed
                .iter()
                .map(|a| format!(".{a}"))
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

/// Validate a path that an operation will read from.
pub fn check_input_path(path: &Path, allowed: &[&str]) -> Result<(), InvalidInput> {
    check_characters(path)?;
    if !path.is_file() {
        return Err(InvalidInput::MissingFile(path.display().to_string()));
    }
    check_extension(path, allowed)
}

/// Validate a path that an operation will create.
///
/// The parent directory must already exist; a bare file name refers to the
/// current directory.
pub fn check_output_path(path: &Path, allowed: &[&str]) -> Result<(), InvalidInput> {
    check_characters(path)?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        return Err(InvalidInput::MissingDirectory(path.display().to_string()));
    }
    check_extension(path, allowed)
}

/// Check that the path's extension is one of `candidates`.
pub(crate) fn has_extension(path: &Path, candidates: &[&str]) -> bool {
    check_extension(path, candidates).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_characters() {
        assert!(check_characters(Path::new("C:\\data\\dem file_1-a.tif")).is_ok());
        assert!(check_characters(Path::new("/tmp/out.tif")).is_ok());
    }

    #[test]
    fn test_rejects_invalid_characters() {
        for bad in ["/tmp/out;rm.tif", "/tmp/ö.tif", "/tmp/a'b.tif", "/tmp/$HOME.tif", "/tmp/\"x\".png"] {
            assert!(
                matches!(
                    check_characters(Path::new(bad)),
                    Err(InvalidInput::InvalidCharacters(_))
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_extension_case_insensitive() {
        assert!(check_extension(Path::new("a.TIF"), GEOTIFF_EXTENSIONS).is_ok());
        assert!(check_extension(Path::new("a.tiff"), GEOTIFF_EXTENSIONS).is_ok());
        assert!(check_extension(Path::new("a.png"), GEOTIFF_EXTENSIONS).is_err());
        assert!(check_extension(Path::new("a"), IMAGE_EXTENSIONS).is_err());
    }

    #[test]
    fn test_output_missing_directory() {
        let err = check_output_path(Path::new("/definitely/not/here/out.tif"), GEOTIFF_EXTENSIONS)
            .unwrap_err();
        assert!(matches!(err, InvalidInput::MissingDirectory(_)));
    }

    #[test]
    fn test_characters_checked_before_directory() {
        let err = check_output_path(Path::new("/not/here/o;ut.tif"), GEOTIFF_EXTENSIONS)
            .unwrap_err();
        assert!(matches!(err, InvalidInput::InvalidCharacters(_)));
    }

    #[test]
    fn test_input_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.tif");
        assert!(matches!(
            check_input_path(&path, GEOTIFF_EXTENSIONS),
            Err(InvalidInput::MissingFile(_))
        ));
    }
}
