//! YAML configuration with defaults for every field.

use crate::error::{Result, RunnerError};
use demrelief_dem::fetch::DEFAULT_TIMEOUT;
use demrelief_dem::{Dataset, OPENTOPOGRAPHY_URL};
use demrelief_scene::{RenderConfig, DEFAULT_EXECUTABLE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the OpenTopography API key.
pub const API_KEY_ENV: &str = "OPENTOPOGRAPHY_API_KEY";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Elevation API settings.
    pub api: ApiConfig,
    /// Render parameters used when no flag overrides them.
    pub render: RenderConfig,
    /// Renderer executable.
    pub blender: BlenderConfig,
    /// Logging settings.
    pub log: LogConfig,
}

/// OpenTopography API configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Global DEM endpoint.
    pub base_url: String,
    /// API key; falls back to the `OPENTOPOGRAPHY_API_KEY` environment variable.
    pub api_key: Option<String>,
    /// Dataset requested when `--dataset` is not given.
    pub dataset: Dataset,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Blender configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BlenderConfig {
    /// Path to (or name on `PATH` of) the Blender executable.
    pub executable: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive (error, warn, info, debug, trace or a full `RUST_LOG` string).
    pub level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: OPENTOPOGRAPHY_URL.to_string(),
            api_key: None,
            dataset: Dataset::default(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Default for BlenderConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_EXECUTABLE),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load `path`, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path).map_err(|source| RunnerError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents).map_err(|source| RunnerError::ParseConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse YAML; missing fields keep their defaults.
    pub fn from_yaml(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }

    /// Take the API key from the environment value when one is set.
    pub fn apply_env_api_key(&mut self, value: Option<String>) {
        if let Some(key) = value.filter(|k| !k.trim().is_empty()) {
            self.api.api_key = Some(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, OPENTOPOGRAPHY_URL);
        assert_eq!(config.api.dataset, Dataset::SrtmGl1);
        assert_eq!(config.api.timeout(), Duration::from_secs(300));
        assert_eq!(config.api.api_key, None);
        assert_eq!(config.render, RenderConfig::default());
        assert_eq!(config.blender.executable, PathBuf::from("blender"));
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_missing_field_uses_default() {
        let config =
            Config::from_yaml("api:\n  dataset: COP30\nrender:\n  samples: 64\n  sun_azimuth: 200\n")
                .unwrap();
        assert_eq!(config.api.dataset, Dataset::Cop30);
        assert_eq!(config.api.base_url, OPENTOPOGRAPHY_URL);
        assert_eq!(config.render.samples, 64);
        assert_eq!(config.render.sun_angle, 45.0);
        assert_eq!(config.render.sun_azimuth, 200.0);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
        assert_eq!(Config::from_yaml("\n  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.api.api_key = Some("key".to_string());
        config.render.exaggeration = 1.5;
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert_eq!(Config::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_unknown_dataset_is_parse_error() {
        assert!(Config::from_yaml("api:\n  dataset: SRTM90\n").is_err());
    }

    #[test]
    fn test_load_errors_name_the_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("missing.yaml");
        let err = Config::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, RunnerError::ReadConfig { .. }));
        assert!(err.to_string().contains("missing.yaml"));

        let bad = dir.path().join("bad.yaml");
        std::fs::write(&bad, "render: [1, 2").unwrap();
        assert!(matches!(
            Config::load(Some(&bad)),
            Err(RunnerError::ParseConfig { .. })
        ));
    }

    #[test]
    fn test_env_api_key() {
        let mut config = Config::default();
        config.apply_env_api_key(None);
        assert_eq!(config.api.api_key, None);
        config.apply_env_api_key(Some("  ".to_string()));
        assert_eq!(config.api.api_key, None);
        config.apply_env_api_key(Some("from-env".to_string()));
        assert_eq!(config.api.api_key.as_deref(), Some("from-env"));
    }
}
