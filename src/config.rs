//! Configuration file handling for picam-control.
//!
//! Loads configuration from `~/.config/picam-control/config.toml` or a custom path.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::camera::{StillCaptureRequest, ToolPaths, VideoStreamRequest};

/// Configuration file structure.
///
/// Every section is optional; missing values fall back to the request defaults.
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolPaths,
    #[serde(default)]
    pub still: StillCaptureRequest,
    #[serde(default)]
    pub video: VideoStreamRequest,
}

/// Template written by `picam config init`.
pub const DEFAULT_CONFIG: &str = r#"# picam-control configuration

[tools]
# Still capture program
still = "raspistill"
# Video capture program
video = "raspivid"

[still]
width = 3280
height = 2464
# JPEG quality (0-100)
quality = 90
# Milliseconds before the picture is taken (must be > 0)
timeout_ms = 300
# jpg, bmp, gif, png
encoding = "jpg"
preview = false

[still.adjustments]
# rotation = 180
# horizontal_flip = false
# vertical_flip = false

[video]
width = 1920
height = 1080
# 0 streams until stopped
timeout_ms = 0
bitrate = 17000000
framerate = 30
# baseline, main, high
profile = "high"
inline_headers = true
preview = false
"#;

impl Config {
    /// Load configuration.
    ///
    /// With `None`, reads the default path and returns defaults if that file
    /// doesn't exist. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = default_path();
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    log::debug!("No config file at {}, using defaults", path.display());
                    Ok(Config::default())
                }
            }
        }
    }

    /// Load and parse a specific config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("picam-control").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/picam-control/config.toml")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{H264Profile, ImageEncoding};
    use tempfile::TempDir;

    #[test]
    fn test_default_config_template_parses_to_defaults() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.tools, ToolPaths::default());
        assert_eq!(config.still, StillCaptureRequest::default());
        assert_eq!(config.video, VideoStreamRequest::default());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[tools]
still = "/opt/vc/bin/raspistill"

[still]
encoding = "png"

[video]
profile = "baseline"
timeout_ms = 5000
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.tools.still, "/opt/vc/bin/raspistill");
        assert_eq!(config.tools.video, "raspivid");
        assert_eq!(config.still.encoding, ImageEncoding::Png);
        assert_eq!(config.video.profile, H264Profile::Baseline);
        assert_eq!(config.video.timeout_ms, 5000);
    }

    #[test]
    fn test_load_missing_explicit_file_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");
        let result = Config::load(Some(&path));
        assert!(matches!(result, Err(ConfigError::IoError { .. })));
    }

    #[test]
    fn test_load_invalid_toml_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[still]\nencoding = \"tiff\"\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(format!("{}", err).contains("Failed to parse config file"));
    }

    #[test]
    fn test_default_path_ends_with_config_toml() {
        let path = default_path();
        assert!(path.ends_with("picam-control/config.toml"));
    }
}
