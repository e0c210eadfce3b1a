use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use converter_core::{ResizePolicy, SUCCESS_DISPLAY_WINDOW};
use converter_engine::{ClientSettings, EngineConfig, DEFAULT_ENDPOINT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::args::Args;

pub const DEFAULT_CONFIG_FILE: &str = "converter.ron";
pub const DEFAULT_LOG_FILE: &str = "converter.log";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid duration for {field}: {value}")]
    InvalidDuration { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub endpoint: String,
    pub output_dir: PathBuf,
    pub connect_timeout_secs: Option<f64>,
    pub request_timeout_secs: Option<f64>,
    pub max_archive_bytes: Option<u64>,
    pub preserve_links_on_resize: bool,
    pub success_display_secs: f64,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            output_dir: PathBuf::from("."),
            connect_timeout_secs: None,
            request_timeout_secs: None,
            max_archive_bytes: None,
            preserve_links_on_resize: false,
            success_display_secs: SUCCESS_DISPLAY_WINDOW.as_secs_f64(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

/// Load the explicit config file, or `converter.ron` from the working
/// directory when it exists, or fall back to defaults.
pub fn load(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {
            return Ok(AppConfig::default());
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };

    parse(&content, &path)
}

pub fn parse(content: &str, path: &Path) -> Result<AppConfig, ConfigError> {
    ron::from_str(content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

impl AppConfig {
    /// Command-line flags win over file values.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(endpoint) = &args.endpoint {
            self.endpoint = endpoint.clone();
        }
        if let Some(output_dir) = &args.output_dir {
            self.output_dir = output_dir.clone();
        }
        if args.preserve_links {
            self.preserve_links_on_resize = true;
        }
    }

    pub fn resize_policy(&self) -> ResizePolicy {
        if self.preserve_links_on_resize {
            ResizePolicy::Preserve
        } else {
            ResizePolicy::Discard
        }
    }

    pub fn success_window(&self) -> Result<Duration, ConfigError> {
        secs_to_duration("success_display_secs", self.success_display_secs)
    }

    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        let connect_timeout = self
            .connect_timeout_secs
            .map(|secs| secs_to_duration("connect_timeout_secs", secs))
            .transpose()?;
        let request_timeout = self
            .request_timeout_secs
            .map(|secs| secs_to_duration("request_timeout_secs", secs))
            .transpose()?;

        Ok(EngineConfig {
            client: ClientSettings {
                endpoint: self.endpoint.clone(),
                connect_timeout,
                request_timeout,
                max_bytes: self.max_archive_bytes,
            },
            output_dir: self.output_dir.clone(),
        })
    }
}

fn secs_to_duration(field: &'static str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|_| ConfigError::InvalidDuration { field, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_default_file_yields_defaults() {
        // Tests run from the crate directory, which has no converter.ron.
        assert_eq!(load(None).unwrap(), AppConfig::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = load(Some(&temp.path().join("nope.ron"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("converter.ron");
        fs::write(
            &path,
            r#"(endpoint: "http://convert.local:8080", request_timeout_secs: Some(90.0))"#,
        )
        .unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.endpoint, "http://convert.local:8080");
        assert_eq!(config.request_timeout_secs, Some(90.0));
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.success_display_secs, 3.0);
        assert!(!config.preserve_links_on_resize);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let err = parse("(endpoint: 5", Path::new("bad.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn flags_override_file_values() {
        let mut config = AppConfig {
            endpoint: "http://from-file".to_string(),
            ..AppConfig::default()
        };
        let args = Args::parse_from([
            "converter",
            "--endpoint",
            "http://from-flag",
            "--output-dir",
            "out",
            "--preserve-links",
            "x",
        ]);

        config.apply_args(&args);
        assert_eq!(config.endpoint, "http://from-flag");
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.resize_policy(), ResizePolicy::Preserve);
    }

    #[test]
    fn engine_config_leaves_timeouts_unset_by_default() {
        let engine = AppConfig::default().engine_config().unwrap();
        assert_eq!(engine.client.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(engine.client.connect_timeout, None);
        assert_eq!(engine.client.request_timeout, None);
        assert_eq!(engine.client.max_bytes, None);
    }

    #[test]
    fn negative_timeout_is_rejected() {
        let config = AppConfig {
            connect_timeout_secs: Some(-1.0),
            ..AppConfig::default()
        };
        assert!(matches!(
            config.engine_config(),
            Err(ConfigError::InvalidDuration {
                field: "connect_timeout_secs",
                ..
            })
        ));
        assert_eq!(
            AppConfig::default().success_window().unwrap(),
            SUCCESS_DISPLAY_WINDOW
        );
    }
}
