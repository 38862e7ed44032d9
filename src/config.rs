// Configuration for the upload workflow.
//
// Values come from an optional TOML file and are then overridden by
// environment variables and command-line flags in `main.rs`.
//
// ```toml
// [api]
// url = "https://api.sketchfab.com/v3"
// token = "..."
// auth_scheme = "token"
//
// [model]
// file = "./data/pikachu.zip"
// name = "A Bob model"
// tags = ["bob", "character"]
// categories = ["people"]
// license = "CC Attribution-ShareAlike"
//
// [polling]
// max_retries = 50
// max_errors = 10
// retry_interval_secs = 5
//
// [patch.metadata]
// name = "A super Bob model"
//
// [patch.options]
// shading = "shadeless"
// background = { color = "#FFFFFF" }
// orientation = { axis = [1, 1, 0], angle = 34 }
//
// [logging]
// level = "info"
// format = "text"
// ```

use crate::error::{Error, Result};
use crate::model::{ModelMetadata, ModelPatch, ViewOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.sketchfab.com/v3";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub model: ModelConfig,
    pub polling: PollingConfig,
    pub patch: PatchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL; `/models` is appended for uploads.
    pub url: String,
    pub token: Option<String>,
    pub auth_scheme: AuthScheme,
    /// Per-request timeout. Unset means requests may block indefinitely.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_API_URL.to_string(),
            token: None,
            auth_scheme: AuthScheme::Token,
            request_timeout_secs: None,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Prefix used in the `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// `Authorization: Token <key>`, for API tokens from the account settings.
    Token,
    /// `Authorization: Bearer <key>`, for OAuth access tokens.
    Bearer,
}

impl AuthScheme {
    pub fn header_value(self, token: &str) -> String {
        match self {
            AuthScheme::Token => format!("Token {}", token),
            AuthScheme::Bearer => format!("Bearer {}", token),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the model file or archive to upload.
    pub file: Option<PathBuf>,
    #[serde(flatten)]
    pub metadata: ModelMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Attempts before polling gives up.
    pub max_retries: u32,
    /// Cumulative failed attempts before polling gives up.
    pub max_errors: u32,
    pub retry_interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            max_retries: 50,
            max_errors: 10,
            retry_interval_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchConfig {
    /// Set to false to stop once processing succeeded.
    pub enabled: bool,
    pub metadata: ModelPatch,
    pub options: ViewOptions,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            metadata: ModelPatch::default(),
            options: ViewOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read a config file. The file must exist.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load the explicit path if one is given, otherwise the default
    /// location when it exists, otherwise built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Upload endpoint, `{api}/models`.
    pub fn models_endpoint(&self) -> String {
        format!("{}/models", self.api.url.trim_end_matches('/'))
    }

    /// Checks that must hold before any request is made.
    pub fn validate(&self) -> Result<()> {
        if self.api.url.trim().is_empty() {
            return Err(Error::Config("api.url must not be empty".into()));
        }
        if self.model.file.is_none() {
            return Err(Error::Config("no model file given".into()));
        }
        if self.polling.max_retries == 0 {
            return Err(Error::Config("polling.max_retries must be at least 1".into()));
        }
        if self.polling.max_errors == 0 {
            return Err(Error::Config("polling.max_errors must be at least 1".into()));
        }
        Ok(())
    }
}

/// `<config dir>/sketchfab-uploader/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sketchfab-uploader").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Background, Orientation};
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.url, DEFAULT_API_URL);
        assert_eq!(config.api.auth_scheme, AuthScheme::Token);
        assert!(config.api.request_timeout().is_none());
        assert_eq!(config.polling.max_retries, 50);
        assert_eq!(config.polling.max_errors, 10);
        assert_eq!(config.polling.retry_interval_secs, 5);
        assert!(config.patch.enabled);
        assert_eq!(config.patch.metadata, ModelPatch::default());
        assert_eq!(config.patch.options, ViewOptions::default());
        assert!(config.model.metadata.is_inspectable);
        assert!(!config.model.metadata.is_published);
    }

    #[test]
    fn test_full_toml() {
        let config = Config::from_toml_str(
            r##"
            [api]
            url = "http://localhost:9000/v3/"
            token = "abc"
            auth_scheme = "bearer"
            request_timeout_secs = 30

            [model]
            file = "model.ply"
            name = "A Bob model"
            tags = ["bob", "character", "video-games"]
            categories = ["people"]
            license = "CC Attribution-ShareAlike"
            is_published = true

            [polling]
            max_retries = 3
            retry_interval_secs = 1

            [patch]
            enabled = false

            [patch.metadata]
            name = "A super Bob model"

            [patch.options]
            shading = "shadeless"
            background = { color = "#FFFFFF" }
            orientation = { axis = [1, 1, 0], angle = 34 }

            [logging]
            level = "debug"
            format = "json"
            "##,
        )
        .unwrap();

        assert_eq!(config.api.token.as_deref(), Some("abc"));
        assert_eq!(config.api.auth_scheme, AuthScheme::Bearer);
        assert_eq!(config.api.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.models_endpoint(), "http://localhost:9000/v3/models");
        assert_eq!(config.model.file, Some(PathBuf::from("model.ply")));
        assert_eq!(config.model.metadata.name.as_deref(), Some("A Bob model"));
        assert_eq!(config.model.metadata.tags.len(), 3);
        assert!(config.model.metadata.is_published);
        assert!(config.model.metadata.is_inspectable);
        assert_eq!(config.polling.max_retries, 3);
        assert_eq!(config.polling.max_errors, 10);
        assert!(!config.patch.enabled);
        assert_eq!(
            config.patch.metadata.name.as_deref(),
            Some("A super Bob model")
        );
        assert_eq!(
            config.patch.options.background,
            Some(Background {
                color: "#FFFFFF".into()
            })
        );
        assert_eq!(
            config.patch.options.orientation,
            Some(Orientation::AxisAngle {
                axis: [1.0, 1.0, 0.0],
                angle: 34.0
            })
        );
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::from_toml_str("[polling]\nmax_retries = \"many\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\ntoken = \"from-file\"").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.api.token.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(dir.path().join("nope.toml").as_path())).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config.model.file = Some(PathBuf::from("model.zip"));
        assert!(config.validate().is_ok());

        config.polling.max_errors = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_auth_header_value() {
        assert_eq!(AuthScheme::Token.header_value("k"), "Token k");
        assert_eq!(AuthScheme::Bearer.header_value("k"), "Bearer k");
    }
}
