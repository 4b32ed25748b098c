use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use genai::{DEFAULT_BASE_URL, DEFAULT_MODEL, GenAiConfig, config::DEFAULT_TIMEOUT_SECS};
use lifecycle::{ErrorReporter, MaskPolicy};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "neongen.toml";

#[derive(Error, Debug)]
pub enum StudioError {
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Config file not found: {0}")]
    MissingConfig(PathBuf),
}

/// Settings for the command-line studio.
///
/// The API key is never part of this file; it only comes from the environment.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StudioConfig {
    pub model: String,
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// Where results are written when no explicit output path is given
    pub output_dir: PathBuf,
    pub brush_width: Option<f32>,
    #[schemars(with = "String")]
    pub mask_policy: MaskPolicy,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            output_dir: PathBuf::from("."),
            brush_width: None,
            mask_policy: MaskPolicy::default(),
        }
    }
}

impl StudioConfig {
    /// Load StudioConfig from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, StudioError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load StudioConfig from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, StudioError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, StudioError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// An explicit path must exist; otherwise `neongen.toml` is used if present
    pub fn load(explicit: Option<&Path>) -> Result<Self, StudioError> {
        match explicit {
            Some(path) if !path.exists() => Err(StudioError::MissingConfig(path.to_path_buf())),
            Some(path) => Self::from_toml_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_toml_file(DEFAULT_CONFIG_FILE)
            }
            None => Ok(Self::default()),
        }
    }

    /// Layer the file's endpoint settings over a credential-bearing config
    pub fn apply_to(&self, base: GenAiConfig) -> GenAiConfig {
        base.with_model(self.model.as_str())
            .with_base_url(self.base_url.as_str())
            .with_timeout(Duration::from_secs(self.request_timeout_secs))
    }

    pub fn genai_config(&self) -> GenAiConfig {
        self.apply_to(GenAiConfig::from_env())
    }
}

/// Sends user-facing failure messages to the log
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, message: &str) {
        tracing::error!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config() {
        let config = StudioConfig::from_toml(
            r#"
            model = "gemini-2.5-flash-image-preview"
            base_url = "http://localhost:8080/v1beta/"
            request_timeout_secs = 30
            output_dir = "out"
            brush_width = 35.0
            mask_policy = "attach"
            "#,
        )
        .unwrap();

        assert_eq!(config.mask_policy, MaskPolicy::Attach);
        assert_eq!(config.brush_width, Some(35.0));
        assert_eq!(config.output_dir, PathBuf::from("out"));

        let genai = config.apply_to(GenAiConfig::new("key"));
        assert_eq!(genai.base_url, "http://localhost:8080/v1beta");
        assert_eq!(genai.request_timeout, Duration::from_secs(30));
        assert_eq!(
            genai.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash-image-preview:generateContent"
        );
        assert!(genai.has_credential());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        assert_eq!(StudioConfig::from_toml("").unwrap(), StudioConfig::default());
    }

    #[test]
    fn test_api_key_not_accepted_from_file() {
        assert!(StudioConfig::from_toml(r#"api_key = "secret""#).is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studio.toml");
        let config = StudioConfig {
            brush_width: Some(12.0),
            ..StudioConfig::default()
        };
        fs::write(&path, config.to_toml().unwrap()).unwrap();

        assert_eq!(StudioConfig::load(Some(&path)).unwrap(), config);
        assert!(matches!(
            StudioConfig::load(Some(&dir.path().join("missing.toml"))),
            Err(StudioError::MissingConfig(_))
        ));
    }
}
