//! Predictor configuration.
//!
//! ```yaml
//! provider: gemini
//! model: gemini-2.5-flash-preview-04-17
//! base_url: https://generativelanguage.googleapis.com/v1beta   # optional
//! api_key: AIza...                                             # optional, falls back to GEMINI_API_KEY
//! replay_file: reply.json                                      # replay provider only
//! ```
//!
//! Sampling temperature and response MIME type are fixed; see
//! [`SAMPLING_TEMPERATURE`](crate::providers::SAMPLING_TEMPERATURE).

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::providers::{GenerationConfig, DEFAULT_MODEL};

/// Errors loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Which provider to use and how to reach it.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PredictorConfig {
    /// Provider type registered in the [`ProviderRegistry`](crate::ProviderRegistry)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Custom API endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// API key; when absent the provider reads its environment variable
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Recorded reply for the replay provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replay_file: Option<PathBuf>,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: DEFAULT_MODEL.to_string(),
            base_url: None,
            api_key: None,
            replay_file: None,
        }
    }
}

impl fmt::Debug for PredictorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictorConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("replay_file", &self.replay_file)
            .finish()
    }
}

impl PredictorConfig {
    /// Parse from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a file; `.json` is parsed as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    /// Load from a file, or fall back to defaults if it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Settings handed to the provider factory.
    pub fn provider_settings(&self) -> JsonValue {
        let mut settings = serde_json::Map::new();
        settings.insert("model".to_string(), JsonValue::from(self.model.clone()));

        if let Some(url) = &self.base_url {
            settings.insert("base_url".to_string(), JsonValue::from(url.clone()));
        }
        if let Some(key) = &self.api_key {
            settings.insert("api_key".to_string(), JsonValue::from(key.clone()));
        }
        if let Some(path) = &self.replay_file {
            settings.insert(
                "replay_file".to_string(),
                JsonValue::from(path.to_string_lossy().into_owned()),
            );
        }

        JsonValue::Object(settings)
    }

    /// Per-request generation settings.
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig::json_for(self.model.clone())
    }
}
