//! Offline provider that answers every prompt with a recorded reply.
//!
//! Useful for exercising the full prediction flow without network access
//! or credentials, e.g. when replaying a saved model reply from disk.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use super::{
    factory::ProviderFactory, GenerationConfig, GenerationResponse, GenerativeModel,
    ProviderError,
};

/// Provider returning a fixed reply.
#[derive(Debug, Clone)]
pub struct ReplayProvider {
    reply: String,
}

impl ReplayProvider {
    /// Reply with `text` to every prompt.
    pub fn new(text: impl Into<String>) -> Self {
        Self { reply: text.into() }
    }

    /// Load the reply from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let reply = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::NotConfigured(format!(
                "cannot read replay file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self::new(reply))
    }
}

#[async_trait]
impl GenerativeModel for ReplayProvider {
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResponse, ProviderError> {
        tracing::debug!(
            prompt_chars = prompt.len(),
            reply_chars = self.reply.len(),
            "Replaying recorded reply"
        );

        Ok(GenerationResponse {
            text: self.reply.clone(),
            usage: None,
            model: config.model.clone(),
            finish_reason: Some("REPLAY".to_string()),
        })
    }

    fn has_credential(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "replay"
    }
}

/// Factory for replay providers.
///
/// ## Configuration Format
/// ```json
/// {
///   "reply": "{\"riskProbability\": ...}",   // Inline reply, or
///   "replay_file": "reply.json"              // reply read from a file
/// }
/// ```
pub struct ReplayProviderFactory;

impl ProviderFactory for ReplayProviderFactory {
    fn provider_type(&self) -> &'static str {
        "replay"
    }

    fn create(&self, config: &JsonValue) -> Result<Arc<dyn GenerativeModel>, ProviderError> {
        self.validate_config(config)?;

        if let Some(reply) = config["reply"].as_str() {
            return Ok(Arc::new(ReplayProvider::new(reply)));
        }

        match config["replay_file"].as_str() {
            Some(path) => Ok(Arc::new(ReplayProvider::from_file(path)?)),
            None => Err(ProviderError::NotConfigured(
                "replay provider requires 'reply' or 'replay_file'".to_string(),
            )),
        }
    }

    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError> {
        if config["reply"].is_string() || config["replay_file"].is_string() {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "replay provider requires 'reply' or 'replay_file'".to_string(),
            ))
        }
    }

    fn description(&self) -> &'static str {
        "Offline provider replaying a recorded reply"
    }
}
