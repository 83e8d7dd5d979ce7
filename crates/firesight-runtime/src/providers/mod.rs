//! Generative model provider abstractions for firesight-runtime.
//!
//! This module defines the trait the predictor talks to and includes a
//! Gemini implementation (behind the `gemini` feature) plus an offline
//! replay provider.
//!
//! ## Security
//!
//! All providers use the [`secrets`] module for credential handling.
//! See [`ApiCredential`] for the recommended patterns.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

mod factory;
mod replay;
pub mod secrets;

#[cfg(feature = "gemini")]
mod gemini;

pub use factory::{ProviderFactory, ProviderRegistry};
pub use replay::{ReplayProvider, ReplayProviderFactory};
pub use secrets::{ApiCredential, CredentialSource, MISSING_CREDENTIAL_PLACEHOLDER};

#[cfg(feature = "gemini")]
pub use gemini::{GeminiProvider, GeminiProviderFactory};

/// Environment variable name for the Gemini API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default Gemini REST endpoint.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when the configuration does not name one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-04-17";

/// Sampling temperature for every prediction: controlled, but not zero.
pub const SAMPLING_TEMPERATURE: f32 = 0.5;

/// MIME type requested for structured output.
pub const JSON_MIME_TYPE: &str = "application/json";

/// Errors from generative model providers.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("Model returned no content: {0}")]
    EmptyResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Configuration for a generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Model to use
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Requested output MIME type (`None` for free text)
    pub response_mime_type: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: SAMPLING_TEMPERATURE,
            response_mime_type: Some(JSON_MIME_TYPE.to_string()),
        }
    }
}

impl GenerationConfig {
    /// JSON output at the standard temperature, for the given model.
    pub fn json_for(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

/// Response from a generation call.
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    /// Generated text
    pub text: String,

    /// Token usage, when the provider reports it
    pub usage: Option<TokenUsage>,

    /// Model that produced the text
    pub model: String,

    /// Finish reason
    pub finish_reason: Option<String>,
}

/// Token usage from a generation call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,

    /// Tokens in the generated text
    pub completion_tokens: u32,
}

impl TokenUsage {
    /// Total tokens used.
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Provider abstraction allows swapping model backends.
///
/// The predictor is the only caller; it invokes [`generate`](Self::generate)
/// exactly once per prediction. Implementations hold no per-request state,
/// so concurrent calls are independent.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Generate text for a single prompt.
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResponse, ProviderError>;

    /// Whether a usable credential is configured.
    ///
    /// Checked before any call is attempted.
    fn has_credential(&self) -> bool;

    /// Provider name for logs and reports.
    fn name(&self) -> &str;
}
