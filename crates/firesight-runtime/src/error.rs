//! Typed prediction failures.

use thiserror::Error;

use firesight_core::ResponseError;

use crate::providers::ProviderError;

/// Errors from a prediction request.
///
/// Every variant is terminal for the request; nothing is retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("Gemini API Key is not configured. Please set the GEMINI_API_KEY environment variable.")]
    MissingCredential,

    #[error("Invalid Gemini API Key. Please check your configuration.")]
    InvalidCredential,

    #[error("API quota exceeded. Please try again later or check your Gemini plan.")]
    QuotaExceeded,

    #[error("AI prediction failed: {0}")]
    TransportOrServiceFailure(String),

    #[error("AI prediction failed: {0}")]
    MalformedResponse(String),

    #[error("AI prediction failed: AI response did not match expected format: {}", .0.join("; "))]
    InvalidResponseShape(Vec<String>),
}

impl PredictionError {
    /// Classify a provider failure by its message text.
    pub fn from_provider(err: &ProviderError) -> Self {
        let message = err.to_string();
        let lowered = message.to_lowercase();

        if lowered.contains("api key not valid") || lowered.contains("api_key_invalid") {
            PredictionError::InvalidCredential
        } else if lowered.contains("quota") || lowered.contains("resource_exhausted") {
            PredictionError::QuotaExceeded
        } else {
            PredictionError::TransportOrServiceFailure(message)
        }
    }
}

impl From<ProviderError> for PredictionError {
    fn from(err: ProviderError) -> Self {
        PredictionError::from_provider(&err)
    }
}

impl From<ResponseError> for PredictionError {
    fn from(err: ResponseError) -> Self {
        match err {
            ResponseError::Malformed(detail) => PredictionError::MalformedResponse(detail),
            ResponseError::InvalidShape(problems) => PredictionError::InvalidResponseShape(problems),
        }
    }
}
