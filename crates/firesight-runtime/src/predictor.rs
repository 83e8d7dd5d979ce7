//! The wildfire risk predictor.
//!
//! One prediction is one model call:
//! 1. Check the credential (fail fast, no network)
//! 2. Render the prompt from the validated record
//! 3. Call the model once with JSON output requested
//! 4. Strip, parse, validate and normalize the reply
//!
//! The predictor holds no mutable state, so concurrent calls are
//! independent of each other.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use firesight_core::{parse_prediction, render_prompt, FeatureRecord, PredictionResult};

use crate::config::PredictorConfig;
use crate::error::PredictionError;
use crate::providers::{
    GenerationConfig, GenerativeModel, ProviderError, ProviderRegistry, TokenUsage,
};

/// A prediction together with what produced it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionReport {
    /// Input the prediction was made for
    pub features: FeatureRecord,

    /// Normalized result
    pub result: PredictionResult,

    /// Provider name
    pub provider: String,

    /// Model that answered
    pub model: String,

    /// When the reply was received
    pub assessed_at: DateTime<Utc>,

    /// Token usage, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// Turns feature records into risk predictions using a generative model.
#[derive(Clone)]
pub struct WildfirePredictor {
    model: Arc<dyn GenerativeModel>,
    generation: GenerationConfig,
}

impl std::fmt::Debug for WildfirePredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WildfirePredictor")
            .field("provider", &self.model.name())
            .field("generation", &self.generation)
            .finish()
    }
}

impl WildfirePredictor {
    /// Create a predictor over an injected model.
    pub fn new(model: Arc<dyn GenerativeModel>, generation: GenerationConfig) -> Self {
        Self { model, generation }
    }

    /// Build the configured provider from the registry.
    pub fn from_config(
        config: &PredictorConfig,
        registry: &ProviderRegistry,
    ) -> Result<Self, ProviderError> {
        let model = registry.create(&config.provider, &config.provider_settings())?;
        Ok(Self::new(model, config.generation_config()))
    }

    /// Provider name.
    pub fn provider_name(&self) -> &str {
        self.model.name()
    }

    /// Generation settings used for every call.
    pub fn generation_config(&self) -> &GenerationConfig {
        &self.generation
    }

    /// Predict the wildfire risk for a validated record.
    pub async fn predict(
        &self,
        features: &FeatureRecord,
    ) -> Result<PredictionResult, PredictionError> {
        self.assess(features).await.map(|report| report.result)
    }

    /// Like [`predict`](Self::predict), but keeps provider, model, timing and usage.
    pub async fn assess(
        &self,
        features: &FeatureRecord,
    ) -> Result<PredictionReport, PredictionError> {
        if !self.model.has_credential() {
            tracing::error!(provider = %self.model.name(), "API key is not configured");
            return Err(PredictionError::MissingCredential);
        }

        let prompt = render_prompt(features);
        tracing::debug!(
            provider = %self.model.name(),
            model = %self.generation.model,
            prompt_chars = prompt.len(),
            "Requesting wildfire risk prediction"
        );

        let response = self
            .model
            .generate(&prompt, &self.generation)
            .await
            .map_err(|e| {
                tracing::error!(provider = %self.model.name(), error = %e, "Model call failed");
                PredictionError::from_provider(&e)
            })?;

        let result = parse_prediction(&response.text)?;

        tracing::info!(
            risk_level = %result.risk_level(),
            risk_probability = result.risk_probability(),
            "Prediction complete"
        );

        Ok(PredictionReport {
            features: features.clone(),
            result,
            provider: self.model.name().to_string(),
            model: response.model,
            assessed_at: Utc::now(),
            usage: response.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{GenerationResponse, ReplayProvider};
    use async_trait::async_trait;
    use firesight_core::{HumanActivity, RiskLevel};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingProvider {
        message: &'static str,
    }

    #[async_trait]
    impl GenerativeModel for FailingProvider {
        async fn generate(
            &self,
            _prompt: &str,
            _config: &GenerationConfig,
        ) -> Result<GenerationResponse, ProviderError> {
            Err(ProviderError::ApiError {
                status: 400,
                message: self.message.to_string(),
            })
        }

        fn has_credential(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    /// Records the prompt and config it was called with.
    #[derive(Default)]
    struct RecordingProvider {
        calls: AtomicUsize,
        last_prompt: std::sync::Mutex<Option<String>>,
        last_temperature: std::sync::Mutex<Option<f32>>,
    }

    #[async_trait]
    impl GenerativeModel for RecordingProvider {
        async fn generate(
            &self,
            prompt: &str,
            config: &GenerationConfig,
        ) -> Result<GenerationResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            *self.last_temperature.lock().unwrap() = Some(config.temperature);
            Ok(GenerationResponse {
                text: r#"{"riskProbability":0.3,"riskLevel":"low","assessment":"Mild."}"#
                    .to_string(),
                usage: Some(TokenUsage {
                    prompt_tokens: 200,
                    completion_tokens: 30,
                }),
                model: config.model.clone(),
                finish_reason: Some("STOP".to_string()),
            })
        }

        fn has_credential(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn scenario() -> FeatureRecord {
        FeatureRecord::new(38.0, 12.0, 45.0, 0.0, 8.0, 0.15, HumanActivity::High).unwrap()
    }

    fn predictor(model: Arc<dyn GenerativeModel>) -> WildfirePredictor {
        WildfirePredictor::new(model, GenerationConfig::default())
    }

    #[tokio::test]
    async fn test_worked_scenario() {
        let model = Arc::new(ReplayProvider::new(
            r#"{"riskProbability":0.91,"riskLevel":"Extreme","assessment":"Critical conditions."}"#,
        ));
        let result = predictor(model).predict(&scenario()).await.unwrap();

        assert_eq!(result.risk_probability(), 0.91);
        assert_eq!(result.risk_level(), RiskLevel::Extreme);
        assert_eq!(result.assessment(), "Critical conditions.");
    }

    #[tokio::test]
    async fn test_single_call_with_rendered_prompt() {
        let model = Arc::new(RecordingProvider::default());
        let report = predictor(model.clone()).assess(&scenario()).await.unwrap();

        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*model.last_temperature.lock().unwrap(), Some(0.5));
        let prompt = model.last_prompt.lock().unwrap().clone().unwrap();
        assert_eq!(prompt, render_prompt(&scenario()));

        assert_eq!(report.provider, "recording");
        assert_eq!(report.result.risk_level(), RiskLevel::Low);
        assert_eq!(report.usage.map(|u| u.total()), Some(230));
    }

    #[tokio::test]
    async fn test_invalid_key_error() {
        let model = Arc::new(FailingProvider {
            message: "API key not valid. Please pass a valid API key.",
        });
        let err = predictor(model).predict(&scenario()).await.unwrap_err();
        assert_eq!(err, PredictionError::InvalidCredential);
    }

    #[tokio::test]
    async fn test_quota_error() {
        let model = Arc::new(FailingProvider {
            message: "Quota exceeded for quota metric 'Generate Content API requests per minute'",
        });
        let err = predictor(model).predict(&scenario()).await.unwrap_err();
        assert_eq!(err, PredictionError::QuotaExceeded);
    }

    #[tokio::test]
    async fn test_other_service_error() {
        let model = Arc::new(FailingProvider {
            message: "Internal error encountered.",
        });
        let err = predictor(model).predict(&scenario()).await.unwrap_err();
        assert!(matches!(err, PredictionError::TransportOrServiceFailure(_)));
    }

    #[tokio::test]
    async fn test_malformed_reply() {
        let model = Arc::new(ReplayProvider::new("The risk is high."));
        let err = predictor(model).predict(&scenario()).await.unwrap_err();
        assert!(matches!(err, PredictionError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_wrong_shape_reply() {
        let model = Arc::new(ReplayProvider::new(
            r#"{"riskProbability":"0.4","riskLevel":"High","assessment":"x"}"#,
        ));
        let err = predictor(model).predict(&scenario()).await.unwrap_err();
        assert!(matches!(err, PredictionError::InvalidResponseShape(_)));
    }

    #[tokio::test]
    async fn test_concurrent_predictions_are_independent() {
        let model = Arc::new(RecordingProvider::default());
        let predictor = predictor(model.clone());
        let features = scenario();

        let (a, b) = tokio::join!(predictor.predict(&features), predictor.predict(&features));
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(model.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = PredictionReport {
            features: scenario(),
            result: PredictionResult::new(0.5, RiskLevel::High, "x"),
            provider: "replay".to_string(),
            model: "m".to_string(),
            assessed_at: Utc::now(),
            usage: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("assessedAt").is_some());
        assert_eq!(json["features"]["windSpeed"], 45.0);
        assert_eq!(json["result"]["riskLevel"], "High");
        assert!(json.get("usage").is_none());
    }
}
