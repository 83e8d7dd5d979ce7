//! Provider selection by name.
//!
//! The predictor never names a backend itself: the configured `provider`
//! string is looked up here and the matching factory builds the model from
//! [`PredictorConfig::provider_settings`](crate::PredictorConfig::provider_settings).

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::{GenerativeModel, ProviderError};

/// Builds one kind of model from its settings object.
pub trait ProviderFactory: Send + Sync {
    /// Name used in configuration, e.g. "gemini".
    fn provider_type(&self) -> &'static str;

    /// Reject settings this provider cannot use.
    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError>;

    /// Build a model; implementations validate first.
    fn create(&self, config: &JsonValue) -> Result<Arc<dyn GenerativeModel>, ProviderError>;

    /// One line for `firesight providers`.
    fn description(&self) -> &'static str;
}

/// Factories keyed by provider name, listed in name order.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<&'static str, Arc<dyn ProviderFactory>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in providers: `replay` always, `gemini` with the `gemini` feature.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(super::ReplayProviderFactory));
        #[cfg(feature = "gemini")]
        registry.register(Arc::new(super::GeminiProviderFactory));
        registry
    }

    /// Add a factory, replacing any with the same name.
    pub fn register(&mut self, factory: Arc<dyn ProviderFactory>) {
        self.factories.insert(factory.provider_type(), factory);
    }

    /// Build the named provider.
    pub fn create(
        &self,
        provider_type: &str,
        config: &JsonValue,
    ) -> Result<Arc<dyn GenerativeModel>, ProviderError> {
        let factory = self.factories.get(provider_type).ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "Unknown provider type: '{}'. Available: {}",
                provider_type,
                self.available_types().join(", ")
            ))
        })?;
        factory.create(config)
    }

    /// Registered names.
    pub fn available_types(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    /// `(name, description)` pairs.
    pub fn describe(&self) -> Vec<(&'static str, &'static str)> {
        self.factories
            .iter()
            .map(|(name, factory)| (*name, factory.description()))
            .collect()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.available_types())
            .finish()
    }
}
