//! # firesight-runtime
//!
//! Model-backed wildfire risk prediction.
//!
//! `firesight-core` decides what to ask and how to read the answer; this
//! crate asks. It owns the provider abstraction, credential handling and
//! the predictor that ties one validated record to one model call.
//!
//! ## Providers
//!
//! - `gemini` (cargo feature `gemini`): Google Gemini `generateContent`
//! - `replay`: answers with a recorded reply, no network
//!
//! ## Example
//!
//! ```rust,ignore
//! use firesight_core::FeatureRecord;
//! use firesight_runtime::{PredictorConfig, ProviderRegistry, WildfirePredictor};
//!
//! let config = PredictorConfig::load("firesight.yaml")?;
//! let predictor = WildfirePredictor::from_config(&config, &ProviderRegistry::with_defaults())?;
//!
//! let result = predictor.predict(&FeatureRecord::default()).await?;
//! println!("{}: {}", result.risk_level(), result.assessment());
//! ```

pub mod config;
pub mod error;
pub mod predictor;
pub mod providers;

pub use config::{ConfigError, PredictorConfig};
pub use error::PredictionError;
pub use predictor::{PredictionReport, WildfirePredictor};
pub use providers::{
    ApiCredential, CredentialSource, GenerationConfig, GenerationResponse, GenerativeModel,
    ProviderError, ProviderFactory, ProviderRegistry, ReplayProvider, TokenUsage,
};

#[cfg(feature = "gemini")]
pub use providers::GeminiProvider;
