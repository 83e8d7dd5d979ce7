//! # firesight-core
//!
//! Deterministic building blocks for wildfire risk assessment.
//!
//! This crate answers everything about a prediction that does not need the
//! network:
//! - Is this feature record valid?
//! - What exactly do we ask the model?
//! - Is the model's reply usable, and what does it normalize to?
//!
//! ## Key Guarantees
//!
//! 1. **Validated input**: a [`FeatureRecord`] only exists if every reading is within its domain
//! 2. **No network calls**: the model itself lives in `firesight-runtime`
//! 3. **No partial results**: a reply either normalizes fully or is rejected
//! 4. **Lenient vocabulary**: unknown risk labels become `Moderate`, never an error
//!
//! ## Example
//!
//! ```rust,ignore
//! use firesight_core::{parse_prediction, render_prompt, HumanActivity, FeatureRecord};
//!
//! let features = FeatureRecord::new(38.0, 12.0, 45.0, 0.0, 8.0, 0.15, HumanActivity::High)?;
//! let prompt = render_prompt(&features);
//!
//! // ... send `prompt` to a model ...
//! let result = parse_prediction(reply_text)?;
//! println!("{} ({}%)", result.risk_level(), result.probability_percent());
//! ```

pub mod features;
pub mod prompt;
pub mod response;
pub mod result;
pub mod risk;
pub mod schema;

// Re-export main types at crate root
pub use features::{
    validate_field, FeatureError, FeatureField, FeatureRecord, FieldViolation, HumanActivity,
    ParseActivityError, RawFeatures, ValidationErrors,
};
pub use prompt::{render_prompt, RESPONSE_KEYS};
pub use response::{parse_prediction, strip_code_fence, ResponseError};
pub use result::PredictionResult;
pub use risk::{clamp_probability, RiskLevel};
