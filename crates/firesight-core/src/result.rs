//! Normalized prediction results.

use serde::Serialize;

use crate::risk::{clamp_probability, RiskLevel};

/// A normalized wildfire risk prediction.
///
/// The probability is always within `[0.0, 1.0]` and the level is always one
/// of the five vocabulary values; the constructors enforce both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    risk_probability: f64,
    risk_level: RiskLevel,
    assessment: String,
}

impl PredictionResult {
    /// Build a result from an already-typed level, clamping the probability.
    pub fn new(risk_probability: f64, risk_level: RiskLevel, assessment: impl Into<String>) -> Self {
        Self {
            risk_probability: clamp_probability(risk_probability),
            risk_level,
            assessment: assessment.into(),
        }
    }

    /// Build a result from raw model output.
    ///
    /// Unrecognized labels become [`RiskLevel::Moderate`].
    pub fn normalized(risk_probability: f64, risk_label: &str, assessment: impl Into<String>) -> Self {
        Self::new(risk_probability, RiskLevel::from_label(risk_label), assessment)
    }

    pub fn risk_probability(&self) -> f64 {
        self.risk_probability
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    pub fn assessment(&self) -> &str {
        &self.assessment
    }

    /// Probability as a percentage with one decimal place ("91.0").
    pub fn probability_percent(&self) -> String {
        format!("{:.1}", self.risk_probability * 100.0)
    }
}
