//! Risk vocabulary and probability normalization.
//!
//! The model is asked for one of five labels but is not trusted to comply.
//! [`RiskLevel::from_label`] is total: anything outside the vocabulary
//! becomes [`RiskLevel::Moderate`] instead of failing the request.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical wildfire risk, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
    Extreme,
}

impl RiskLevel {
    /// Level used for labels outside the vocabulary.
    pub const FALLBACK: RiskLevel = RiskLevel::Moderate;

    /// All five levels, lowest first.
    pub fn all() -> [RiskLevel; 5] {
        [
            RiskLevel::Low,
            RiskLevel::Moderate,
            RiskLevel::High,
            RiskLevel::VeryHigh,
            RiskLevel::Extreme,
        ]
    }

    /// Canonical display label.
    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
            RiskLevel::VeryHigh => "Very High",
            RiskLevel::Extreme => "Extreme",
        }
    }

    /// Rank from 1 (Low) to 5 (Extreme).
    pub fn severity(self) -> u8 {
        match self {
            RiskLevel::Low => 1,
            RiskLevel::Moderate => 2,
            RiskLevel::High => 3,
            RiskLevel::VeryHigh => 4,
            RiskLevel::Extreme => 5,
        }
    }

    /// Match a label against the vocabulary.
    ///
    /// Case-insensitive; runs of whitespace count as `_`, so "very high",
    /// "VERY_HIGH" and "Very High" are the same label.
    pub fn parse_label(raw: &str) -> Option<RiskLevel> {
        let normalized = raw
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .to_uppercase();

        match normalized.as_str() {
            "LOW" => Some(RiskLevel::Low),
            "MODERATE" => Some(RiskLevel::Moderate),
            "HIGH" => Some(RiskLevel::High),
            "VERY_HIGH" => Some(RiskLevel::VeryHigh),
            "EXTREME" => Some(RiskLevel::Extreme),
            _ => None,
        }
    }

    /// Map any label to a level, falling back to [`RiskLevel::FALLBACK`].
    pub fn from_label(raw: &str) -> RiskLevel {
        match Self::parse_label(raw) {
            Some(level) => level,
            None => {
                tracing::warn!(label = %raw, "Unknown risk level, defaulting to Moderate");
                Self::FALLBACK
            }
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Clamp a model-reported probability into `[0.0, 1.0]`.
///
/// NaN is treated as 0.0.
pub fn clamp_probability(probability: f64) -> f64 {
    if probability.is_nan() {
        return 0.0;
    }
    probability.clamp(0.0, 1.0)
}
