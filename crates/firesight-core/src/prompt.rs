//! Prompt rendering for the wildfire risk model.
//!
//! The prompt has three parts:
//! 1. Role and input data (one line per feature, value with unit)
//! 2. Output contract: a single JSON object with exactly [`RESPONSE_KEYS`]
//! 3. One worked example anchoring the output shape
//!
//! Rendering is deterministic: the same record always yields the same text.

use std::fmt::Write;

use crate::features::{FeatureField, FeatureRecord};
use crate::risk::RiskLevel;

/// Keys the model must return, in contract order.
pub const RESPONSE_KEYS: [&str; 3] = ["riskProbability", "riskLevel", "assessment"];

/// Opening instruction.
pub const ROLE_PROMPT: &str = "You are a wildfire risk assessment AI. Based on the following \
environmental and human activity data, predict the wildfire risk.";

/// Output contract skeleton. Must stay valid JSON with exactly [`RESPONSE_KEYS`].
pub const OUTPUT_CONTRACT: &str = r#"{
  "riskProbability": 0.0,
  "riskLevel": "Low",
  "assessment": ""
}"#;

/// Worked example for a high-risk situation. Must stay valid JSON with
/// exactly [`RESPONSE_KEYS`].
pub const FEW_SHOT_EXAMPLE: &str = r#"{
  "riskProbability": 0.82,
  "riskLevel": "Very High",
  "assessment": "The combination of high temperatures, low humidity, and significant wind speed, along with dry vegetation, creates a very high risk of wildfire ignition and rapid spread. Recent low precipitation exacerbates these conditions."
}"#;

/// Closing instruction.
pub const CLOSING_PROMPT: &str = "Provide your prediction for the given input data.";

/// Prompt label for a feature line.
fn prompt_label(field: FeatureField) -> &'static str {
    match field {
        FeatureField::Precipitation => "Precipitation (last 7 days)",
        FeatureField::VegetationIndex => "Vegetation Index (NDVI)",
        other => other.label(),
    }
}

/// Value with its unit as it appears in the prompt ("38°C", "45 km/h").
pub fn format_reading(field: FeatureField, value: f64) -> String {
    match field {
        FeatureField::Temperature | FeatureField::Humidity | FeatureField::SoilMoisture => {
            format!("{}{}", value, field.unit().unwrap_or_default())
        }
        FeatureField::WindSpeed | FeatureField::Precipitation => {
            format!("{} {}", value, field.unit().unwrap_or_default())
        }
        // NDVI is unitless; its name is carried by the label.
        FeatureField::VegetationIndex | FeatureField::HumanActivity => value.to_string(),
    }
}

/// The input-data lines, one per feature.
pub fn feature_lines(features: &FeatureRecord) -> Vec<String> {
    let mut lines: Vec<String> = features
        .numeric_values()
        .map(|(field, value)| format!("- {}: {}", prompt_label(field), format_reading(field, value)))
        .collect();
    lines.push(format!(
        "- {}: {}",
        FeatureField::HumanActivity.label(),
        features.human_activity()
    ));
    lines
}

fn vocabulary() -> String {
    RiskLevel::all()
        .iter()
        .map(|level| format!("\"{}\"", level.label()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the full instruction for one feature record.
pub fn render_prompt(features: &FeatureRecord) -> String {
    let mut prompt = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(prompt, "{ROLE_PROMPT}");
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Input Data:");
    for line in feature_lines(features) {
        let _ = writeln!(prompt, "{line}");
    }
    let _ = writeln!(prompt);
    let _ = writeln!(
        prompt,
        "Your response MUST be a single valid JSON object with exactly these three keys and \
         nothing else (no markdown, no explanations outside the JSON):"
    );
    let _ = writeln!(prompt, "{OUTPUT_CONTRACT}");
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Rules:");
    let _ = writeln!(
        prompt,
        "- \"riskProbability\" is a number between 0.0 and 1.0, e.g. 0.75."
    );
    let _ = writeln!(prompt, "- \"riskLevel\" is exactly one of: {}.", vocabulary());
    let _ = writeln!(
        prompt,
        "- \"assessment\" is a brief (2-3 sentences) explanation of the risk factors and overall situation."
    );
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Example for high risk:");
    let _ = writeln!(prompt, "{FEW_SHOT_EXAMPLE}");
    let _ = writeln!(prompt);
    let _ = write!(prompt, "{CLOSING_PROMPT}");

    prompt
}
