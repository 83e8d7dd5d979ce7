//! JSON Schema validation for model responses.
//!
//! Responses are validated against `schema/prediction_response.schema.json`
//! before they are deserialized, so a wrong shape is reported as a list of
//! concrete problems instead of a single serde message.

use std::sync::OnceLock;
use thiserror::Error;

/// Embedded response schema (loaded at compile time).
const RESPONSE_SCHEMA_JSON: &str = include_str!("../../../schema/prediction_response.schema.json");

/// Compiled JSON Schema validator (initialized once, reused).
static COMPILED_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

/// Errors from schema loading.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to load schema: {0}")]
    LoadError(String),
}

/// Compile the response schema on first use.
fn get_validator() -> Result<&'static jsonschema::Validator, SchemaError> {
    COMPILED_SCHEMA
        .get_or_init(|| {
            let schema: serde_json::Value = serde_json::from_str(RESPONSE_SCHEMA_JSON)
                .map_err(|e| format!("response schema is not JSON: {e}"))?;
            jsonschema::options()
                .build(&schema)
                .map_err(|e| format!("response schema does not compile: {e}"))
        })
        .as_ref()
        .map_err(|e| SchemaError::LoadError(e.clone()))
}

/// Validate a parsed response against the schema.
///
/// # Returns
///
/// * `Ok(())` - Response has the three required fields with the right types
/// * `Err(Vec<String>)` - Every problem found
pub fn validate_response_shape(response: &serde_json::Value) -> Result<(), Vec<String>> {
    let validator = get_validator().map_err(|e| vec![e.to_string()])?;

    let errors: Vec<String> = validator
        .iter_errors(response)
        .map(|e| {
            let path = e.instance_path.to_string();
            if path.is_empty() {
                e.to_string()
            } else {
                format!("{} at {}", e, path)
            }
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_response_passes() {
        let value = serde_json::json!({
            "riskProbability": 0.91,
            "riskLevel": "Extreme",
            "assessment": "Hot, dry and windy."
        });
        assert!(validate_response_shape(&value).is_ok());
    }

    #[test]
    fn test_integer_probability_is_a_number() {
        let value = serde_json::json!({
            "riskProbability": 1,
            "riskLevel": "Extreme",
            "assessment": ""
        });
        assert!(validate_response_shape(&value).is_ok());
    }

    #[test]
    fn test_extra_keys_tolerated() {
        let value = serde_json::json!({
            "riskProbability": 0.2,
            "riskLevel": "Low",
            "assessment": "Wet week.",
            "confidence": "high"
        });
        assert!(validate_response_shape(&value).is_ok());
    }

    #[test]
    fn test_missing_assessment_fails() {
        let value = serde_json::json!({
            "riskProbability": 0.2,
            "riskLevel": "Low"
        });
        let errors = validate_response_shape(&value).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("assessment"));
    }

    #[test]
    fn test_string_probability_fails() {
        let value = serde_json::json!({
            "riskProbability": "0.9",
            "riskLevel": "High",
            "assessment": "text"
        });
        let errors = validate_response_shape(&value).unwrap_err();
        assert!(errors[0].contains("riskProbability"));
    }

    #[test]
    fn test_every_problem_reported() {
        let value = serde_json::json!({
            "riskProbability": null,
            "riskLevel": 4
        });
        let errors = validate_response_shape(&value).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_embedded_schema_compiles() {
        assert!(get_validator().is_ok());
    }

    #[test]
    fn test_non_object_fails() {
        assert!(validate_response_shape(&serde_json::json!([0.5, "High", "text"])).is_err());
        assert!(validate_response_shape(&serde_json::json!("High")).is_err());
    }
}
