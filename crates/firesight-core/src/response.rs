//! Parsing and normalization of model replies.
//!
//! Steps, in order:
//! 1. Trim and strip an optional wrapping code fence
//! 2. Parse JSON (failure: [`ResponseError::Malformed`])
//! 3. Validate shape against the schema (failure: [`ResponseError::InvalidShape`])
//! 4. Clamp the probability and map the label into the vocabulary
//!
//! There is no partial result: either every step succeeds or the reply is
//! rejected.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::result::PredictionResult;
use crate::schema::validate_response_shape;

lazy_static! {
    /// A reply wrapped in a triple-backtick fence, with or without a
    /// language tag (```` ```json ````).
    static ref CODE_FENCE: Regex = Regex::new(
        r"(?s)^```[\w-]*\s*\n?(.*?)\n?\s*```$"
    ).unwrap();
}

/// Errors from reply parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResponseError {
    #[error("response is not valid JSON: {0}")]
    Malformed(String),

    #[error("response did not match the expected format: {}", .0.join("; "))]
    InvalidShape(Vec<String>),
}

/// Reply fields after shape validation, before normalization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPrediction {
    risk_probability: f64,
    risk_level: String,
    assessment: String,
}

/// Remove a wrapping code fence, if any, and surrounding whitespace.
///
/// Text without a fence is returned trimmed but otherwise unchanged.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();

    match CODE_FENCE.captures(trimmed).and_then(|caps| caps.get(1)) {
        Some(inner) if !inner.as_str().trim().is_empty() => inner.as_str().trim(),
        _ => trimmed,
    }
}

/// Parse a raw model reply into a normalized [`PredictionResult`].
pub fn parse_prediction(raw: &str) -> Result<PredictionResult, ResponseError> {
    let body = strip_code_fence(raw);

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ResponseError::Malformed(e.to_string()))?;

    if let Err(problems) = validate_response_shape(&value) {
        tracing::error!(?problems, "Invalid JSON structure from AI");
        return Err(ResponseError::InvalidShape(problems));
    }

    let parsed: RawPrediction =
        serde_json::from_value(value).map_err(|e| ResponseError::InvalidShape(vec![e.to_string()]))?;

    Ok(PredictionResult::normalized(
        parsed.risk_probability,
        &parsed.risk_level,
        parsed.assessment,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskLevel;

    const PLAIN: &str =
        r#"{"riskProbability":0.91,"riskLevel":"Extreme","assessment":"Hot, dry and windy."}"#;

    #[test]
    fn test_plain_reply() {
        let result = parse_prediction(PLAIN).unwrap();
        assert_eq!(result.risk_probability(), 0.91);
        assert_eq!(result.risk_level(), RiskLevel::Extreme);
        assert_eq!(result.assessment(), "Hot, dry and windy.");
    }

    #[test]
    fn test_fenced_reply_parses_identically() {
        let plain = parse_prediction(PLAIN).unwrap();

        for fenced in [
            format!("```json\n{PLAIN}\n```"),
            format!("```\n{PLAIN}\n```"),
            format!("  ```json\n{PLAIN}\n```  \n"),
            format!("```JSON {PLAIN} ```"),
            format!("```{PLAIN}```"),
        ] {
            assert_eq!(parse_prediction(&fenced).unwrap(), plain, "{fenced}");
        }
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```json\n```"), "```json\n```");
    }

    #[test]
    fn test_multiline_fenced_body() {
        let reply = "```json\n{\n  \"riskProbability\": 0.3,\n  \"riskLevel\": \"moderate\",\n  \"assessment\": \"Line one.\\nLine two.\"\n}\n```";
        let result = parse_prediction(reply).unwrap();
        assert_eq!(result.risk_level(), RiskLevel::Moderate);
        assert_eq!(result.assessment(), "Line one.\nLine two.");
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        for reply in ["not json", "```json\n{riskProbability: 0.4}\n```", "", "{\"riskProbability\": 0.4,"] {
            assert!(
                matches!(parse_prediction(reply), Err(ResponseError::Malformed(_))),
                "{reply:?}"
            );
        }
    }

    #[test]
    fn test_missing_assessment_is_invalid_shape() {
        let reply = r#"{"riskProbability":0.4,"riskLevel":"High"}"#;
        assert!(matches!(
            parse_prediction(reply),
            Err(ResponseError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_string_probability_is_invalid_shape() {
        let reply = r#"{"riskProbability":"0.4","riskLevel":"High","assessment":"x"}"#;
        assert!(matches!(
            parse_prediction(reply),
            Err(ResponseError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_array_reply_is_invalid_shape() {
        assert!(matches!(
            parse_prediction("[0.4, \"High\", \"x\"]"),
            Err(ResponseError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_out_of_range_probability_clamped() {
        let high = parse_prediction(r#"{"riskProbability":1.4,"riskLevel":"Extreme","assessment":""}"#)
            .unwrap();
        assert_eq!(high.risk_probability(), 1.0);

        let low = parse_prediction(r#"{"riskProbability":-0.2,"riskLevel":"Low","assessment":""}"#)
            .unwrap();
        assert_eq!(low.risk_probability(), 0.0);
    }

    #[test]
    fn test_unknown_label_is_not_an_error() {
        let result =
            parse_prediction(r#"{"riskProbability":0.7,"riskLevel":"Catastrophic","assessment":"x"}"#)
                .unwrap();
        assert_eq!(result.risk_level(), RiskLevel::Moderate);
    }

    #[test]
    fn test_error_messages() {
        let err = ResponseError::InvalidShape(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "response did not match the expected format: a; b");
    }
}
