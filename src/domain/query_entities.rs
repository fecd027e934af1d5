//! Core result types produced by the two pipeline stages.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The four request categories the classifier may return.
///
/// The wire names match the JSON vocabulary the model is prompted with;
/// anything outside it fails deserialization and is handled as malformed
/// output, so a caller never observes an unknown category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    ProductRecommendation,
    ProductQuestion,
    ProductComparison,
    SimilarProductSearch,
}

impl RequestType {
    pub const ALL: [RequestType; 4] = [
        RequestType::ProductRecommendation,
        RequestType::ProductQuestion,
        RequestType::ProductComparison,
        RequestType::SimilarProductSearch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::ProductRecommendation => "product_recommendation",
            RequestType::ProductQuestion => "product_question",
            RequestType::ProductComparison => "product_comparison",
            RequestType::SimilarProductSearch => "similar_product_search",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified intent for one user message. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(rename = "type")]
    pub request_type: RequestType,
    pub confidence: f64,
    pub reasoning: String,
}

/// A synthesized SQL query plus its bind parameters.
///
/// The query is never executed here; values are emitted as placeholders
/// (`$1`, `$2`, ...) with the actual values in `parameters`, keyed by
/// placeholder. Binding them is the execution layer's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlGenerationResult {
    pub query: String,
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
    pub explanation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_type_round_trips_wire_names() {
        for request_type in RequestType::ALL {
            let json = serde_json::to_string(&request_type).unwrap();
            assert_eq!(json, format!("\"{}\"", request_type.as_str()));
            let back: RequestType = serde_json::from_str(&json).unwrap();
            assert_eq!(back, request_type);
        }
    }

    #[test]
    fn unknown_request_type_is_rejected() {
        let parsed: Result<ClassificationResult, _> = serde_json::from_str(
            r#"{"type":"chitchat","confidence":0.9,"reasoning":"nope"}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn sql_result_parameters_default_to_empty() {
        let parsed: SqlGenerationResult = serde_json::from_str(
            r#"{"query":"SELECT 1","explanation":"probe"}"#,
        )
        .unwrap();
        assert!(parsed.parameters.is_empty());
    }
}
