use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize)]
pub enum AppError {
    LLMError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::LLMError(msg) => write!(f, "LLM error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

pub type Result<T> = std::result::Result<T, AppError>;

/// Failure kinds for a single external model call.
///
/// `Unavailable` means the call never produced usable content (network
/// error, non-success status, timeout). `MalformedOutput` means the model
/// answered but the content failed JSON parsing or shape validation. Both
/// are converted to the documented defaults in exactly one place, the
/// pipeline; neither is ever surfaced to the pipeline's caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelFailure {
    Unavailable(String),
    MalformedOutput(String),
}

impl fmt::Display for ModelFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelFailure::Unavailable(msg) => write!(f, "model unavailable: {}", msg),
            ModelFailure::MalformedOutput(msg) => write!(f, "malformed model output: {}", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_the_underlying_message() {
        assert_eq!(
            AppError::LLMError("connection refused".to_string()).to_string(),
            "LLM error: connection refused"
        );
        assert_eq!(
            ModelFailure::Unavailable("timed out".to_string()).to_string(),
            "model unavailable: timed out"
        );
        assert_eq!(
            ModelFailure::MalformedOutput("no JSON".to_string()).to_string(),
            "malformed model output: no JSON"
        );
    }
}
