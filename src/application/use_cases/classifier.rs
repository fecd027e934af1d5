//! Intent classification stage.
//!
//! Consults the classification cache first; on a miss it asks the external
//! model and validates the JSON answer. Failures surface as tagged
//! [`ModelFailure`] values so the pipeline can apply the documented
//! fallback in one place.

use crate::application::use_cases::prompt_engine::PromptEngine;
use crate::application::use_cases::query_cache::QueryCache;
use crate::domain::error::ModelFailure;
use crate::domain::llm_config::LLMConfig;
use crate::domain::query_entities::ClassificationResult;
use crate::infrastructure::llm_clients::LLMClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Upper bound on a single classification model call.
const MODEL_TIMEOUT_SECS: u64 = 15;

/// Cache keys use only the first 100 characters of the message. Distinct
/// long messages sharing that prefix collide; see DESIGN.md before changing
/// this.
const CACHE_KEY_CHARS: usize = 100;

pub struct IntentClassifier {
    client: Arc<dyn LLMClient + Send + Sync>,
    config: LLMConfig,
    cache: Arc<dyn QueryCache<ClassificationResult>>,
}

impl IntentClassifier {
    pub fn new(
        client: Arc<dyn LLMClient + Send + Sync>,
        config: LLMConfig,
        cache: Arc<dyn QueryCache<ClassificationResult>>,
    ) -> Self {
        Self {
            client,
            config,
            cache,
        }
    }

    pub(crate) fn cache_key(text: &str) -> String {
        text.chars()
            .take(CACHE_KEY_CHARS)
            .collect::<String>()
            .to_lowercase()
    }

    /// Classify one user message, passing at most the latest context entry
    /// to the model. A cache hit returns the stored result verbatim with no
    /// model call.
    pub async fn classify(
        &self,
        text: &str,
        context: Option<&[String]>,
    ) -> Result<ClassificationResult, ModelFailure> {
        let key = Self::cache_key(text);
        if let Some(hit) = self.cache.get(&key) {
            debug!("classification cache hit");
            return Ok(hit);
        }

        let system = PromptEngine::classification_system_prompt();
        let user = PromptEngine::classification_user_prompt(text, context);

        let content = match timeout(
            Duration::from_secs(MODEL_TIMEOUT_SECS),
            self.client.generate(&self.config, system, &user),
        )
        .await
        {
            Ok(Ok(content)) => content,
            Ok(Err(e)) => return Err(ModelFailure::Unavailable(e.to_string())),
            Err(_) => {
                return Err(ModelFailure::Unavailable(format!(
                    "classification call timed out after {}s",
                    MODEL_TIMEOUT_SECS
                )))
            }
        };

        let json = PromptEngine::extract_json(&content).ok_or_else(|| {
            ModelFailure::MalformedOutput("no JSON object in model answer".to_string())
        })?;
        let mut result: ClassificationResult =
            serde_json::from_str(json).map_err(|e| ModelFailure::MalformedOutput(e.to_string()))?;
        result.confidence = result.confidence.clamp(0.0, 1.0);

        self.cache.set(&key, result.clone());
        Ok(result)
    }
}
