//! Model-backed SQL generation stage.
//!
//! Resolution order per request: query cache, template fast path, external
//! model. Template and model results are cached identically, under the same
//! key scheme.

use crate::application::use_cases::prompt_engine::PromptEngine;
use crate::application::use_cases::query_cache::QueryCache;
use crate::application::use_cases::template_matcher::TemplateMatcher;
use crate::domain::error::ModelFailure;
use crate::domain::llm_config::LLMConfig;
use crate::domain::query_entities::{RequestType, SqlGenerationResult};
use crate::infrastructure::llm_clients::LLMClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Upper bound on a single SQL-generation model call.
const MODEL_TIMEOUT_SECS: u64 = 15;

/// SQL cache keys use the first 50 characters of the message plus the
/// request type. Prefix collisions are accepted behavior; see DESIGN.md.
const CACHE_KEY_CHARS: usize = 50;

pub struct SqlGenerator {
    client: Arc<dyn LLMClient + Send + Sync>,
    config: LLMConfig,
    cache: Arc<dyn QueryCache<SqlGenerationResult>>,
    templates: TemplateMatcher,
}

impl SqlGenerator {
    pub fn new(
        client: Arc<dyn LLMClient + Send + Sync>,
        config: LLMConfig,
        cache: Arc<dyn QueryCache<SqlGenerationResult>>,
    ) -> Self {
        Self {
            client,
            config,
            cache,
            templates: TemplateMatcher::new(),
        }
    }

    pub(crate) fn cache_key(text: &str, request_type: RequestType) -> String {
        let prefix: String = text.chars().take(CACHE_KEY_CHARS).collect();
        format!("{}-{}", prefix, request_type.as_str())
    }

    /// Synthesize a SQL result for one classified request.
    pub async fn generate(
        &self,
        text: &str,
        request_type: RequestType,
        context: Option<&[String]>,
    ) -> Result<SqlGenerationResult, ModelFailure> {
        let key = Self::cache_key(text, request_type);
        if let Some(hit) = self.cache.get(&key) {
            debug!("sql cache hit");
            return Ok(hit);
        }

        if let Some(result) = self.templates.try_match(text, request_type) {
            self.cache.set(&key, result.clone());
            return Ok(result);
        }

        let system = PromptEngine::sql_system_prompt();
        let user = PromptEngine::sql_user_prompt(text, request_type, context);

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
                    "sql generation call timed out after {}s",
                    MODEL_TIMEOUT_SECS
                )))
            }
        };

        let json = PromptEngine::extract_json(&content).ok_or_else(|| {
            ModelFailure::MalformedOutput("no JSON object in model answer".to_string())
        })?;
        let result: SqlGenerationResult =
            serde_json::from_str(json).map_err(|e| ModelFailure::MalformedOutput(e.to_string()))?;
        if result.query.trim().is_empty() {
            return Err(ModelFailure::MalformedOutput(
                "model returned an empty query".to_string(),
            ));
        }

        self.cache.set(&key, result.clone());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::query_cache::MemoryCache;
    use crate::domain::error::{AppError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubClient {
        content: std::result::Result<String, String>,
        calls: AtomicUsize,
    }

    impl StubClient {
        fn replying(content: &str) -> Self {
            Self {
                content: Ok(content.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                content: Err(message.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LLMClient for StubClient {
        async fn generate(&self, _config: &LLMConfig, _system: &str, _user: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.content {
                Ok(content) => Ok(content.clone()),
                Err(message) => Err(AppError::LLMError(message.clone())),
            }
        }
    }

    fn generator(client: Arc<StubClient>) -> SqlGenerator {
        SqlGenerator::new(
            client,
            LLMConfig::default().for_sql_generation(),
            Arc::new(MemoryCache::new()),
        )
    }

    #[tokio::test]
    async fn template_hit_skips_the_model_and_is_cached() {
        let client = Arc::new(StubClient::replying("unused"));
        let generator = generator(client.clone());

        let first = generator
            .generate("deckenleuchte ip44", RequestType::ProductRecommendation, None)
            .await
            .unwrap();
        assert!(first.explanation.starts_with("Template:"));
        assert_eq!(client.calls(), 0);

        let second = generator
            .generate("deckenleuchte ip44", RequestType::ProductRecommendation, None)
            .await
            .unwrap();
        assert_eq!(second, first);
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn model_result_is_written_through_to_the_cache() {
        let client = Arc::new(StubClient::replying(
            r#"{"query":"SELECT * FROM products WHERE lumen >= $1 AND availability = true ORDER BY gross_price ASC LIMIT 20","parameters":{"$1":800},"explanation":"bright lamps"}"#,
        ));
        let generator = generator(client.clone());

        let first = generator
            .generate("something really bright", RequestType::ProductRecommendation, None)
            .await
            .unwrap();
        assert_eq!(first.parameters["$1"], serde_json::json!(800));
        assert_eq!(client.calls(), 1);

        let second = generator
            .generate("something really bright", RequestType::ProductRecommendation, None)
            .await
            .unwrap();
        assert_eq!(second, first);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn cache_key_separates_request_types() {
        assert_ne!(
            SqlGenerator::cache_key("same text", RequestType::ProductQuestion),
            SqlGenerator::cache_key("same text", RequestType::ProductComparison),
        );
        let long = "y".repeat(80);
        let key = SqlGenerator::cache_key(&long, RequestType::ProductQuestion);
        assert!(key.starts_with(&"y".repeat(50)));
        assert!(key.ends_with("-product_question"));
        assert!(!key.contains(&"y".repeat(51)));
    }

    #[tokio::test]
    async fn outage_surfaces_as_unavailable() {
        let client = Arc::new(StubClient::failing("quota exceeded"));
        let err = generator(client)
            .generate("something custom", RequestType::ProductRecommendation, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ModelFailure::Unavailable(_)));
    }

    #[tokio::test]
    async fn empty_query_is_malformed_output() {
        let client = Arc::new(StubClient::replying(
            r#"{"query":"  ","parameters":{},"explanation":"nothing"}"#,
        ));
        let err = generator(client)
            .generate("something custom", RequestType::ProductRecommendation, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ModelFailure::MalformedOutput(_)));
    }
}
