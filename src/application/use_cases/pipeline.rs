//! Single-turn orchestration: classify the request, then synthesize SQL.
//!
//! This is the only place where model failures become user-visible values.
//! Both stages report tagged failures; the conversion to the documented
//! defaults happens here, once, so the "never raise to the caller" policy
//! is explicit and testable. There are no retries: each failure triggers
//! exactly one fallback substitution.

use crate::application::use_cases::classifier::IntentClassifier;
use crate::application::use_cases::query_cache::{MemoryCache, QueryCache};
use crate::application::use_cases::sql_generator::SqlGenerator;
use crate::domain::llm_config::LLMConfig;
use crate::domain::query_entities::{ClassificationResult, RequestType, SqlGenerationResult};
use crate::infrastructure::llm_clients::LLMClient;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Canonical query substituted whenever SQL generation cannot complete.
/// Kept as a single literal so repeated failures are byte-identical.
const FALLBACK_QUERY: &str =
    "SELECT * FROM products WHERE availability = true ORDER BY gross_price ASC LIMIT 20";

fn classification_fallback() -> ClassificationResult {
    ClassificationResult {
        request_type: RequestType::ProductRecommendation,
        confidence: 0.5,
        reasoning: "fallback after error".to_string(),
    }
}

fn sql_fallback() -> SqlGenerationResult {
    SqlGenerationResult {
        query: FALLBACK_QUERY.to_string(),
        parameters: HashMap::new(),
        explanation: "Fallback query after error".to_string(),
    }
}

/// Entry counts for both stage caches.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineCacheStats {
    pub classification: usize,
    pub sql: usize,
}

/// Outcome of one user turn.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResponse {
    pub classification: ClassificationResult,
    pub sql: SqlGenerationResult,
}

pub struct QueryPipeline {
    classifier: IntentClassifier,
    generator: SqlGenerator,
    classification_cache: Arc<dyn QueryCache<ClassificationResult>>,
    sql_cache: Arc<dyn QueryCache<SqlGenerationResult>>,
}

impl QueryPipeline {
    /// Pipeline with fresh in-memory caches.
    pub fn new(client: Arc<dyn LLMClient + Send + Sync>, config: LLMConfig) -> Self {
        Self::with_caches(
            client,
            config,
            Arc::new(MemoryCache::new()),
            Arc::new(MemoryCache::new()),
        )
    }

    /// Pipeline over caller-provided caches, e.g. bounded or pre-warmed ones.
    pub fn with_caches(
        client: Arc<dyn LLMClient + Send + Sync>,
        config: LLMConfig,
        classification_cache: Arc<dyn QueryCache<ClassificationResult>>,
        sql_cache: Arc<dyn QueryCache<SqlGenerationResult>>,
    ) -> Self {
        let classifier = IntentClassifier::new(
            client.clone(),
            config.for_classification(),
            classification_cache.clone(),
        );
        let generator = SqlGenerator::new(client, config.for_sql_generation(), sql_cache.clone());
        Self {
            classifier,
            generator,
            classification_cache,
            sql_cache,
        }
    }

    /// Classification that never fails: any model failure becomes the
    /// documented default category.
    pub async fn classify(&self, text: &str, context: Option<&[String]>) -> ClassificationResult {
        match self.classifier.classify(text, context).await {
            Ok(result) => result,
            Err(failure) => {
                warn!(%failure, "classification fell back to default");
                classification_fallback()
            }
        }
    }

    /// SQL generation that never fails: any model failure becomes the
    /// canonical fallback query.
    pub async fn generate_sql(
        &self,
        text: &str,
        request_type: RequestType,
        context: Option<&[String]>,
    ) -> SqlGenerationResult {
        match self.generator.generate(text, request_type, context).await {
            Ok(result) => result,
            Err(failure) => {
                warn!(%failure, "sql generation fell back to default query");
                sql_fallback()
            }
        }
    }

    /// Handle one user turn end to end.
    pub async fn handle(&self, text: &str, context: Option<&[String]>) -> PipelineResponse {
        let classification = self.classify(text, context).await;
        let sql = self
            .generate_sql(text, classification.request_type, context)
            .await;
        PipelineResponse {
            classification,
            sql,
        }
    }

    /// Empty both stage caches synchronously.
    pub fn clear_cache(&self) {
        self.classification_cache.clear();
        self.sql_cache.clear();
    }

    /// Entry counts for both caches; observability only.
    pub fn cache_stats(&self) -> PipelineCacheStats {
        PipelineCacheStats {
            classification: self.classification_cache.len(),
            sql: self.sql_cache.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::{AppError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns canned content per stage, keyed off the system prompt, and
    /// counts every call.
    struct StubClient {
        classification: std::result::Result<String, String>,
        sql: std::result::Result<String, String>,
        calls: AtomicUsize,
    }

    impl StubClient {
        fn healthy() -> Self {
            Self {
                classification: Ok(
                    r#"{"type":"product_question","confidence":0.9,"reasoning":"asks about one product"}"#
                        .to_string(),
                ),
                sql: Ok(
                    r#"{"query":"SELECT * FROM products WHERE vysn_name ILIKE $1 LIMIT 20","parameters":{"$1":"%salsa%"},"explanation":"name lookup"}"#
                        .to_string(),
                ),
                calls: AtomicUsize::new(0),
            }
        }

        fn outage() -> Self {
            Self {
                classification: Err("503 service unavailable".to_string()),
                sql: Err("503 service unavailable".to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LLMClient for StubClient {
        async fn generate(&self, _config: &LLMConfig, system: &str, _user: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = if system.starts_with("Classify") {
                &self.classification
            } else {
                &self.sql
            };
            match reply {
                Ok(content) => Ok(content.clone()),
                Err(message) => Err(AppError::LLMError(message.clone())),
            }
        }
    }

    fn pipeline(client: Arc<StubClient>) -> QueryPipeline {
        QueryPipeline::new(client, LLMConfig::default())
    }

    #[tokio::test]
    async fn scenario_a_ceiling_template_engages_without_model() {
        let client = Arc::new(StubClient::healthy());
        let pipeline = pipeline(client.clone());

        let sql = pipeline
            .generate_sql("ceiling-luminaire ip44", RequestType::ProductRecommendation, None)
            .await;
        assert!(sql.explanation.contains("ceiling luminaires"));
        assert!(sql.explanation.contains("IP44"));
        assert_eq!(client.calls(), 0, "template path must not call the model");
    }

    #[tokio::test]
    async fn scenario_b_wall_template_starts_at_ip65() {
        let client = Arc::new(StubClient::healthy());
        let pipeline = pipeline(client.clone());

        let sql = pipeline
            .generate_sql("wall-luminaire ip65", RequestType::ProductRecommendation, None)
            .await;
        assert!(sql.query.contains("category_2 LIKE '%wall%'"));
        let mut values: Vec<&str> = sql
            .parameters
            .values()
            .map(|v| v.as_str().unwrap())
            .collect();
        values.sort();
        assert_eq!(values, vec!["IP65", "IP67", "IP68"]);
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn scenario_c_outage_yields_byte_identical_fallback() {
        let client = Arc::new(StubClient::outage());
        let pipeline = pipeline(client);

        let first = pipeline
            .generate_sql("moodlight for the reading corner", RequestType::ProductRecommendation, None)
            .await;
        let second = pipeline
            .generate_sql("moodlight for the reading corner", RequestType::ProductRecommendation, None)
            .await;
        assert_eq!(
            first.query,
            "SELECT * FROM products WHERE availability = true ORDER BY gross_price ASC LIMIT 20"
        );
        assert!(first.parameters.is_empty());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn scenario_d_clear_cache_resets_and_reevaluates() {
        let client = Arc::new(StubClient::healthy());
        let pipeline = pipeline(client.clone());

        let _ = pipeline.handle("is the salsa lid dimmable?", None).await;
        let stats = pipeline.cache_stats();
        assert_eq!(stats.classification, 1);
        assert_eq!(stats.sql, 1);
        let calls_before = client.calls();

        pipeline.clear_cache();
        let stats = pipeline.cache_stats();
        assert_eq!(stats.classification, 0);
        assert_eq!(stats.sql, 0);

        let _ = pipeline.handle("is the salsa lid dimmable?", None).await;
        assert_eq!(
            client.calls(),
            calls_before * 2,
            "cleared caches must re-trigger evaluation"
        );
    }

    #[tokio::test]
    async fn classification_fallback_stays_in_vocabulary() {
        let pipeline = pipeline(Arc::new(StubClient::outage()));
        let classification = pipeline.classify("anything at all", None).await;
        assert_eq!(classification.request_type, RequestType::ProductRecommendation);
        assert_eq!(classification.confidence, 0.5);
        assert_eq!(classification.reasoning, "fallback after error");
    }

    #[tokio::test]
    async fn full_turn_composes_both_stages() {
        let client = Arc::new(StubClient::healthy());
        let pipeline = pipeline(client.clone());

        let response = pipeline.handle("is the salsa lid dimmable?", None).await;
        assert_eq!(
            response.classification.request_type,
            RequestType::ProductQuestion
        );
        assert!(response.sql.query.contains("ILIKE"));
        assert_eq!(client.calls(), 2);

        // Second identical turn is fully served from the caches.
        let repeat = pipeline.handle("is the salsa lid dimmable?", None).await;
        assert_eq!(repeat.sql, response.sql);
        assert_eq!(client.calls(), 2);
    }
}
