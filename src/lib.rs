//! Natural-language to SQL translation for a lighting-product catalog.
//!
//! One user turn flows through two model-backed stages: an intent
//! classifier and a SQL generator. Common requests never reach the model
//! at all: a rule table recognizes luminaire-plus-ingress-protection
//! queries and emits parameterized SQL directly, and both stages cache
//! their results per bounded key prefix. When the model is unreachable
//! or returns garbage, the pipeline substitutes documented defaults
//! instead of surfacing an error.

pub mod application;
pub mod domain;
pub mod infrastructure;

/// Install the global tracing subscriber, honoring `RUST_LOG` and
/// defaulting to `info`. Safe to call more than once.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub use application::use_cases::classifier::IntentClassifier;
pub use application::use_cases::ip_protection::{
    acceptable_classes, extract_ip_codes, is_class_sufficient, rank_of_code, IpClass,
};
pub use application::use_cases::pipeline::{PipelineCacheStats, PipelineResponse, QueryPipeline};
pub use application::use_cases::query_cache::{CacheStats, MemoryCache, QueryCache};
pub use application::use_cases::sql_generator::SqlGenerator;
pub use application::use_cases::template_matcher::TemplateMatcher;
pub use domain::error::{AppError, ModelFailure, Result};
pub use domain::llm_config::{LLMConfig, LLMProvider};
pub use domain::query_entities::{ClassificationResult, RequestType, SqlGenerationResult};
pub use infrastructure::llm_clients::{LLMClient, OpenAiClient};
