pub mod use_cases;

pub use use_cases::classifier::IntentClassifier;
pub use use_cases::pipeline::{PipelineCacheStats, PipelineResponse, QueryPipeline};
pub use use_cases::query_cache::{CacheStats, MemoryCache, QueryCache};
pub use use_cases::sql_generator::SqlGenerator;
pub use use_cases::template_matcher::TemplateMatcher;
