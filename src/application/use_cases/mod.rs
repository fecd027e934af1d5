pub mod classifier;
pub mod ip_protection;
pub mod pipeline;
pub mod prompt_engine;
pub mod query_cache;
pub mod sql_generator;
pub mod template_matcher;
