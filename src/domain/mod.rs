pub mod error;
pub mod llm_config;
pub mod query_entities;
