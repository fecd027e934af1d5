use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum LLMProvider {
    Local,
    OpenAI,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LLMConfig {
    pub provider: LLMProvider,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::OpenAI,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            max_tokens: Some(300),
            temperature: Some(0.1),
        }
    }
}

impl LLMConfig {
    /// Read the base configuration from the environment (`.env` supported).
    ///
    /// `OPENAI_API_KEY` supplies the key; `LUXQUERY_BASE_URL` and
    /// `LUXQUERY_MODEL` override the endpoint and model id.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let mut config = Self::default();
        config.api_key = std::env::var("OPENAI_API_KEY").ok();
        if let Ok(base_url) = std::env::var("LUXQUERY_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(model) = std::env::var("LUXQUERY_MODEL") {
            config.model = model;
        }
        config
    }

    /// Stage config for intent classification: low temperature, short answers.
    pub fn for_classification(&self) -> Self {
        Self {
            temperature: Some(0.1),
            max_tokens: Some(150),
            ..self.clone()
        }
    }

    /// Stage config for SQL generation: very low temperature for consistent SQL.
    pub fn for_sql_generation(&self) -> Self {
        Self {
            temperature: Some(0.05),
            max_tokens: Some(300),
            ..self.clone()
        }
    }
}
