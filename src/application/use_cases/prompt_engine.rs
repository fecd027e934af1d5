//! Prompt construction and model-output parsing for both pipeline stages.
//!
//! Prompts are deliberately short; both stages expect a single JSON object
//! back and treat the content as untrusted text until it validates.

use crate::domain::query_entities::RequestType;

const CLASSIFICATION_SYSTEM_PROMPT: &str = r#"Classify lighting-product requests into one of:
1. "product_recommendation" - wants product suggestions for a need
2. "product_question" - asks about a specific, named product
3. "product_comparison" - compares products or properties
4. "similar_product_search" - looks for products similar to a known one

Examples:
"LED spots for my living room" -> product_recommendation
"How many lumen does the Tevo downlight have?" -> product_question
"Difference between warm white and cold white?" -> product_comparison
"Anything similar to the XYZ LED strip?" -> similar_product_search

Answer with JSON only: {"type":"category","confidence":0.9,"reasoning":"short"}"#;

const SQL_SYSTEM_PROMPT: &str = r#"Generate PostgreSQL for a lighting-product catalog.

Table "products":
- id, vysn_name, gross_price, category_1, category_2
- lumen, wattage, cct, ingress_protection
- availability (boolean)

IP filter: for "at least IP44" use ingress_protection IN ('IP44','IP54','IP65','IP67','IP68')

Luminaire type filter:
- ceiling: category_2 IN ('Recessed ceiling luminaires','Surface ceiling luminares')
- wall: category_2 LIKE '%wall%'
- outdoor: category_1 = 'Outdoor'

For luminaire requests always add: category_1 NOT IN ('Components','Spare parts') AND category_2 NOT IN ('Electrical components','LED modules','Transformers')
Only available rows: availability = true
Sort: ORDER BY gross_price ASC
Limit: LIMIT 20
Use placeholders ($1, $2, ...) for values and return them under "parameters".

Answer with JSON only: {"query":"SELECT ...","parameters":{},"explanation":"short"}"#;

pub struct PromptEngine;

impl PromptEngine {
    pub fn classification_system_prompt() -> &'static str {
        CLASSIFICATION_SYSTEM_PROMPT
    }

    /// Only the most recent context entry is carried along; older turns add
    /// tokens without improving classification.
    pub fn classification_user_prompt(text: &str, context: Option<&[String]>) -> String {
        match context.and_then(|entries| entries.last()) {
            Some(last) => format!("\"{}\" (context: {})", text, last),
            None => format!("\"{}\"", text),
        }
    }

    pub fn sql_system_prompt() -> &'static str {
        SQL_SYSTEM_PROMPT
    }

    pub fn sql_user_prompt(
        text: &str,
        request_type: RequestType,
        context: Option<&[String]>,
    ) -> String {
        match context.and_then(|entries| entries.last()) {
            Some(last) => format!("{}: \"{}\" (context: {})", request_type, text, last),
            None => format!("{}: \"{}\"", request_type, text),
        }
    }

    /// Locate the JSON object inside a model answer, tolerating markdown
    /// code fences and surrounding prose.
    pub fn extract_json(content: &str) -> Option<&str> {
        let trimmed = content
            .trim()
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim();
        let start = trimmed.find('{')?;
        let end = trimmed.rfind('}')?;
        if end < start {
            return None;
        }
        Some(&trimmed[start..=end])
    }
}
