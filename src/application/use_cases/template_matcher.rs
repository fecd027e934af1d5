//! Template fast path for common luminaire-plus-IP phrasings.
//!
//! An ordered rule table recognizes frequent query shapes and emits SQL
//! directly, skipping the model call. Rule order matters: specific
//! luminaire-type rules come before the generic "any luminaire + IP" rule,
//! so a ceiling query is never caught by the generic rule.

use crate::application::use_cases::ip_protection::{acceptable_classes, IpClass};
use crate::domain::query_entities::{RequestType, SqlGenerationResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Two-digit code following "ip", with optional whitespace ("ip44", "IP 54").
static IP_MIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)ip\s*(\d{2})").unwrap());

/// Category_1 values that are never luminaires.
const EXCLUDED_CAT1: &str = "'Components', 'Spare parts'";

/// One entry in the rule table. `keywords` and the "ip" token form the
/// trigger predicate on lowercased text; `build` emits the SQL result for
/// the resolved minimum IP class.
struct TemplateRule {
    name: &'static str,
    /// What the explanation calls the matched products.
    label: &'static str,
    keywords: &'static [&'static str],
    /// Subcategory restriction, if the rule targets one luminaire type.
    category_clause: Option<&'static str>,
    /// Subcategories excluded from the result set.
    excluded_cat2: &'static [&'static str],
    /// Minimum class assumed when the text names no concrete code.
    /// The asymmetry across rules is domain knowledge: ceiling and general
    /// fixtures commonly ship IP44-rated, wall fixtures facing weather
    /// commonly need IP65.
    default_min: IpClass,
}

impl TemplateRule {
    fn matches(&self, lower: &str) -> bool {
        lower.contains("ip") && self.keywords.iter().any(|kw| lower.contains(kw))
    }

    fn build(&self, min: IpClass) -> SqlGenerationResult {
        let accepted = acceptable_classes(min);

        let mut parameters: HashMap<String, Value> = HashMap::new();
        let placeholders: Vec<String> = accepted
            .iter()
            .enumerate()
            .map(|(i, class)| {
                let placeholder = format!("${}", i + 1);
                parameters.insert(placeholder.clone(), Value::String(class.as_str().to_string()));
                placeholder
            })
            .collect();

        let mut conditions: Vec<String> = Vec::new();
        if let Some(clause) = self.category_clause {
            conditions.push(clause.to_string());
        }
        conditions.push(format!("category_1 NOT IN ({})", EXCLUDED_CAT1));
        conditions.push(format!(
            "category_2 NOT IN ({})",
            self.excluded_cat2
                .iter()
                .map(|c| format!("'{}'", c))
                .collect::<Vec<_>>()
                .join(", ")
        ));
        conditions.push(format!(
            "ingress_protection IN ({})",
            placeholders.join(", ")
        ));
        conditions.push("availability = true".to_string());

        let query = format!(
            "SELECT * FROM products WHERE {} ORDER BY gross_price ASC LIMIT 20",
            conditions.join(" AND ")
        );

        SqlGenerationResult {
            query,
            parameters,
            explanation: format!("Template: {} rated at least {}", self.label, min),
        }
    }
}

/// Rules in priority order; the first whose trigger holds wins.
const RULES: &[TemplateRule] = &[
    TemplateRule {
        name: "ceiling_ip",
        label: "ceiling luminaires",
        keywords: &["deckenleuchte", "ceiling"],
        category_clause: Some(
            "category_2 IN ('Recessed ceiling luminaires', 'Surface ceiling luminares')",
        ),
        excluded_cat2: &["LED modules", "Electrical components"],
        default_min: IpClass::Ip44,
    },
    TemplateRule {
        name: "wall_ip",
        label: "wall luminaires",
        keywords: &["wandleuchte", "wall"],
        category_clause: Some("category_2 LIKE '%wall%'"),
        excluded_cat2: &["LED modules", "Electrical components"],
        default_min: IpClass::Ip65,
    },
    TemplateRule {
        name: "pendant_ip",
        label: "pendant luminaires",
        keywords: &["pendelleuchte", "pendant"],
        category_clause: Some("category_2 = 'Pendant lamps'"),
        excluded_cat2: &["LED modules", "Electrical components"],
        default_min: IpClass::Ip44,
    },
    TemplateRule {
        name: "floor_ip",
        label: "floor luminaires",
        keywords: &["stehleuchte", "floor"],
        category_clause: Some("category_2 = 'Floor lamps'"),
        excluded_cat2: &["LED modules", "Electrical components"],
        default_min: IpClass::Ip44,
    },
    TemplateRule {
        name: "generic_luminaire_ip",
        label: "luminaires",
        keywords: &["leuchte", "lampe", "licht", "luminaire", "light", "lamp"],
        category_clause: None,
        excluded_cat2: &[
            "Electrical components",
            "LED modules",
            "Transformers",
            "Control devices",
        ],
        default_min: IpClass::Ip44,
    },
];

/// Extract the minimum IP class named in the text, if any. Two-digit codes
/// outside the known vocabulary rank as IP44, same as everywhere else.
pub fn extract_min_class(lower: &str) -> Option<IpClass> {
    let captures = IP_MIN_RE.captures(lower)?;
    let code = format!("IP{}", &captures[1]);
    Some(IpClass::parse(&code).unwrap_or(IpClass::Ip44))
}

/// Deterministic, model-free SQL synthesis for common phrasings.
pub struct TemplateMatcher;

impl TemplateMatcher {
    pub fn new() -> Self {
        Self
    }

    /// First matching rule wins; `None` signals the caller to fall through
    /// to the model-backed generator. The request type does not influence
    /// rule selection.
    pub fn try_match(
        &self,
        text: &str,
        _request_type: RequestType,
    ) -> Option<SqlGenerationResult> {
        let lower = text.to_lowercase();
        let rule = RULES.iter().find(|rule| rule.matches(&lower))?;
        let min = extract_min_class(&lower).unwrap_or(rule.default_min);
        debug!(rule = rule.name, min = %min, "template fast path matched");
        Some(rule.build(min))
    }
}

impl Default for TemplateMatcher {
    fn default() -> Self {
        Self::new()
    }
}
