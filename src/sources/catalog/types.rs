//! Wire types for the models.dev catalog.
//!
//! Only the fields the catalog adapter consumes are declared; anything else in the
//! document is ignored. Maps are ordered so normalization is deterministic.

use std::collections::BTreeMap;

use serde::Deserialize;

/// The complete catalog, mapping provider ids to provider definitions.
pub type Catalog = BTreeMap<String, CatalogProvider>;

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogProvider {
    /// Provider identifier (e.g. "anthropic", "amazon-bedrock")
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub models: BTreeMap<String, CatalogModel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogModel {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub family: Option<String>,

    #[serde(default)]
    pub attachment: bool,

    #[serde(default)]
    pub reasoning: bool,

    #[serde(default)]
    pub tool_call: bool,

    #[serde(default)]
    pub structured_output: bool,

    /// Knowledge cutoff (YYYY-MM or YYYY-MM-DD)
    #[serde(default)]
    pub knowledge: Option<String>,

    /// Release date (YYYY-MM-DD, sometimes YYYY-MM)
    #[serde(default)]
    pub release_date: Option<String>,

    #[serde(default)]
    pub last_updated: Option<String>,

    #[serde(default)]
    pub modalities: CatalogModalities,

    /// Kept as raw JSON so it can be carried into metadata unchanged.
    #[serde(default)]
    pub cost: Option<serde_json::Value>,

    #[serde(default)]
    pub limit: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogModalities {
    #[serde(default)]
    pub input: Vec<String>,

    #[serde(default)]
    pub output: Vec<String>,
}

/// Pricing in dollars per million tokens.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CatalogCost {
    #[serde(default)]
    pub input: Option<f64>,

    #[serde(default)]
    pub output: Option<f64>,

    #[serde(default)]
    pub reasoning: Option<f64>,

    #[serde(default)]
    pub cache_read: Option<f64>,
}

/// Context and output limits in tokens.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CatalogLimit {
    #[serde(default)]
    pub context: Option<i64>,

    #[serde(default)]
    pub output: Option<i64>,
}

impl CatalogModel {
    /// The typed view of `cost`, or `None` when it is absent or not an object.
    pub fn cost(&self) -> Option<CatalogCost> {
        self.cost
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn limit(&self) -> Option<CatalogLimit> {
        self.limit
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalog_model() {
        let json = r#"{
            "id": "claude-opus-4-5",
            "name": "Claude Opus 4.5",
            "family": "claude-opus",
            "attachment": true,
            "reasoning": true,
            "tool_call": true,
            "temperature": true,
            "knowledge": "2025-03-31",
            "release_date": "2025-11-24",
            "modalities": {
                "input": ["text", "image", "pdf"],
                "output": ["text"]
            },
            "cost": {
                "input": 5.0,
                "output": 25.0,
                "cache_read": 0.5,
                "cache_write": 6.25
            },
            "limit": {
                "context": 200000,
                "output": 64000
            }
        }"#;

        let model: CatalogModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.id, "claude-opus-4-5");
        assert_eq!(model.family.as_deref(), Some("claude-opus"));
        assert!(model.tool_call);
        assert!(!model.structured_output);

        let cost = model.cost().unwrap();
        assert_eq!(cost.input, Some(5.0));
        assert_eq!(cost.cache_read, Some(0.5));
        assert_eq!(cost.reasoning, None);

        let limit = model.limit().unwrap();
        assert_eq!(limit.context, Some(200000));
        assert_eq!(limit.output, Some(64000));
    }

    #[test]
    fn test_parse_sparse_model() {
        let model: CatalogModel = serde_json::from_str(r#"{"id": "tiny"}"#).unwrap();

        assert!(model.modalities.input.is_empty());
        assert!(model.cost().is_none());
        assert!(model.limit().is_none());
    }
}
