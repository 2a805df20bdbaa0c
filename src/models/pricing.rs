use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Token class used for ordinary text input and output.
pub const TEXT_TOKENS: &str = "text_tokens";

/// Tier used for pay-as-you-go rates.
pub const STANDARD_TIER: &str = "standard";

/// Rates in dollars per million tokens. Any rate may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_per_million: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_per_million: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_input_per_million: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_output_per_million: Option<f64>,
}

impl PriceRates {
    pub fn is_empty(&self) -> bool {
        self.input_per_million.is_none()
            && self.output_per_million.is_none()
            && self.cached_input_per_million.is_none()
            && self.reasoning_output_per_million.is_none()
    }
}

/// Pricing keyed by token class (`text_tokens`, ...) and then by tier
/// (`standard`, `batch`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pricing(BTreeMap<String, BTreeMap<String, PriceRates>>);

impl Pricing {
    pub fn new() -> Pricing {
        Pricing::default()
    }

    /// Returns a copy with the given rates set. Empty rates are not stored.
    pub fn with_rates(mut self, class: &str, tier: &str, rates: PriceRates) -> Pricing {
        if rates.is_empty() {
            return self;
        }

        self.0
            .entry(class.to_string())
            .or_default()
            .insert(tier.to_string(), rates);

        self
    }

    pub fn rates(&self, class: &str, tier: &str) -> Option<&PriceRates> {
        self.0.get(class).and_then(|tiers| tiers.get(tier))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn standard_text(&self) -> Option<&PriceRates> {
        self.rates(TEXT_TOKENS, STANDARD_TIER)
    }

    pub fn input_per_million(&self) -> Option<f64> {
        self.standard_text().and_then(|r| r.input_per_million)
    }

    pub fn output_per_million(&self) -> Option<f64> {
        self.standard_text().and_then(|r| r.output_per_million)
    }

    pub fn cached_input_per_million(&self) -> Option<f64> {
        self.standard_text().and_then(|r| r.cached_input_per_million)
    }

    pub fn reasoning_output_per_million(&self) -> Option<f64> {
        self.standard_text()
            .and_then(|r| r.reasoning_output_per_million)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_text_accessors() {
        let pricing = Pricing::new().with_rates(
            TEXT_TOKENS,
            STANDARD_TIER,
            PriceRates {
                input_per_million: Some(2.5),
                output_per_million: Some(10.0),
                cached_input_per_million: Some(1.25),
                reasoning_output_per_million: None,
            },
        );

        assert_eq!(pricing.input_per_million(), Some(2.5));
        assert_eq!(pricing.output_per_million(), Some(10.0));
        assert_eq!(pricing.cached_input_per_million(), Some(1.25));
        assert_eq!(pricing.reasoning_output_per_million(), None);
        assert!(pricing.rates(TEXT_TOKENS, "batch").is_none());
    }

    #[test]
    fn test_empty_rates_are_dropped() {
        let pricing = Pricing::new().with_rates(TEXT_TOKENS, STANDARD_TIER, PriceRates::default());

        assert!(pricing.is_empty());
        assert_eq!(pricing.input_per_million(), None);
    }

    #[test]
    fn test_nested_document_shape() {
        let json = r#"{"text_tokens":{"standard":{"input_per_million":3.0,"output_per_million":15.0}}}"#;

        let pricing: Pricing = serde_json::from_str(json).unwrap();
        assert_eq!(pricing.input_per_million(), Some(3.0));
        assert_eq!(serde_json::to_string(&pricing).unwrap(), json);
    }
}
