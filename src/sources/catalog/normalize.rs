//! Mapping of models.dev entries onto [`ModelRecord`]s.

use chrono::{DateTime, NaiveDate, Utc};

use super::types::{Catalog, CatalogModel};
use crate::models::{
    Capability, Modalities, ModelRecord, PriceRates, Pricing, BASE_MODEL_KEY, INFERENCE_PROFILE_KEY,
    STANDARD_TIER, TEXT_TOKENS,
};

pub(super) const CATALOG_SOURCE: &str = "models.dev";

/// Routing prefixes Bedrock puts in front of cross-region inference profile ids,
/// e.g. `us.anthropic.claude-3-haiku-20240307-v1:0`.
const REGION_PREFIXES: [&str; 9] = [
    "us-gov.", "us.", "eu.", "apac.", "ap.", "jp.", "au.", "ca.", "global.",
];

/// Maps a models.dev provider id onto the provider slug used in records.
pub fn provider_slug(catalog_id: &str) -> &str {
    match catalog_id {
        "amazon-bedrock" => "bedrock",
        "google" => "gemini",
        "google-vertex" => "vertexai",
        "azure" => "azure",
        other => other,
    }
}

/// Splits a region-qualified Bedrock id into its region-free base id.
fn strip_region(id: &str) -> Option<&str> {
    REGION_PREFIXES
        .iter()
        .find_map(|prefix| id.strip_prefix(prefix))
        .filter(|rest| !rest.is_empty())
}

/// Parses `YYYY-MM-DD` or `YYYY-MM` (taken as the first of the month).
fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d"))
        .ok()
}

fn start_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}

/// The release date when it parses, else the last-updated date.
fn created_at(model: &CatalogModel) -> Option<DateTime<Utc>> {
    [model.release_date.as_deref(), model.last_updated.as_deref()]
        .into_iter()
        .flatten()
        .find_map(parse_date)
        .and_then(start_of_day)
}

fn positive(value: Option<i64>) -> Option<u64> {
    value.filter(|v| *v > 0).map(|v| v as u64)
}

fn capabilities(model: &CatalogModel, modalities: &Modalities) -> Vec<Capability> {
    let mut capabilities = Vec::new();

    if model.tool_call {
        capabilities.push(Capability::FunctionCalling);
    }

    if model.structured_output {
        capabilities.push(Capability::StructuredOutput);
    }

    if model.reasoning {
        capabilities.push(Capability::Reasoning);
    }

    if modalities.accepts("image") {
        capabilities.push(Capability::Vision);
    }

    capabilities
}

fn pricing(model: &CatalogModel) -> Pricing {
    let Some(cost) = model.cost() else {
        return Pricing::default();
    };

    Pricing::new().with_rates(
        TEXT_TOKENS,
        STANDARD_TIER,
        PriceRates {
            input_per_million: cost.input,
            output_per_million: cost.output,
            cached_input_per_million: cost.cache_read,
            reasoning_output_per_million: cost.reasoning,
        },
    )
}

/// Normalizes one catalog entry. Returns `None` for entries without a usable id.
pub fn normalize_model(catalog_provider: &str, model: &CatalogModel) -> Option<ModelRecord> {
    let provider = provider_slug(catalog_provider);

    // Every regional listing stays its own record; the base id ties it to its siblings
    let base = strip_region(&model.id).filter(|_| provider == "bedrock");

    let mut record = match ModelRecord::new(model.id.as_str(), provider) {
        Ok(record) => record,
        Err(e) => {
            tracing::debug!(provider = catalog_provider, error = %e, "Skipping catalog entry");
            return None;
        }
    };

    let modalities = Modalities::new(
        model.modalities.input.iter().cloned(),
        model.modalities.output.iter().cloned(),
    );

    record = record
        .with_capabilities(capabilities(model, &modalities))
        .with_modalities(modalities)
        .with_pricing(pricing(model))
        .with_metadata("source", CATALOG_SOURCE)
        .with_metadata("provider_id", catalog_provider);

    if let Some(name) = model.name.as_deref().filter(|n| !n.is_empty()) {
        record = record.with_name(name);
    }

    if let Some(family) = model.family.as_deref().filter(|f| !f.is_empty()) {
        record = record.with_family(family);
    }

    if let Some(created_at) = created_at(model) {
        record = record.with_created_at(created_at);
    }

    if let Some(cutoff) = model.knowledge.as_deref().and_then(parse_date) {
        record = record.with_knowledge_cutoff(cutoff);
    }

    if let Some(limit) = model.limit() {
        if let Some(context) = positive(limit.context) {
            record = record.with_context_window(context);
        }

        if let Some(output) = positive(limit.output) {
            record = record.with_max_output_tokens(output);
        }
    }

    if let Some(base) = base {
        record = record
            .with_metadata(INFERENCE_PROFILE_KEY, model.id.as_str())
            .with_metadata(BASE_MODEL_KEY, base);
    }

    // Raw upstream fields travel along untouched
    if let Some(cost) = &model.cost {
        record = record.with_metadata("cost", cost.clone());
    }

    if let Some(limit) = &model.limit {
        record = record.with_metadata("limit", limit.clone());
    }

    if let Some(knowledge) = &model.knowledge {
        record = record.with_metadata("knowledge", knowledge.as_str());
    }

    if let Some(last_updated) = &model.last_updated {
        record = record.with_metadata("last_updated", last_updated.as_str());
    }

    Some(record)
}

/// Normalizes every model of every provider in the catalog, in provider and then
/// model id order.
pub fn normalize(catalog: &Catalog) -> Vec<ModelRecord> {
    catalog
        .iter()
        .flat_map(|(key, provider)| {
            let catalog_provider = if provider.id.is_empty() { key } else { &provider.id };

            provider
                .models
                .values()
                .filter_map(move |model| normalize_model(catalog_provider, model))
        })
        .collect()
}
