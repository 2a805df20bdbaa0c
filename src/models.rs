//! Model metadata records.
//!
//! A [`ModelRecord`] describes one model as served by one provider. Records are built
//! once, either by a source adapter or by reading a snapshot, and are never mutated
//! afterwards; the registry shares them behind [`std::sync::Arc`]. The pair
//! `(provider, id)` is the identity of a record: the same model id is routinely
//! listed by several providers.

pub mod collection;
mod modalities;
mod pricing;

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use self::collection::ModelCollection;
pub use self::modalities::Modalities;
pub use self::pricing::{PriceRates, Pricing, STANDARD_TIER, TEXT_TOKENS};

/// Metadata key holding the region-qualified identifier a provider expects at call
/// time (e.g. a Bedrock inference profile such as `us.anthropic.claude-3-haiku`).
pub const INFERENCE_PROFILE_KEY: &str = "inference_profile_id";

/// Metadata key holding the region-free id of a region-qualified listing, e.g.
/// `anthropic.claude-3-haiku` for `us.anthropic.claude-3-haiku`.
pub const BASE_MODEL_KEY: &str = "base_model_id";

/// Metadata key set on records that were synthesized rather than listed by a source.
pub const WARNING_KEY: &str = "warning";

/// Provider slug used for synthesized records when the caller named no provider.
pub const UNKNOWN_PROVIDER: &str = "unknown";

const ASSUMED_WARNING: &str = "Assuming model exists, capabilities may not be accurate";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("model id must not be empty")]
    EmptyId,
    #[error("provider of model \"{0}\" must not be empty")]
    EmptyProvider(String),
}

/// Well-known capability tags.
///
/// Capabilities are stored as plain strings so that tags introduced by upstream
/// sources survive a round trip; this enum only names the ones the crate derives
/// itself.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
    strum_macros::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
    FunctionCalling,
    Streaming,
    Vision,
    StructuredOutput,
    Reasoning,
    Batch,
}

/// The primary kind of a model, derived from its output modalities.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ModelType {
    Chat,
    Embedding,
    Image,
    Audio,
}

impl ModelType {
    /// Embedding, image and audio outputs define the type only when the model does
    /// not also produce text.
    pub fn from_modalities(modalities: &Modalities) -> ModelType {
        if modalities.produces("text") {
            return ModelType::Chat;
        }

        if modalities.produces("embeddings") {
            ModelType::Embedding
        } else if modalities.produces("image") {
            ModelType::Image
        } else if modalities.produces("audio") {
            ModelType::Audio
        } else {
            ModelType::Chat
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    id: String,
    name: String,
    provider: String,
    #[serde(default)]
    family: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    knowledge_cutoff: Option<NaiveDate>,
    #[serde(default)]
    context_window: Option<u64>,
    #[serde(default)]
    max_output_tokens: Option<u64>,
    #[serde(default)]
    modalities: Modalities,
    #[serde(default)]
    capabilities: BTreeSet<String>,
    #[serde(default)]
    pricing: Pricing,
    #[serde(default)]
    metadata: BTreeMap<String, serde_json::Value>,
}

impl ModelRecord {
    /// Creates a record with the given identity. The display name defaults to the id.
    pub fn new(id: impl Into<String>, provider: impl Into<String>) -> Result<ModelRecord, RecordError> {
        let record = ModelRecord {
            name: String::new(),
            id: id.into(),
            provider: provider.into(),
            family: None,
            created_at: None,
            knowledge_cutoff: None,
            context_window: None,
            max_output_tokens: None,
            modalities: Modalities::default(),
            capabilities: BTreeSet::new(),
            pricing: Pricing::default(),
            metadata: BTreeMap::new(),
        };

        record.validate()?;

        Ok(ModelRecord {
            name: record.id.clone(),
            ..record
        })
    }

    /// Synthesizes a record for a model no source has listed. The capability set is a
    /// guess and the record carries a [`WARNING_KEY`] entry saying so.
    pub fn assumed(id: &str, provider: Option<&str>) -> Result<ModelRecord, RecordError> {
        let provider = provider.unwrap_or(UNKNOWN_PROVIDER);

        Ok(ModelRecord::new(id, provider)?
            .with_modalities(Modalities::new(["text"], ["text"]))
            .with_capabilities([
                Capability::FunctionCalling,
                Capability::Streaming,
                Capability::Vision,
                Capability::StructuredOutput,
            ])
            .with_metadata(WARNING_KEY, ASSUMED_WARNING))
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        if self.id.is_empty() {
            return Err(RecordError::EmptyId);
        }

        if self.provider.is_empty() {
            return Err(RecordError::EmptyProvider(self.id.clone()));
        }

        Ok(())
    }

    pub fn with_name(mut self, name: impl Into<String>) -> ModelRecord {
        self.name = name.into();
        self
    }

    pub fn with_family(mut self, family: impl Into<String>) -> ModelRecord {
        self.family = Some(family.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> ModelRecord {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_knowledge_cutoff(mut self, cutoff: NaiveDate) -> ModelRecord {
        self.knowledge_cutoff = Some(cutoff);
        self
    }

    pub fn with_context_window(mut self, tokens: u64) -> ModelRecord {
        self.context_window = Some(tokens);
        self
    }

    pub fn with_max_output_tokens(mut self, tokens: u64) -> ModelRecord {
        self.max_output_tokens = Some(tokens);
        self
    }

    pub fn with_modalities(mut self, modalities: Modalities) -> ModelRecord {
        self.modalities = modalities;
        self
    }

    pub fn with_capabilities<I, C>(mut self, capabilities: I) -> ModelRecord
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        self.capabilities
            .extend(capabilities.into_iter().map(|c| c.as_ref().to_string()));
        self
    }

    pub fn with_pricing(mut self, pricing: Pricing) -> ModelRecord {
        self.pricing = pricing;
        self
    }

    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> ModelRecord {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn knowledge_cutoff(&self) -> Option<NaiveDate> {
        self.knowledge_cutoff
    }

    pub fn context_window(&self) -> Option<u64> {
        self.context_window
    }

    pub fn max_output_tokens(&self) -> Option<u64> {
        self.max_output_tokens
    }

    pub fn modalities(&self) -> &Modalities {
        &self.modalities
    }

    pub fn capabilities(&self) -> &BTreeSet<String> {
        &self.capabilities
    }

    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    pub fn metadata(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.metadata
    }

    /// The key that identifies this record across sources.
    pub fn key(&self) -> (&str, &str) {
        (&self.provider, &self.id)
    }

    pub fn model_type(&self) -> ModelType {
        ModelType::from_modalities(&self.modalities)
    }

    /// Returns whether the record lists the given capability tag.
    pub fn supports<C: AsRef<str>>(&self, capability: C) -> bool {
        self.capabilities.contains(capability.as_ref())
    }

    /// Returns whether the record carries a region-qualified identifier.
    pub fn is_region_qualified(&self) -> bool {
        self.inference_profile_id().is_some()
    }

    pub fn inference_profile_id(&self) -> Option<&str> {
        self.metadata
            .get(INFERENCE_PROFILE_KEY)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }

    /// The region-free id of a region-qualified listing.
    pub fn base_model_id(&self) -> Option<&str> {
        self.metadata
            .get(BASE_MODEL_KEY)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Returns whether a request for `id` names this record, either by its own id,
    /// its inference profile or the base id it qualifies.
    pub fn answers_to(&self, id: &str) -> bool {
        self.id == id
            || self.inference_profile_id() == Some(id)
            || self.base_model_id() == Some(id)
    }

    /// The identifier to send to the provider when calling this model.
    pub fn dispatch_id(&self) -> &str {
        self.inference_profile_id().unwrap_or(&self.id)
    }

    /// Returns the warning attached to synthesized records.
    pub fn warning(&self) -> Option<&str> {
        self.metadata.get(WARNING_KEY).and_then(|v| v.as_str())
    }
}
