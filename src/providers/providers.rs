//! Concrete types for providers, along with their identifiers

/// The `ProviderIdentifier` is a unique per-provider identifier. It is used to
/// differentiate providers at runtime in code which is generic over different
/// providers.
///
/// The `to_string` and `FromStr` forms match the `provider` field of the model
/// records a provider lists, and are part of the CLI, so they should remain stable.
#[derive(
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Clone,
    Copy,
    serde::Serialize,
    serde::Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProviderIdentifier {
    Ollama,
    OpenAI,
}

pub use super::ollama::OllamaProvider;
pub use super::openai::OpenAIProvider;
