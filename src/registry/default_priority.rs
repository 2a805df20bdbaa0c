use crate::providers::providers::ProviderIdentifier;

/// The models.dev catalog is the source of last resort.
pub const CATALOG_PRIORITY: u8 = 0;

/// Live listings outrank the catalog. A local Ollama daemon knows best what it serves.
pub fn default_priority(provider_id: ProviderIdentifier) -> u8 {
    match provider_id {
        ProviderIdentifier::Ollama => 20,
        ProviderIdentifier::OpenAI => 10,
    }
}
