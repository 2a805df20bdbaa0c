use std::env::VarError;
use std::sync::Arc;

use super::default_priority::CATALOG_PRIORITY;
use super::{Aliases, Error, Registry};
use crate::config::{Config, ProviderActivationPolicy};
use crate::providers::providers::{OllamaProvider, OpenAIProvider, ProviderIdentifier};
use crate::sources::catalog::CatalogSource;

pub const OPENAI_ENV_KEY_VAR: &str = "OPENAI_API_KEY";

fn openai_api_key() -> Option<String> {
    match std::env::var(OPENAI_ENV_KEY_VAR) {
        Ok(api_key) if !api_key.is_empty() => Some(api_key),
        Ok(_) | Err(VarError::NotPresent) => None,
        Err(VarError::NotUnicode(_)) => {
            tracing::warn!(var = OPENAI_ENV_KEY_VAR, "Ignoring API key that is not valid unicode");
            None
        }
    }
}

fn add_catalog(registry: &mut Registry, config: &Config) -> Result<(), Error> {
    let catalog = &config.catalog;

    if catalog.activate == ProviderActivationPolicy::Disabled {
        return Ok(());
    }

    let source = match &catalog.api_url {
        Some(url) => CatalogSource::with_url(url.as_str()),
        None => CatalogSource::new(),
    }
    .map_err(Error::CatalogSetup)?;

    registry.add_source(
        Arc::new(source),
        catalog.priority.unwrap_or(CATALOG_PRIORITY),
    );

    Ok(())
}

fn add_ollama(registry: &mut Registry, config: &Config) -> Result<(), Error> {
    let ollama = &config.providers.ollama;

    // A daemon that is not running just becomes a failed source on refresh
    if ollama.activate == ProviderActivationPolicy::Disabled {
        return Ok(());
    }

    let provider = match &ollama.api_base {
        Some(api_base) => OllamaProvider::with_api_base(api_base.as_str()),
        None => OllamaProvider::new(),
    }
    .map_err(|e| Error::ProviderSetup(ProviderIdentifier::Ollama, e))?;

    registry.add_provider(Arc::new(provider), ollama.priority);

    Ok(())
}

fn add_openai(registry: &mut Registry, config: &Config, env_key: Option<String>) -> Result<(), Error> {
    let openai = &config.providers.openai;

    let api_key = openai.api_key.clone().or(env_key);

    let api_key = match (openai.activate, api_key) {
        (ProviderActivationPolicy::Disabled, _) | (ProviderActivationPolicy::Auto, None) => {
            return Ok(())
        }
        (ProviderActivationPolicy::Enabled, None) => {
            return Err(Error::MissingApiKey {
                provider: ProviderIdentifier::OpenAI,
                env: OPENAI_ENV_KEY_VAR,
            })
        }
        (_, Some(api_key)) => api_key,
    };

    let provider = match &openai.api_base {
        Some(api_base) => OpenAIProvider::new(&api_key, api_base.as_str()),
        None => OpenAIProvider::with_api_key(&api_key),
    }
    .map_err(|e| Error::ProviderSetup(ProviderIdentifier::OpenAI, e))?;

    registry.add_provider(Arc::new(provider), openai.priority);

    Ok(())
}

fn build(config: &Config, openai_env_key: Option<String>) -> Result<Registry, Error> {
    let registry_config = &config.registry;

    let mut registry = Registry::new().with_fetch_timeout(registry_config.fetch_timeout());

    if let Some(timeout) = registry_config.refresh_timeout() {
        registry = registry.with_refresh_timeout(timeout);
    }

    if let Some(path) = &registry_config.snapshot {
        registry = registry.with_snapshot_path(path);
    }

    if let Some(path) = &registry_config.aliases {
        registry = registry.with_aliases(Aliases::load(path)?);
    }

    // The catalog comes first so it loses priority ties against live listings
    add_catalog(&mut registry, config)?;
    add_ollama(&mut registry, config)?;
    add_openai(&mut registry, config, openai_env_key)?;

    Ok(registry)
}

/// Populate a registry with the configured sources and providers
pub fn populated_registry(config: &Config) -> Result<Registry, Error> {
    build(config, openai_api_key())
}
