//! Resolution of a requested model id to exactly one record.
//!
//! Resolution runs in a fixed order, scoped to the requested provider when there is
//! one:
//!
//! 1. Records whose id is exactly the requested id. A record also matches when its
//!    region-qualified inference profile id is the requested id.
//! 2. If several records match, the first region-qualified one wins, since that is
//!    the form the provider accepts at call time. Otherwise the first in collection
//!    order wins.
//! 3. Only without any exact match, the alias table is consulted and each canonical
//!    id it yields is tried as an exact match.
//! 4. Failing that, resolution fails with [`Error::ModelNotFound`], unless the
//!    caller asked to assume the model exists, in which case a record is synthesized.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::{Aliases, Error};
use crate::models::{ModelCollection, ModelRecord};
use crate::providers::providers::ProviderIdentifier;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Synthesize a record instead of failing when nothing matches.
    pub assume_exists: bool,
}

impl ResolveOptions {
    pub fn assume_exists() -> ResolveOptions {
        ResolveOptions {
            assume_exists: true,
        }
    }
}

/// A parsed `provider/model` or `model` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub provider: Option<String>,
    pub model: String,
}

impl ModelSpec {
    /// Parses a model spec. The part before the first `/` is taken as the provider
    /// only when it names a known provider.
    pub fn parse(spec: &str) -> Result<ModelSpec, Error> {
        let spec = spec.trim();

        let (provider, model) = match spec.split_once('/') {
            Some((provider, model)) if ProviderIdentifier::from_str(provider).is_ok() => {
                (Some(provider.to_string()), model)
            }
            _ => (None, spec),
        };

        if model.is_empty() {
            return Err(Error::EmptyModelId);
        }

        Ok(ModelSpec {
            provider,
            model: model.to_string(),
        })
    }

    /// Builds a spec for a provider given separately from the model id.
    pub fn scoped(provider: Option<&str>, model: &str) -> Result<ModelSpec, Error> {
        match provider.filter(|p| !p.is_empty()) {
            Some(provider) if !model.is_empty() => Ok(ModelSpec {
                provider: Some(provider.to_string()),
                model: model.to_string(),
            }),
            Some(_) => Err(Error::EmptyModelId),
            None => Self::parse(model),
        }
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "{}/", provider)?;
        }

        write!(f, "{}", self.model)
    }
}

#[derive(Debug, Clone)]
pub struct Resolver {
    aliases: Arc<Aliases>,
}

impl Resolver {
    /// A resolver using the built-in alias table.
    pub fn builtin() -> Resolver {
        Resolver {
            aliases: Aliases::builtin(),
        }
    }

    pub fn new(aliases: Aliases) -> Resolver {
        Resolver {
            aliases: Arc::new(aliases),
        }
    }

    pub fn aliases(&self) -> &Aliases {
        &self.aliases
    }

    pub fn resolve(
        &self,
        models: &ModelCollection,
        id: &str,
        provider: Option<&str>,
        options: ResolveOptions,
    ) -> Result<Arc<ModelRecord>, Error> {
        if id.is_empty() {
            return Err(Error::EmptyModelId);
        }

        let provider = provider.filter(|p| !p.is_empty());

        if let Some(model) = exact_match(models, id, provider) {
            return Ok(model);
        }

        for (alias_provider, canonical) in self.aliases.targets(id, provider) {
            if let Some(model) = exact_match(models, canonical, Some(alias_provider)) {
                tracing::debug!(
                    alias = id,
                    provider = alias_provider,
                    model = canonical,
                    "Resolved model alias"
                );
                return Ok(model);
            }
        }

        if options.assume_exists {
            let model = ModelRecord::assumed(id, provider)?;

            tracing::warn!(
                model = id,
                provider = model.provider(),
                "Assuming model exists, capabilities may not be accurate"
            );

            return Ok(Arc::new(model));
        }

        Err(Error::ModelNotFound {
            id: id.to_string(),
            provider: provider.map(str::to_string),
        })
    }

    pub fn resolve_spec(
        &self,
        models: &ModelCollection,
        spec: &ModelSpec,
        options: ResolveOptions,
    ) -> Result<Arc<ModelRecord>, Error> {
        self.resolve(models, spec.model(), spec.provider(), options)
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Resolver::builtin()
    }
}

fn exact_match(
    models: &ModelCollection,
    id: &str,
    provider: Option<&str>,
) -> Option<Arc<ModelRecord>> {
    let mut first = None;

    let matches = models.iter().filter(|m| {
        m.answers_to(id)
            && provider.map_or(true, |p| m.provider() == p)
    });

    for model in matches {
        if model.is_region_qualified() {
            return Some(model.clone());
        }

        first.get_or_insert_with(|| model.clone());
    }

    first
}
