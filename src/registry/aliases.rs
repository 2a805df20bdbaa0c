//! User-facing shorthand ids.
//!
//! An alias maps a short id to the canonical id each provider lists the model
//! under, e.g. `claude-3-5-haiku` is `claude-3-5-haiku-20241022` at Anthropic and
//! `anthropic.claude-3-5-haiku-20241022-v1:0` on Bedrock. The table is fixed once
//! it is loaded.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use super::Error;

const BUILTIN_ALIASES: &str = include_str!("../../data/aliases.json");

lazy_static! {
    static ref BUILTIN: Arc<Aliases> = match Aliases::from_json(BUILTIN_ALIASES) {
        Ok(aliases) => Arc::new(aliases),
        Err(e) => {
            tracing::error!(error = %e, "The built-in alias table is malformed");
            Arc::new(Aliases::default())
        }
    };
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Aliases(BTreeMap<String, BTreeMap<String, String>>);

impl Aliases {
    /// The alias table shipped with the crate.
    pub fn builtin() -> Arc<Aliases> {
        BUILTIN.clone()
    }

    pub fn from_json(json: &str) -> Result<Aliases, Error> {
        serde_json::from_str(json).map_err(Error::MalformedAliases)
    }

    pub fn load(path: &Path) -> Result<Aliases, Error> {
        let json = std::fs::read_to_string(path).map_err(|source| Error::AliasesIo {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&json)
    }

    /// Adds (or replaces) the target of `alias` at `provider`.
    pub fn insert(&mut self, alias: &str, provider: &str, target: &str) {
        self.0
            .entry(alias.to_string())
            .or_default()
            .insert(provider.to_string(), target.to_string());
    }

    /// The `(provider, canonical id)` pairs `alias` stands for, in provider order.
    /// With a provider, only that provider's target is returned.
    pub fn targets<'a>(
        &'a self,
        alias: &str,
        provider: Option<&'a str>,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.0.get(alias).into_iter().flat_map(move |targets| {
            targets
                .iter()
                .filter(move |(p, _)| provider.map_or(true, |want| want == p.as_str()))
                .map(|(p, id)| (p.as_str(), id.as_str()))
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builtin_table_parses() {
        let aliases = Aliases::builtin();

        assert!(!aliases.is_empty());
        assert_eq!(
            aliases.targets("claude-3-5-haiku", Some("anthropic")).collect::<Vec<_>>(),
            vec![("anthropic", "claude-3-5-haiku-20241022")]
        );
    }

    #[test]
    fn test_targets_in_provider_order() {
        let mut aliases = Aliases::default();
        aliases.insert("haiku", "openrouter", "anthropic/claude-3.5-haiku");
        aliases.insert("haiku", "anthropic", "claude-3-5-haiku-20241022");

        assert_eq!(
            aliases.targets("haiku", None).collect::<Vec<_>>(),
            vec![
                ("anthropic", "claude-3-5-haiku-20241022"),
                ("openrouter", "anthropic/claude-3.5-haiku"),
            ]
        );
        assert_eq!(aliases.targets("haiku", Some("bedrock")).count(), 0);
        assert_eq!(aliases.targets("sonnet", None).count(), 0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, br#"{"fast": {"ollama": "llama3.2:1b"}}"#).unwrap();

        let aliases = Aliases::load(file.path()).unwrap();
        assert_eq!(aliases.len(), 1);
        assert_eq!(
            aliases.targets("fast", None).collect::<Vec<_>>(),
            vec![("ollama", "llama3.2:1b")]
        );
    }

    #[test]
    fn test_malformed_table() {
        assert!(matches!(
            Aliases::from_json(r#"{"fast": "llama3"}"#),
            Err(Error::MalformedAliases(_))
        ));
        assert!(matches!(
            Aliases::load(Path::new("/nonexistent/aliases.json")),
            Err(Error::AliasesIo { path, .. }) if path == Path::new("/nonexistent/aliases.json")
        ));
    }
}
