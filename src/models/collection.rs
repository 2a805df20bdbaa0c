//! An immutable, ordered collection of model records with chainable filters.
//!
//! Every filter returns a new [`ModelCollection`]; the records themselves are shared
//! between collections, so chaining filters only copies pointers. The order of a
//! collection is the merge order of the snapshot it came from and carries no
//! ranking. Filters keep that order, which makes independent filters commute.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{ModelRecord, ModelType};
use crate::registry::resolver::{ResolveOptions, Resolver};
use crate::registry::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelCollection {
    models: Arc<[Arc<ModelRecord>]>,
}

impl Default for ModelCollection {
    fn default() -> Self {
        ModelCollection {
            models: Arc::from(Vec::new()),
        }
    }
}

impl ModelCollection {
    pub fn new(models: Vec<ModelRecord>) -> ModelCollection {
        models.into_iter().map(Arc::new).collect()
    }

    pub fn empty() -> ModelCollection {
        ModelCollection::default()
    }

    /// The records of the collection, in order.
    pub fn all(&self) -> &[Arc<ModelRecord>] {
        &self.models
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<ModelRecord>> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Keeps the records for which `predicate` holds.
    pub fn select<P>(&self, mut predicate: P) -> ModelCollection
    where
        P: FnMut(&ModelRecord) -> bool,
    {
        self.models
            .iter()
            .filter(|m| predicate(m))
            .cloned()
            .collect()
    }

    /// Partitions the collection by `key`. Each group keeps the collection order.
    pub fn group_by<K, F>(&self, mut key: F) -> BTreeMap<K, ModelCollection>
    where
        K: Ord,
        F: FnMut(&ModelRecord) -> K,
    {
        let mut groups: BTreeMap<K, Vec<Arc<ModelRecord>>> = BTreeMap::new();

        for model in self.models.iter() {
            groups.entry(key(model)).or_default().push(model.clone());
        }

        groups
            .into_iter()
            .map(|(k, models)| (k, models.into_iter().collect()))
            .collect()
    }

    pub fn by_provider(&self, provider: &str) -> ModelCollection {
        self.select(|m| m.provider() == provider)
    }

    pub fn by_family(&self, family: &str) -> ModelCollection {
        self.select(|m| m.family() == Some(family))
    }

    pub fn by_type(&self, model_type: ModelType) -> ModelCollection {
        match model_type {
            ModelType::Chat => self.chat_models(),
            ModelType::Embedding => self.embedding_models(),
            ModelType::Image => self.image_models(),
            ModelType::Audio => self.audio_models(),
        }
    }

    // A model counts for a kind when that kind is its primary type or one of its
    // outputs.

    pub fn chat_models(&self) -> ModelCollection {
        self.select(|m| m.model_type() == ModelType::Chat || m.modalities().produces("text"))
    }

    pub fn embedding_models(&self) -> ModelCollection {
        self.select(|m| {
            m.model_type() == ModelType::Embedding || m.modalities().produces("embeddings")
        })
    }

    pub fn audio_models(&self) -> ModelCollection {
        self.select(|m| m.model_type() == ModelType::Audio || m.modalities().produces("audio"))
    }

    pub fn image_models(&self) -> ModelCollection {
        self.select(|m| m.model_type() == ModelType::Image || m.modalities().produces("image"))
    }

    /// Resolves a model id (optionally scoped to a provider) using the built-in
    /// alias table. Fails with [`Error::ModelNotFound`] rather than returning nothing.
    pub fn find(&self, id: &str, provider: Option<&str>) -> Result<Arc<ModelRecord>, Error> {
        Resolver::builtin().resolve(self, id, provider, ResolveOptions::default())
    }

    /// Returns whether two collections hold the same records, ignoring order.
    pub fn same_records(&self, other: &ModelCollection) -> bool {
        fn keyed(c: &ModelCollection) -> BTreeMap<(&str, &str), &ModelRecord> {
            c.iter().map(|m| (m.key(), m.as_ref())).collect()
        }

        self.len() == other.len() && keyed(self) == keyed(other)
    }
}

impl FromIterator<Arc<ModelRecord>> for ModelCollection {
    fn from_iter<T: IntoIterator<Item = Arc<ModelRecord>>>(iter: T) -> Self {
        ModelCollection {
            models: iter.into_iter().collect(),
        }
    }
}

impl FromIterator<ModelRecord> for ModelCollection {
    fn from_iter<T: IntoIterator<Item = ModelRecord>>(iter: T) -> Self {
        iter.into_iter().map(Arc::new).collect()
    }
}

impl<'c> IntoIterator for &'c ModelCollection {
    type Item = &'c Arc<ModelRecord>;
    type IntoIter = std::slice::Iter<'c, Arc<ModelRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.models.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Modalities;

    fn record(provider: &str, id: &str, family: &str, outputs: &[&str]) -> ModelRecord {
        ModelRecord::new(id, provider)
            .unwrap()
            .with_family(family)
            .with_modalities(Modalities::new(["text"], outputs.iter().copied()))
    }

    fn sample() -> ModelCollection {
        ModelCollection::new(vec![
            record("openai", "gpt-4o", "gpt-4o", &["text"]),
            record("openai", "text-embedding-3-small", "text-embedding", &["embeddings"]),
            record("anthropic", "claude-3-5-haiku", "claude-haiku", &["text"]),
            record("openai", "gpt-image-1", "gpt-image", &["image"]),
            record("openai", "gpt-4o-audio", "gpt-4o", &["text", "audio"]),
            record("gemini", "text-embedding-004", "text-embedding", &["embeddings"]),
        ])
    }

    fn ids(c: &ModelCollection) -> Vec<&str> {
        c.iter().map(|m| m.id()).collect()
    }

    #[test]
    fn test_exact_filters() {
        let models = sample();

        assert_eq!(
            ids(&models.by_provider("openai")),
            vec!["gpt-4o", "text-embedding-3-small", "gpt-image-1", "gpt-4o-audio"]
        );
        assert_eq!(
            ids(&models.by_family("text-embedding")),
            vec!["text-embedding-3-small", "text-embedding-004"]
        );
        assert!(models.by_provider("OpenAI").is_empty());
    }

    #[test]
    fn test_type_filters_include_secondary_outputs() {
        let models = sample();

        assert_eq!(
            ids(&models.chat_models()),
            vec!["gpt-4o", "claude-3-5-haiku", "gpt-4o-audio"]
        );
        assert_eq!(
            ids(&models.embedding_models()),
            vec!["text-embedding-3-small", "text-embedding-004"]
        );
        assert_eq!(ids(&models.image_models()), vec!["gpt-image-1"]);
        // A chat model that also speaks is an audio model too
        assert_eq!(ids(&models.audio_models()), vec!["gpt-4o-audio"]);
        assert_eq!(
            ids(&models.by_type(ModelType::Embedding)),
            ids(&models.embedding_models())
        );
    }

    #[test]
    fn test_filters_commute() {
        let models = sample();

        let a = models.by_provider("openai").chat_models();
        let b = models.chat_models().by_provider("openai");
        assert_eq!(a, b);

        let a = models.by_family("text-embedding").embedding_models().by_provider("gemini");
        let b = models.by_provider("gemini").by_family("text-embedding").embedding_models();
        assert_eq!(a, b);
        assert_eq!(ids(&a), vec!["text-embedding-004"]);
    }

    #[test]
    fn test_filters_do_not_touch_source() {
        let models = sample();
        let before = models.clone();

        let _ = models.by_provider("anthropic").select(|m| m.id().starts_with("claude"));

        assert_eq!(models, before);
        assert_eq!(models.len(), 6);
    }

    #[test]
    fn test_group_by() {
        let groups = sample().group_by(|m| m.provider().to_string());

        assert_eq!(
            groups.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["anthropic", "gemini", "openai"]
        );
        assert_eq!(
            ids(&groups["openai"]),
            vec!["gpt-4o", "text-embedding-3-small", "gpt-image-1", "gpt-4o-audio"]
        );

        let by_type = sample().group_by(|m| m.model_type());
        assert_eq!(by_type[&ModelType::Embedding].len(), 2);
    }

    #[test]
    fn test_find_fails_loudly() {
        let models = sample();

        assert_eq!(models.find("gpt-4o", None).unwrap().provider(), "openai");
        assert!(matches!(
            models.find("gpt-4o", Some("anthropic")),
            Err(Error::ModelNotFound { .. })
        ));
    }

    #[test]
    fn test_same_records_ignores_order() {
        let models = sample();
        let reversed: ModelCollection = models.iter().rev().cloned().collect();

        assert_ne!(models, reversed);
        assert!(models.same_records(&reversed));
        assert!(!models.same_records(&models.by_provider("openai")));
    }
}
