//! Persistence of a collection as a JSON array of records.
//!
//! Every field of a record is written. Fields added by later versions are ignored
//! when reading, and fields missing from older snapshots take their defaults. A
//! document that does not parse, or holds a record without an id or provider, is
//! rejected as a whole.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::models::{ModelCollection, ModelRecord};

use super::Error;

pub fn to_string(models: &ModelCollection) -> Result<String, Error> {
    let records: Vec<&ModelRecord> = models.iter().map(|m| m.as_ref()).collect();

    serde_json::to_string_pretty(&records).map_err(Error::MalformedSnapshot)
}

pub fn from_str(json: &str) -> Result<ModelCollection, Error> {
    let records: Vec<ModelRecord> = serde_json::from_str(json).map_err(Error::MalformedSnapshot)?;

    for (index, record) in records.iter().enumerate() {
        record
            .validate()
            .map_err(|source| Error::InvalidSnapshotRecord { index, source })?;
    }

    Ok(ModelCollection::new(records))
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes the snapshot next to `path` and then moves it into place, so an
/// interrupted save leaves the previous snapshot intact.
pub fn save(models: &ModelCollection, path: &Path) -> Result<(), Error> {
    let json = to_string(models)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let staging = staging_path(path);

    let mut file = fs::File::create(&staging).map_err(|e| Error::io(&staging, e))?;
    file.write_all(json.as_bytes())
        .and_then(|_| file.sync_all())
        .map_err(|e| Error::io(&staging, e))?;

    fs::rename(&staging, path).map_err(|e| Error::io(path, e))?;

    tracing::debug!(path = %path.display(), model_count = models.len(), "Saved snapshot");

    Ok(())
}

pub fn load(path: &Path) -> Result<ModelCollection, Error> {
    let json = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let models = from_str(&json)?;

    tracing::debug!(path = %path.display(), model_count = models.len(), "Loaded snapshot");

    Ok(models)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Capability, Modalities, PriceRates, Pricing, INFERENCE_PROFILE_KEY, STANDARD_TIER,
        TEXT_TOKENS,
    };
    use chrono::{NaiveDate, TimeZone, Utc};
    use tempfile::tempdir;

    fn sample() -> ModelCollection {
        let gpt = ModelRecord::new("gpt-4o", "openai")
            .unwrap()
            .with_name("GPT-4o")
            .with_family("gpt-4o")
            .with_created_at(Utc.with_ymd_and_hms(2024, 5, 13, 0, 0, 0).unwrap())
            .with_knowledge_cutoff(NaiveDate::from_ymd_opt(2023, 10, 1).unwrap())
            .with_context_window(128_000)
            .with_max_output_tokens(16_384)
            .with_modalities(Modalities::new(["text", "image"], ["text"]))
            .with_capabilities([Capability::FunctionCalling, Capability::Vision])
            .with_pricing(Pricing::new().with_rates(
                TEXT_TOKENS,
                STANDARD_TIER,
                PriceRates {
                    input_per_million: Some(2.5),
                    output_per_million: Some(10.0),
                    cached_input_per_million: Some(1.25),
                    reasoning_output_per_million: None,
                },
            ))
            .with_metadata("source", "models.dev")
            .with_metadata("cost", serde_json::json!({"input": 2.5, "output": 10}));

        let haiku = ModelRecord::new("anthropic.claude-3-haiku", "bedrock")
            .unwrap()
            .with_metadata(INFERENCE_PROFILE_KEY, "us.anthropic.claude-3-haiku");

        let embedding = ModelRecord::new("text-embedding-3-small", "openai")
            .unwrap()
            .with_modalities(Modalities::new(["text"], ["embeddings"]));

        ModelCollection::new(vec![gpt, haiku, embedding])
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("models.json");

        let models = sample();
        save(&models, &path).unwrap();
        let loaded = load(&path).unwrap();

        // Same records, same order, same values
        assert_eq!(loaded, models);
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn test_save_replaces_existing_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("models.json");

        save(&sample(), &path).unwrap();
        save(&sample().by_provider("bedrock"), &path).unwrap();

        assert_eq!(load(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_snapshot() {
        assert!(matches!(from_str("{\"id\": "), Err(Error::MalformedSnapshot(_))));
        assert!(matches!(from_str("{}"), Err(Error::MalformedSnapshot(_))));
        // A record missing its identity cannot be reconstructed
        assert!(matches!(
            from_str(r#"[{"name": "nameless"}]"#),
            Err(Error::MalformedSnapshot(_))
        ));
    }

    #[test]
    fn test_invalid_record_rejects_whole_snapshot() {
        let json = r#"[
            {"id": "gpt-4o", "name": "GPT-4o", "provider": "openai"},
            {"id": "", "name": "", "provider": "openai"}
        ]"#;

        assert!(matches!(
            from_str(json),
            Err(Error::InvalidSnapshotRecord { index: 1, .. })
        ));
    }

    #[test]
    fn test_unknown_and_missing_fields() {
        let json = r#"[
            {
                "id": "llama3",
                "name": "llama3",
                "provider": "ollama",
                "added_in_a_later_version": [1, 2, 3]
            }
        ]"#;

        let models = from_str(json).unwrap();
        let model = &models.all()[0];

        assert_eq!(model.key(), ("ollama", "llama3"));
        assert!(model.capabilities().is_empty());
        assert!(model.modalities().output.is_empty());
        assert!(model.pricing().is_empty());
    }

    #[test]
    fn test_empty_collection() {
        let models = from_str(&to_string(&ModelCollection::empty()).unwrap()).unwrap();
        assert!(models.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();

        assert!(matches!(
            load(&dir.path().join("absent.json")),
            Err(Error::SnapshotIo { .. })
        ));
    }
}
