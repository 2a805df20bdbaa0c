//! The registry holds the current snapshot of model metadata and resolves models.
//!
//! A snapshot is produced by a refresh: every configured source (the models.dev
//! catalog and the live listing of each active provider) is fetched concurrently and
//! the outcomes are merged into one [`ModelCollection`](crate::models::ModelCollection).
//! The snapshot is replaced as a whole, so readers see either the old or the new
//! collection. It can be saved to disk and loaded back instead of refreshing.
//!
//! When the user chooses a model, it is specified using a "model spec". It consists
//! of two parts, an optional provider identifier and the model identifier. In BNF:
//! ```text
//! <model spec> := <model identifier> | <provider identifier> "/" <model identifier>
//! ```
//!
//! For example, llama3 can be requested through the ollama provider using the spec
//! "ollama/llama3" since llama3 could be served by multiple providers. The prefix is
//! only treated as a provider when it names a known provider, so catalog ids such as
//! "anthropic/claude-3.5-haiku" are taken as plain model identifiers.
//!
//! Each source is assigned a "priority", which is an eight bit unsigned number (e.g., a value
//! between 0 and 255), where 0 is the lowest priority (meaning it is a source of last resort)
//! and 255 is the highest priority. When several sources describe the same model of the same
//! provider, the record of the highest priority source is kept. On equal priority the source
//! that was registered first wins.

pub mod aliases;
mod default_priority;
pub mod populate;
#[allow(clippy::module_inception)]
pub mod registry;
pub mod resolver;
pub mod snapshot;

use std::path::PathBuf;

use thiserror::Error;

use crate::models::RecordError;
use crate::providers::{self, providers::ProviderIdentifier};
use crate::sources::FailedSource;

pub use self::aliases::Aliases;
pub use self::default_priority::{default_priority, CATALOG_PRIORITY};
pub use self::registry::{RefreshReport, Registry, Resolved};
pub use self::resolver::{ModelSpec, ResolveOptions, Resolver};

fn describe_failures(failed: &[FailedSource]) -> String {
    failed
        .iter()
        .map(|f| format!("{} ({})", f.source, f.error))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Error, Debug)]
pub enum Error {
    /// No record matches the requested id, not even through an alias
    #[error("model \"{id}\" was not found (provider: {})", .provider.as_deref().unwrap_or("none"))]
    ModelNotFound { id: String, provider: Option<String> },
    /// The model spec or a record names an unknown provider.
    #[error("provider \"{0}\" does not exist")]
    ProviderNotFound(String),
    /// The provider is known but not in the registry
    #[error("provider \"{0}\" is not activated")]
    ProviderNotActivated(String),
    #[error("the \"{provider}\" provider is enabled but no API key is set, either add it to the config or define {env}")]
    MissingApiKey {
        provider: ProviderIdentifier,
        env: &'static str,
    },
    #[error("failed to set up provider \"{0}\": {1}")]
    ProviderSetup(ProviderIdentifier, #[source] providers::Error),
    #[error("failed to set up the model catalog: {0}")]
    CatalogSetup(#[source] providers::Error),
    /// Every source failed; the previous snapshot was kept
    #[error("every source failed: {}", describe_failures(.0))]
    AllSourcesFailed(Vec<FailedSource>),
    #[error("no model sources are configured")]
    NoSources,
    #[error("refreshing is disabled in offline mode")]
    Offline,
    #[error("no snapshot is available, refresh first or configure a snapshot path")]
    SnapshotUnavailable,
    #[error("the snapshot is malformed: {0}")]
    MalformedSnapshot(#[source] serde_json::Error),
    #[error("record {index} of the snapshot is invalid: {source}")]
    InvalidSnapshotRecord {
        index: usize,
        #[source]
        source: RecordError,
    },
    #[error("failed to access \"{}\": {source}", .path.display())]
    SnapshotIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read the alias table \"{}\": {source}", .path.display())]
    AliasesIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("the alias table is malformed: {0}")]
    MalformedAliases(#[source] serde_json::Error),
    #[error("model identifier must not be empty")]
    EmptyModelId,
    #[error(transparent)]
    InvalidRecord(#[from] RecordError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Error {
        Error::SnapshotIo {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ErrorKind;
    use crate::sources::SourceId;

    #[test]
    fn test_not_found_names_provider() {
        let err = Error::ModelNotFound {
            id: "gpt-9".to_string(),
            provider: None,
        };
        assert_eq!(err.to_string(), "model \"gpt-9\" was not found (provider: none)");

        let err = Error::ModelNotFound {
            id: "gpt-9".to_string(),
            provider: Some("openai".to_string()),
        };
        assert_eq!(err.to_string(), "model \"gpt-9\" was not found (provider: openai)");
    }

    #[test]
    fn test_all_sources_failed_lists_sources() {
        let err = Error::AllSourcesFailed(vec![
            FailedSource {
                source: SourceId::new("catalog"),
                kind: ErrorKind::TimedOut,
                error: "request timed out".to_string(),
            },
            FailedSource {
                source: SourceId::new("ollama"),
                kind: ErrorKind::Connection,
                error: "failed to connect to the API service".to_string(),
            },
        ]);

        assert_eq!(
            err.to_string(),
            "every source failed: catalog (request timed out), ollama (failed to connect to the API service)"
        );
    }
}
