//! Sources of model metadata and the fan-out that queries them.
//!
//! A source is anything that can produce a list of [`ModelRecord`]s: the shared
//! models.dev catalog, or a provider's own live listing. Every source is fetched
//! independently and concurrently, each under its own timeout, and a failing source
//! only costs its own records. The outcomes are handed to [`merge`] in the order the
//! sources were configured, which is also the order used to break priority ties, so
//! the merged snapshot does not depend on which source answered first.

pub mod catalog;
pub mod merge;

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::future::join_all;

use crate::models::ModelRecord;
use crate::providers::{Error, ErrorKind, FetchError, Provider};

pub use self::merge::{merge, FailedSource, Merged};

/// Names a source, e.g. `catalog` or `openai`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(name: impl Into<String>) -> SourceId {
        SourceId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An independent origin of model metadata.
#[async_trait]
pub trait ModelSource: Send + Sync {
    fn id(&self) -> SourceId;

    /// Fetches and normalizes the source's records. Retrying is up to the source.
    async fn fetch(&self) -> Result<Vec<ModelRecord>, FetchError>;
}

/// Exposes a provider's live listing as a source.
pub struct ProviderSource {
    provider: Arc<dyn Provider>,
}

impl ProviderSource {
    pub fn new(provider: Arc<dyn Provider>) -> ProviderSource {
        ProviderSource { provider }
    }
}

#[async_trait]
impl ModelSource for ProviderSource {
    fn id(&self) -> SourceId {
        SourceId::new(self.provider.id().to_string())
    }

    async fn fetch(&self) -> Result<Vec<ModelRecord>, FetchError> {
        self.provider.models().await
    }
}

/// A source together with the priority its records carry in the merge.
#[derive(Clone)]
pub struct PrioritizedSource {
    pub source: Arc<dyn ModelSource>,
    pub priority: u8,
}

/// The outcome of fetching one source.
#[derive(Debug)]
pub struct SourceResult {
    pub source: SourceId,
    pub priority: u8,
    pub outcome: Result<Vec<ModelRecord>, FetchError>,
}

impl SourceResult {
    pub fn success(source: SourceId, priority: u8, records: Vec<ModelRecord>) -> SourceResult {
        SourceResult {
            source,
            priority,
            outcome: Ok(records),
        }
    }

    pub fn failure(source: SourceId, priority: u8, error: FetchError) -> SourceResult {
        SourceResult {
            source,
            priority,
            outcome: Err(error),
        }
    }
}

/// Fetches every source concurrently. Each source gets `timeout`, shortened to
/// whatever is left of `deadline` when one is given; a source that runs out of
/// time is recorded as failed while the others finish normally.
pub async fn fetch_all(
    sources: &[PrioritizedSource],
    timeout: Duration,
    deadline: Option<Instant>,
) -> Vec<SourceResult> {
    let budget = match deadline {
        Some(deadline) => timeout.min(deadline.saturating_duration_since(Instant::now())),
        None => timeout,
    };

    let fetches = sources.iter().map(|entry| async move {
        let id = entry.source.id();
        let start = Instant::now();

        let outcome = match tokio::time::timeout(budget, entry.source.fetch()).await {
            Ok(outcome) => outcome,
            Err(elapsed) => Err(Error::from_source(ErrorKind::TimedOut, Box::new(elapsed))),
        };

        match &outcome {
            Ok(records) => tracing::debug!(
                source = %id,
                model_count = records.len(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Fetched source"
            ),
            Err(e) => tracing::warn!(
                source = %id,
                error = %e,
                duration_ms = start.elapsed().as_millis() as u64,
                "Source fetch failed"
            ),
        }

        SourceResult {
            source: id,
            priority: entry.priority,
            outcome,
        }
    });

    // join_all yields results in input order, not completion order
    join_all(fetches).await
}
