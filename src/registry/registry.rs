use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use strum::IntoEnumIterator;

use super::default_priority::default_priority;
use super::resolver::{ModelSpec, ResolveOptions, Resolver};
use super::{snapshot, Aliases, Error};
use crate::models::{ModelCollection, ModelRecord};
use crate::providers::{providers::ProviderIdentifier, Provider};
use crate::sources::{self, FailedSource, ModelSource, PrioritizedSource, ProviderSource, SourceId};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

struct ProviderEntry {
    provider: Option<Arc<dyn Provider>>,
    priority: u8,
}

/// What a refresh did.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    /// Models in the installed snapshot; zero when nothing was installed
    pub models: usize,
    pub succeeded: Vec<SourceId>,
    pub failed: Vec<FailedSource>,
    pub elapsed_ms: u64,
}

impl RefreshReport {
    fn into_result(self) -> Result<RefreshReport, Error> {
        if self.succeeded.is_empty() {
            Err(Error::AllSourcesFailed(self.failed))
        } else {
            Ok(self)
        }
    }
}

/// A resolved model together with the provider that serves it.
#[derive(Clone)]
pub struct Resolved {
    pub model: Arc<ModelRecord>,
    pub provider: Arc<dyn Provider>,
}

/// Holds the current snapshot and the sources it is refreshed from.
///
/// A registry starts out uninitialized. The first query loads the configured
/// snapshot file if it exists and refreshes from the sources otherwise. Refreshes
/// are serialized; a caller that finds a refresh in flight waits for it and shares
/// its outcome instead of starting another one.
pub struct Registry {
    providers: BTreeMap<ProviderIdentifier, ProviderEntry>,
    sources: Vec<PrioritizedSource>,
    resolver: Resolver,
    snapshot_path: Option<PathBuf>,
    fetch_timeout: Duration,
    refresh_timeout: Option<Duration>,
    offline: bool,
    current: RwLock<Option<Arc<ModelCollection>>>,
    refresh_lock: tokio::sync::Mutex<()>,
    generation: AtomicU64,
    last_report: Mutex<Option<RefreshReport>>,
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

impl Registry {
    pub fn new() -> Registry {
        let providers = ProviderIdentifier::iter().map(|id| {
            (
                id,
                ProviderEntry {
                    provider: None,
                    priority: default_priority(id),
                },
            )
        });

        Registry {
            providers: BTreeMap::from_iter(providers),
            sources: Vec::new(),
            resolver: Resolver::builtin(),
            snapshot_path: None,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            refresh_timeout: None,
            offline: false,
            current: RwLock::new(None),
            refresh_lock: tokio::sync::Mutex::new(()),
            generation: AtomicU64::new(0),
            last_report: Mutex::new(None),
        }
    }

    pub fn with_aliases(mut self, aliases: Aliases) -> Registry {
        self.resolver = Resolver::new(aliases);
        self
    }

    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Registry {
        self.snapshot_path = Some(path.into());
        self
    }

    /// Bounds every single source fetch.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Registry {
        self.fetch_timeout = timeout;
        self
    }

    /// Bounds a whole refresh. Sources still running at the deadline count as failed.
    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Registry {
        self.refresh_timeout = Some(timeout);
        self
    }

    /// Never refresh; only a saved snapshot can initialize the registry.
    pub fn with_offline(mut self, offline: bool) -> Registry {
        self.offline = offline;
        self
    }

    /// Adds a provider. Its live listing becomes a source of the registry.
    pub fn add_provider(&mut self, provider: Arc<dyn Provider>, priority: Option<u8>) {
        let id = provider.id();

        let entry = self
            .providers
            .entry(id)
            .or_insert_with(|| ProviderEntry {
                provider: None,
                priority: default_priority(id),
            });

        if entry.provider.is_some() {
            panic!("The same provider was added to the registry twice.");
        }

        if let Some(priority) = priority {
            entry.priority = priority;
        }

        entry.provider.replace(provider.clone());

        self.sources.push(PrioritizedSource {
            source: Arc::new(ProviderSource::new(provider)),
            priority: entry.priority,
        });
    }

    /// Adds a source that has no provider handle of its own, such as the catalog.
    pub fn add_source(&mut self, source: Arc<dyn ModelSource>, priority: u8) {
        self.sources.push(PrioritizedSource { source, priority });
    }

    pub fn sources(&self) -> &[PrioritizedSource] {
        &self.sources
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    pub fn provider(&self, id: ProviderIdentifier) -> Option<&Arc<dyn Provider>> {
        self.providers.get(&id).and_then(|e| e.provider.as_ref())
    }

    pub fn active_provider(&self, id: ProviderIdentifier) -> Result<&Arc<dyn Provider>, Error> {
        match self.provider(id) {
            Some(provider) => Ok(provider),
            None => Err(Error::ProviderNotActivated(id.to_string())),
        }
    }

    pub fn priority(&self, id: ProviderIdentifier) -> u8 {
        self.providers
            .get(&id)
            .map_or_else(|| default_priority(id), |e| e.priority)
    }

    /// The current snapshot, if the registry is initialized.
    pub fn current(&self) -> Option<Arc<ModelCollection>> {
        self.current.read().clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.current.read().is_some()
    }

    fn install(&self, models: ModelCollection) -> Arc<ModelCollection> {
        let models = Arc::new(models);
        *self.current.write() = Some(models.clone());
        models
    }

    /// Returns the registry to its uninitialized state.
    pub fn reset(&self) {
        *self.current.write() = None;
    }

    /// The current snapshot, initializing the registry on first use.
    pub async fn collection(&self) -> Result<Arc<ModelCollection>, Error> {
        if let Some(models) = self.current() {
            return Ok(models);
        }

        if let Some(path) = self.snapshot_path.as_deref().filter(|p| p.exists()) {
            return self.load(path);
        }

        if self.offline {
            return Err(Error::SnapshotUnavailable);
        }

        self.refresh().await?;

        Ok(self.current().unwrap_or_default())
    }

    /// Fetches every source and installs the merged result, if any source answered.
    ///
    /// When every source fails the previous snapshot stays in place and
    /// [`Error::AllSourcesFailed`] is returned.
    pub async fn refresh(&self) -> Result<RefreshReport, Error> {
        if self.offline {
            return Err(Error::Offline);
        }

        if self.sources.is_empty() {
            return Err(Error::NoSources);
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let _guard = self.refresh_lock.lock().await;

        if self.generation.load(Ordering::SeqCst) != generation {
            if let Some(report) = self.last_report.lock().clone() {
                tracing::debug!("Joined a refresh that was already in progress");
                return report.into_result();
            }
        }

        let report = self.run_refresh().await;

        *self.last_report.lock() = Some(report.clone());
        self.generation.fetch_add(1, Ordering::SeqCst);

        report.into_result()
    }

    async fn run_refresh(&self) -> RefreshReport {
        let start = Instant::now();
        let deadline = self.refresh_timeout.map(|timeout| start + timeout);

        let results = sources::fetch_all(&self.sources, self.fetch_timeout, deadline).await;
        let merged = sources::merge(results);

        let models = if merged.is_usable() {
            self.install(merged.collection).len()
        } else {
            0
        };

        let report = RefreshReport {
            models,
            succeeded: merged.succeeded,
            failed: merged.failed,
            elapsed_ms: start.elapsed().as_millis() as u64,
        };

        if report.succeeded.is_empty() {
            tracing::error!(
                failed = report.failed.len(),
                "Every source failed, keeping the previous snapshot"
            );
        } else {
            tracing::info!(
                model_count = report.models,
                succeeded = ?report.succeeded,
                failed = report.failed.len(),
                duration_ms = report.elapsed_ms,
                "Refreshed model registry"
            );
        }

        report
    }

    /// Saves the current snapshot to the configured snapshot path.
    pub async fn save(&self) -> Result<PathBuf, Error> {
        let path = self.snapshot_path.clone().ok_or(Error::SnapshotUnavailable)?;
        self.save_to(&path).await?;
        Ok(path)
    }

    pub async fn save_to(&self, path: &Path) -> Result<(), Error> {
        let models = self.collection().await?;
        snapshot::save(&models, path)
    }

    /// Replaces the current snapshot with the one stored at `path`.
    pub fn load(&self, path: &Path) -> Result<Arc<ModelCollection>, Error> {
        let models = snapshot::load(path)?;
        Ok(self.install(models))
    }

    /// Finds the record for a model spec.
    pub async fn find(&self, spec: &ModelSpec, options: ResolveOptions) -> Result<Arc<ModelRecord>, Error> {
        let models = self.collection().await?;
        self.resolver.resolve_spec(&models, spec, options)
    }

    /// Resolves a model spec to a record and the provider that serves it. The two are
    /// always chosen together from the record's `provider` field.
    pub async fn resolve(&self, spec: &ModelSpec, options: ResolveOptions) -> Result<Resolved, Error> {
        let model = self.find(spec, options).await?;

        let id = ProviderIdentifier::from_str(model.provider())
            .map_err(|_| Error::ProviderNotFound(model.provider().to_string()))?;

        let provider = self.active_provider(id)?.clone();

        Ok(Resolved { model, provider })
    }
}
