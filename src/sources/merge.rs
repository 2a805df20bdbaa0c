use std::collections::HashMap;

use serde::Serialize;

use super::{SourceId, SourceResult};
use crate::models::{ModelCollection, ModelRecord};
use crate::providers::{ErrorKind, FetchError};

/// A source that failed during a refresh, with the reason it failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedSource {
    pub source: SourceId,
    #[serde(skip)]
    pub kind: ErrorKind,
    pub error: String,
}

impl FailedSource {
    pub fn new(source: SourceId, error: &FetchError) -> FailedSource {
        FailedSource {
            source,
            kind: error.kind(),
            error: error.to_string(),
        }
    }
}

/// The result of merging the outcomes of a refresh.
#[derive(Debug)]
pub struct Merged {
    pub collection: ModelCollection,
    pub succeeded: Vec<SourceId>,
    pub failed: Vec<FailedSource>,
}

impl Merged {
    /// A merge only produces a usable snapshot when some source answered, even if it
    /// answered with no models.
    pub fn is_usable(&self) -> bool {
        !self.succeeded.is_empty()
    }
}

struct Slot {
    record: ModelRecord,
    priority: u8,
    source: usize,
}

/// Merges source outcomes into a single collection keyed by `(provider, id)`.
///
/// For a key disclosed by more than one source, the record from the source with the
/// highest priority replaces the others whole; on equal priority the source that
/// comes first in `results` keeps it. Within one source a region-qualified record is
/// preferred over an unqualified duplicate. Every winner takes the position at which
/// its key was first seen. Failed sources are reported, not raised.
pub fn merge(results: Vec<SourceResult>) -> Merged {
    let mut positions: HashMap<(String, String), usize> = HashMap::new();
    let mut slots: Vec<Slot> = Vec::new();
    let mut succeeded = Vec::new();
    let mut failed = Vec::new();

    for (index, result) in results.into_iter().enumerate() {
        let records = match result.outcome {
            Ok(records) => records,
            Err(e) => {
                failed.push(FailedSource::new(result.source, &e));
                continue;
            }
        };

        for record in records {
            let key = (record.provider().to_string(), record.id().to_string());

            let Some(&position) = positions.get(&key) else {
                positions.insert(key, slots.len());
                slots.push(Slot {
                    record,
                    priority: result.priority,
                    source: index,
                });
                continue;
            };

            let slot = &mut slots[position];

            let replace = if slot.source == index {
                !slot.record.is_region_qualified() && record.is_region_qualified()
            } else {
                result.priority > slot.priority
            };

            tracing::debug!(
                provider = %key.0,
                model = %key.1,
                source = %result.source,
                replaced = replace,
                "Duplicate model record"
            );

            if replace {
                *slot = Slot {
                    record,
                    priority: result.priority,
                    source: index,
                };
            }
        }

        succeeded.push(result.source);
    }

    Merged {
        collection: slots.into_iter().map(|slot| slot.record).collect(),
        succeeded,
        failed,
    }
}
