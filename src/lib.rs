//! A catalog of AI model metadata.
//!
//! Model records are gathered from the models.dev catalog and from the live
//! listings of the configured providers, merged into a single snapshot, and queried
//! through [`ModelCollection`]. A [`Registry`] owns the snapshot, refreshes it, saves
//! it to disk and resolves model specs to a record and the provider serving it.

pub mod config;
pub mod models;
pub mod providers;
pub mod registry;
pub mod sources;

pub use models::{Capability, ModelCollection, ModelRecord, ModelType};
pub use registry::{Error, ModelSpec, RefreshReport, Registry, ResolveOptions, Resolved};
