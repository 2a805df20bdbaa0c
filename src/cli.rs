//! Subcommands of the `modelcat` binary.

pub(crate) mod list;
pub(crate) mod refresh;
pub(crate) mod resolve;
