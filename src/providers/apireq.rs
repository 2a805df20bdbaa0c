//! Helpers shared by the HTTP clients of providers and the catalog.

mod error;
mod provider;
mod status;

pub(crate) use error::RequestError;
pub(crate) use reqwest::Url;
pub(crate) use status::{ensure_success, HttpError};
