use reqwest::{Client, IntoUrl};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::providers::apireq::{self, HttpError, Url};

pub(super) const OLLAMA_DEFAULT_ENDPOINT: &str = "http://localhost:11434";

#[derive(Debug, Error)]
pub(super) enum Error {
    #[error("invalid ollama api base: {0}")]
    InvalidApiBase(reqwest::Error),

    #[error("invalid ollama endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("a request to ollama failed: {0}")]
    RequestFailed(#[from] apireq::RequestError),

    #[error("the ollama API returned an error: {0}")]
    Status(#[from] HttpError),
}

// Structures to deseralize /api/tags

#[derive(Debug, Deserialize, Serialize)]
pub(super) struct Tag {
    pub name: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub modified_at: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub details: Option<Details>,
}

#[derive(Debug, Deserialize, Serialize)]
pub(super) struct Details {
    #[serde(default)]
    pub parent_model: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub families: Option<Vec<String>>, // Use Option to handle the null value
    #[serde(default)]
    pub parameter_size: Option<String>,
    #[serde(default)]
    pub quantization_level: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
struct TagsList {
    models: Vec<Tag>,
}

pub(super) struct OllamaApi {
    api_base: Url,
    client: Client,
}

impl OllamaApi {
    pub(super) fn with_api_base<U: IntoUrl>(api_base: U) -> Result<OllamaApi, Error> {
        Ok(OllamaApi {
            api_base: api_base.into_url().map_err(Error::InvalidApiBase)?,
            client: Client::new(),
        })
    }

    pub(super) async fn tags(&self) -> Result<Vec<Tag>, Error> {
        let url = self.api_base.join("/api/tags")?;

        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::RequestFailed(e.into()))?;

        let res = apireq::ensure_success(res).await?;

        let tags: TagsList = res
            .json()
            .await
            .map_err(|e| Error::RequestFailed(e.into()))?;

        Ok(tags.models)
    }
}
