//! The models.dev catalog as a source.
//!
//! models.dev publishes one JSON document describing the models of many providers.
//! Its entries are generic: they know a model's limits, prices and capabilities, but
//! not whether a particular account can reach it. Catalog records are therefore the
//! lowest-priority source by default and are overridden by live provider listings.

pub mod normalize;
pub mod types;

use async_trait::async_trait;
use reqwest::{Client, IntoUrl};
use thiserror::Error;

use super::{ModelSource, SourceId};
use crate::models::ModelRecord;
use crate::providers::apireq::{self, HttpError, Url};
use crate::providers::{ErrorKind, FetchError};

pub const DEFAULT_CATALOG_URL: &str = "https://models.dev/api.json";

#[derive(Debug, Error)]
enum Error {
    #[error("invalid catalog url: {0}")]
    InvalidUrl(reqwest::Error),

    #[error("a request to the catalog failed: {0}")]
    RequestFailed(#[from] apireq::RequestError),

    #[error("the catalog returned an error: {0}")]
    Status(#[from] HttpError),
}

impl From<Error> for FetchError {
    fn from(value: Error) -> Self {
        match value {
            Error::RequestFailed(err) => err.into(),
            Error::Status(err) => err.into(),
            value @ Error::InvalidUrl(_) => {
                FetchError::from_source(ErrorKind::Connection, Box::new(value))
            }
        }
    }
}

pub struct CatalogSource {
    url: Url,
    client: Client,
}

impl CatalogSource {
    pub fn with_url<U: IntoUrl>(url: U) -> Result<CatalogSource, FetchError> {
        Ok(CatalogSource {
            url: url.into_url().map_err(Error::InvalidUrl)?,
            client: Client::new(),
        })
    }

    pub fn new() -> Result<CatalogSource, FetchError> {
        Self::with_url(DEFAULT_CATALOG_URL)
    }

    async fn catalog(&self) -> Result<types::Catalog, Error> {
        let res = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| Error::RequestFailed(e.into()))?;

        let res = apireq::ensure_success(res).await?;

        res.json()
            .await
            .map_err(|e| Error::RequestFailed(e.into()))
    }
}

#[async_trait]
impl ModelSource for CatalogSource {
    fn id(&self) -> SourceId {
        SourceId::new("catalog")
    }

    async fn fetch(&self) -> Result<Vec<ModelRecord>, FetchError> {
        let catalog = self.catalog().await?;

        Ok(normalize::normalize(&catalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CATALOG: &str = r#"{
        "openai": {
            "id": "openai",
            "name": "OpenAI",
            "env": ["OPENAI_API_KEY"],
            "models": {
                "gpt-4o": {
                    "id": "gpt-4o",
                    "name": "GPT-4o",
                    "family": "gpt-4o",
                    "tool_call": true,
                    "structured_output": true,
                    "release_date": "2024-05-13",
                    "modalities": {"input": ["text", "image"], "output": ["text"]},
                    "cost": {"input": 2.5, "output": 10, "cache_read": 1.25},
                    "limit": {"context": 128000, "output": 16384}
                }
            }
        },
        "amazon-bedrock": {
            "id": "amazon-bedrock",
            "name": "Amazon Bedrock",
            "models": {
                "anthropic.claude-3-haiku-20240307-v1:0": {
                    "id": "anthropic.claude-3-haiku-20240307-v1:0",
                    "name": "Claude Haiku 3"
                }
            }
        }
    }"#;

    #[tokio::test]
    async fn test_fetch_catalog() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api.json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(CATALOG, "application/json"))
            .mount(&server)
            .await;

        let source = CatalogSource::with_url(format!("{}/api.json", server.uri())).unwrap();
        let records = source.fetch().await.unwrap();

        assert_eq!(source.id(), SourceId::new("catalog"));
        assert_eq!(records.len(), 2);

        let bedrock = &records[0];
        assert_eq!(bedrock.provider(), "bedrock");
        assert_eq!(bedrock.name(), "Claude Haiku 3");

        let gpt = &records[1];
        assert_eq!(gpt.key(), ("openai", "gpt-4o"));
        assert_eq!(gpt.context_window(), Some(128000));
        assert_eq!(gpt.pricing().output_per_million(), Some(10.0));
        assert!(gpt.supports("vision"));
    }

    #[tokio::test]
    async fn test_malformed_catalog() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("[1, 2", "application/json"))
            .mount(&server)
            .await;

        let source = CatalogSource::with_url(server.uri()).unwrap();
        let err = source.fetch().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnexpectedResponse);
    }

    #[tokio::test]
    async fn test_catalog_outage() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let source = CatalogSource::with_url(server.uri()).unwrap();
        let err = source.fetch().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
    }
}
