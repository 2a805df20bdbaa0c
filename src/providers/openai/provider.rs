use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::IntoUrl;

use crate::models::ModelRecord;
use crate::providers::openai::api;
use crate::providers::openai::models::{infer_from_id, known_model};
use crate::providers::{providers::ProviderIdentifier, Error, ErrorKind, Provider};

impl From<api::Error> for Error {
    fn from(value: api::Error) -> Self {
        let kind = match &value {
            api::Error::RequestFailed(_) => None,
            api::Error::InvalidApiBase(_) | api::Error::InvalidEndpoint(_) => {
                Some(ErrorKind::Connection)
            }
            api::Error::BadRequest(err)
            | api::Error::Authentication(err)
            | api::Error::PermissionDenied(err)
            | api::Error::NotFound(err)
            | api::Error::RateLimit(err)
            | api::Error::InternalError(err)
            | api::Error::ApiOverloaded(err)
            | api::Error::Other(err) => Some(err.kind()),
        };

        match (value, kind) {
            (api::Error::RequestFailed(err), _) => err.into(),
            (value, Some(kind)) => Error::from_source(kind, Box::new(value)),
            (value, None) => Error::from_source(ErrorKind::Unknown, Box::new(value)),
        }
    }
}

fn to_record(model: api::ModelObject) -> Result<ModelRecord, Error> {
    let (modalities, capabilities) = infer_from_id(&model.id);

    let mut record = ModelRecord::new(&model.id, ProviderIdentifier::OpenAI.to_string())
        .map_err(|e| Error::from_source(ErrorKind::UnexpectedResponse, Box::new(e)))?
        .with_modalities(modalities)
        .with_capabilities(capabilities)
        .with_metadata("source", "openai")
        .with_metadata("provider_id", "openai");

    if let Some(created) = model.created.and_then(|ts| Utc.timestamp_opt(ts, 0).single()) {
        record = record.with_created_at(created);
    }

    if let Some(owned_by) = model.owned_by {
        record = record.with_metadata("owned_by", owned_by);
    }

    if let Some(known) = known_model(&model.id) {
        record = record
            .with_context_window(known.context_window)
            .with_max_output_tokens(known.max_output_tokens);
    }

    Ok(record)
}

pub struct OpenAIProvider {
    api: api::OpenAIApi,
}

impl OpenAIProvider {
    pub fn new<U: IntoUrl>(api_key: &str, api_base: U) -> Result<OpenAIProvider, Error> {
        Ok(OpenAIProvider {
            api: api::OpenAIApi::new(api_key, api_base)?,
        })
    }

    pub fn with_api_key(api_key: &str) -> Result<OpenAIProvider, Error> {
        Self::new(api_key, api::DEFAULT_API_BASE)
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn id(&self) -> ProviderIdentifier {
        ProviderIdentifier::OpenAI
    }

    async fn models(&self) -> Result<Vec<ModelRecord>, Error> {
        let models = self.api.models().await?;

        models.into_iter().map(to_record).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Capability, ModelType};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn server_with(status: u16, body: &str) -> MockServer {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(status).set_body_raw(body, "application/json"))
            .mount(&server)
            .await;

        server
    }

    #[tokio::test]
    async fn test_models_are_normalized() {
        let server = server_with(
            200,
            r#"{"data":[
                {"id":"gpt-4o","created":1715367049,"owned_by":"system"},
                {"id":"text-embedding-3-small","created":1705948997,"owned_by":"system"}
            ]}"#,
        )
        .await;

        let provider = OpenAIProvider::new("sk-test", server.uri()).unwrap();
        let models = provider.models().await.unwrap();

        let gpt = &models[0];
        assert_eq!(gpt.key(), ("openai", "gpt-4o"));
        assert_eq!(gpt.context_window(), Some(128000));
        assert_eq!(gpt.model_type(), ModelType::Chat);
        assert!(gpt.supports(Capability::Vision));
        assert_eq!(gpt.created_at().unwrap().timestamp(), 1715367049);
        assert_eq!(gpt.metadata()["owned_by"], "system");

        let embedding = &models[1];
        assert_eq!(embedding.model_type(), ModelType::Embedding);
        assert_eq!(embedding.context_window(), None);
    }

    #[tokio::test]
    async fn test_errors_pass_through_classified() {
        let server = server_with(429, r#"{"error":{"message":"Rate limit reached for requests"}}"#).await;

        let provider = OpenAIProvider::new("sk-test", server.uri()).unwrap();
        let err = provider.models().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert!(err.to_string().contains("Rate limit reached for requests"));
    }
}
