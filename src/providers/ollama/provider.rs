use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::IntoUrl;

use super::api;
use crate::models::{Capability, Modalities, ModelRecord};
use crate::providers::{providers::ProviderIdentifier, Error, ErrorKind, Provider};

impl From<api::Error> for Error {
    fn from(value: api::Error) -> Self {
        match value {
            api::Error::RequestFailed(err) => err.into(),
            api::Error::Status(err) => err.into(),
            value @ (api::Error::InvalidApiBase(_) | api::Error::InvalidEndpoint(_)) => {
                Error::from_source(ErrorKind::Connection, Box::new(value))
            }
        }
    }
}

fn tag_to_record(tag: api::Tag) -> Result<ModelRecord, Error> {
    let mut record = ModelRecord::new(&tag.name, ProviderIdentifier::Ollama.to_string())
        .map_err(|e| Error::from_source(ErrorKind::UnexpectedResponse, Box::new(e)))?
        .with_modalities(Modalities::new(["text"], ["text"]))
        .with_capabilities([Capability::Streaming])
        .with_metadata("source", "ollama")
        .with_metadata("provider_id", "ollama");

    if let Some(created_at) = tag
        .modified_at
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    {
        record = record.with_created_at(created_at.with_timezone(&Utc));
    }

    if let Some(digest) = tag.digest {
        record = record.with_metadata("digest", digest);
    }

    if let Some(size) = tag.size {
        record = record.with_metadata("size", size);
    }

    if let Some(details) = tag.details {
        if let Some(family) = details.family.filter(|f| !f.is_empty()) {
            record = record.with_family(family);
        }

        if let Some(parameter_size) = details.parameter_size {
            record = record.with_metadata("parameter_size", parameter_size);
        }

        if let Some(quantization_level) = details.quantization_level {
            record = record.with_metadata("quantization_level", quantization_level);
        }

        if let Some(format) = details.format {
            record = record.with_metadata("format", format);
        }
    }

    Ok(record)
}

pub struct OllamaProvider {
    api: api::OllamaApi,
}

impl OllamaProvider {
    pub fn with_api_base<U: IntoUrl>(api_base: U) -> Result<OllamaProvider, Error> {
        Ok(OllamaProvider {
            api: api::OllamaApi::with_api_base(api_base)?,
        })
    }

    pub fn new() -> Result<OllamaProvider, Error> {
        Self::with_api_base(api::OLLAMA_DEFAULT_ENDPOINT)
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn id(&self) -> ProviderIdentifier {
        ProviderIdentifier::Ollama
    }

    async fn models(&self) -> Result<Vec<ModelRecord>, Error> {
        let tags = self.api.tags().await?;

        tags.into_iter().map(tag_to_record).collect()
    }
}
