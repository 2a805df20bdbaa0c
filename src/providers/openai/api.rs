use reqwest::{Client, IntoUrl};
use serde::Deserialize;

use crate::providers::apireq::{self, HttpError, Url};
use crate::providers::ErrorKind;

#[derive(thiserror::Error, Debug)]
pub(super) enum Error {
    /// The API Base is not a URL that can be used in a network request
    #[error("invalid api base")]
    InvalidApiBase(#[source] reqwest::Error),

    /// Endpoint URL is invalid
    #[error("invalid endpoint")]
    InvalidEndpoint(
        #[from]
        #[source]
        url::ParseError,
    ),

    /// Some issue with the request
    #[error("{}", .0)]
    RequestFailed(
        #[from]
        #[source]
        apireq::RequestError,
    ),

    /// Your request was malformed or missing some required parameters.
    #[error("{}", .0)]
    BadRequest(HttpError),

    /// An "Authentication" Error is an umbrella error with three possiblities:
    /// (1) Invalid Authentication
    /// (2) The requesting API key is not correct.
    /// (3) Your account is not part of an organization.
    #[error("{}", .0)]
    Authentication(HttpError),

    /// You don't have access to the requested resource.
    #[error("{}", .0)]
    PermissionDenied(HttpError),

    /// Requested resource does not exist.
    #[error("{}", .0)]
    NotFound(HttpError),

    /// You have hit your assigned rate limit.
    #[error("{}", .0)]
    RateLimit(HttpError),

    /// OpenAI has an internal issue
    #[error("{}", .0)]
    InternalError(HttpError),

    /// The engine is currently overloaded, please try again later
    #[error("{}", .0)]
    ApiOverloaded(HttpError),

    /// Any other status, classified by the shared classifier
    #[error("{}", .0)]
    Other(HttpError),
}

impl From<HttpError> for Error {
    fn from(err: HttpError) -> Error {
        match err.kind() {
            ErrorKind::BadRequest => Error::BadRequest(err),
            ErrorKind::Unauthorized => Error::Authentication(err),
            ErrorKind::Forbidden => Error::PermissionDenied(err),
            ErrorKind::NotFound => Error::NotFound(err),
            ErrorKind::RateLimited => Error::RateLimit(err),
            ErrorKind::ServerError => Error::InternalError(err),
            ErrorKind::ServiceUnavailable | ErrorKind::Overloaded => Error::ApiOverloaded(err),
            _ => Error::Other(err),
        }
    }
}

/* Structures to deseralize /v1/models */

#[derive(Deserialize, Debug)]
pub(super) struct ModelObject {
    pub id: String,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub owned_by: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ModelList {
    data: Vec<ModelObject>,
}

pub(super) const DEFAULT_API_BASE: &str = "https://api.openai.com";

pub(super) struct OpenAIApi {
    api_base: Url,
    api_key: String,
    client: Client,
}

impl OpenAIApi {
    pub(super) fn new<U: IntoUrl>(api_key: &str, api_base: U) -> Result<OpenAIApi, Error> {
        let api_base = api_base.into_url().map_err(Error::InvalidApiBase)?;

        Ok(OpenAIApi {
            api_base,
            api_key: api_key.to_string(),
            client: Client::new(),
        })
    }

    pub(super) async fn models(&self) -> Result<Vec<ModelObject>, Error> {
        let url = self.api_base.join("/v1/models")?;

        let res = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| Error::RequestFailed(e.into()))?;

        let res = apireq::ensure_success(res).await?;

        let list: ModelList = res
            .json()
            .await
            .map_err(|e| Error::RequestFailed(e.into()))?;

        Ok(list.data)
    }
}
