//! Providers and their live model listings.
//!
//! A provider is a service that actually serves models (e.g. OpenAI or Ollama). The
//! interface to every provider is the [`Provider`] trait, which names the provider and
//! lists the models it currently serves, already normalized into [`ModelRecord`]s.
//! The registry pairs every resolved model with the provider that serves it, so a
//! model listed by one provider is never dispatched through another.
//!
//! ## Error Handling
//!
//! Each API has its own bespoke error systems with varying levels of rigor. The
//! Ollama API documentation barely describes its errors, while the OpenAI API is very
//! explicit. Providers keep their own error types and wrap them in [`Error`], whose
//! [`ErrorKind`] gives the category. HTTP failures are categorized by
//! [`ErrorKind::classify`], which looks at the status code and the message body.

pub(crate) mod apireq;
mod ollama;
mod openai;

pub mod providers;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use std::error::Error as StdError;
use std::fmt;

pub use self::providers::{OllamaProvider, OpenAIProvider, ProviderIdentifier};
use crate::models::ModelRecord;

/// This is a list specifying general categories of errors that
/// can be returned by a [`Provider`]. This list may be updated
/// as providers are added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Failed to connect to the underlying API service.
    /// This could be due to network issues like DNS
    /// resolution, connectivity issues, or routing problems.
    Connection,
    /// A request timed out.
    TimedOut,
    /// The request was malformed or is otherwise improper (400).
    BadRequest,
    /// An API key was not provided or was rejected (401).
    Unauthorized,
    /// The account has no credit left (402).
    PaymentRequired,
    /// The API key lacks access to the resource (403).
    Forbidden,
    /// The requested resource was not found (404).
    NotFound,
    /// The number of tokens in the request exceeds the maximum limit
    /// imposed on the model.
    ContextLengthExceeded,
    /// A rate limit was reached or a quota was exceeded (429).
    RateLimited,
    /// The server encountered an error (500).
    ServerError,
    /// The service is temporarily down (502, 503).
    ServiceUnavailable,
    /// The servers are overloaded (529). This is non-fatal
    /// and indicates that a retry may be needed later.
    Overloaded,
    /// An API response was unable to be deserialized, malformed,
    /// or otherwise violated the assumptions of the client.
    UnexpectedResponse,
    /// An error that does not fit into any of the other categories.
    Unknown,
}

lazy_static! {
    static ref CONTEXT_LENGTH_PATTERN: Regex = Regex::new(
        r"(?i)context.{0,20}length|context.{0,20}window|maximum.{0,20}context|too many tokens|prompt is too long"
    )
    .unwrap();
}

impl ErrorKind {
    /// Categorizes an HTTP failure. Providers report an exceeded context window with
    /// a 400 or sometimes a 429, so the message is inspected before the status.
    pub fn classify(status: u16, message: &str) -> ErrorKind {
        if (400..500).contains(&status) && CONTEXT_LENGTH_PATTERN.is_match(message) {
            return ErrorKind::ContextLengthExceeded;
        }

        match status {
            400 | 409 | 422 => ErrorKind::BadRequest,
            401 => ErrorKind::Unauthorized,
            402 => ErrorKind::PaymentRequired,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            429 => ErrorKind::RateLimited,
            500 => ErrorKind::ServerError,
            502 | 503 => ErrorKind::ServiceUnavailable,
            529 => ErrorKind::Overloaded,
            _ => ErrorKind::Unknown,
        }
    }
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

/// A failed fetch of a source's listing. Recorded by the merge, never raised on its own.
pub type FetchError = Error;

impl Error {
    pub fn from_kind(kind: ErrorKind) -> Error {
        Error { kind, source: None }
    }

    pub fn from_source(kind: ErrorKind, source: Box<dyn StdError + Send + Sync>) -> Error {
        Error {
            kind,
            source: Some(source),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    fn message(&self) -> &'static str {
        match self.kind {
            ErrorKind::Connection => "failed to connect to the API service",
            ErrorKind::TimedOut => "request timed out",
            ErrorKind::BadRequest => "the request was bad or malformed",
            ErrorKind::Unauthorized => "authentication failed or not provided",
            ErrorKind::PaymentRequired => "payment required, check the account balance",
            ErrorKind::Forbidden => "access to the resource is forbidden",
            ErrorKind::NotFound => "the requested resource was not found",
            ErrorKind::ContextLengthExceeded => "the model context was exceeded",
            ErrorKind::RateLimited => "rate limit exceeded or quota crossed",
            ErrorKind::ServerError => "the server encountered an internal error",
            ErrorKind::ServiceUnavailable => "the service is temporarily unavailable",
            ErrorKind::Overloaded => "API server(s) are currently overloaded",
            ErrorKind::UnexpectedResponse => "API response was unexpected or malformed",
            ErrorKind::Unknown => "an unspecified error occurred",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {}", self.message(), source),
            None => write!(f, "{}", self.message()),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|e| &**e as _)
    }
}

/// A trait implemented by all providers.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Returns the provider identifier.
    fn id(&self) -> ProviderIdentifier;

    /// Returns the models the provider currently serves.
    async fn models(&self) -> Result<Vec<ModelRecord>, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_status() {
        assert_eq!(ErrorKind::classify(400, "bad"), ErrorKind::BadRequest);
        assert_eq!(ErrorKind::classify(401, "no key"), ErrorKind::Unauthorized);
        assert_eq!(ErrorKind::classify(402, "no money"), ErrorKind::PaymentRequired);
        assert_eq!(ErrorKind::classify(403, "nope"), ErrorKind::Forbidden);
        assert_eq!(ErrorKind::classify(429, "slow down"), ErrorKind::RateLimited);
        assert_eq!(ErrorKind::classify(500, "oops"), ErrorKind::ServerError);
        assert_eq!(ErrorKind::classify(502, ""), ErrorKind::ServiceUnavailable);
        assert_eq!(ErrorKind::classify(503, ""), ErrorKind::ServiceUnavailable);
        assert_eq!(ErrorKind::classify(529, "busy"), ErrorKind::Overloaded);
        assert_eq!(ErrorKind::classify(418, "teapot"), ErrorKind::Unknown);
    }

    #[test]
    fn test_context_length_checked_first() {
        assert_eq!(
            ErrorKind::classify(
                400,
                "This model's maximum context length is 128000 tokens. However, you requested 130000 tokens."
            ),
            ErrorKind::ContextLengthExceeded
        );
        assert_eq!(
            ErrorKind::classify(429, "Request too large: too many tokens for this model"),
            ErrorKind::ContextLengthExceeded
        );
        assert_eq!(
            ErrorKind::classify(400, "prompt is too long: 210000 tokens > 200000 maximum"),
            ErrorKind::ContextLengthExceeded
        );
        // Server errors are never reclassified
        assert_eq!(
            ErrorKind::classify(500, "context length computation failed"),
            ErrorKind::ServerError
        );
    }

    #[test]
    fn test_error_display_includes_source() {
        let err = Error::from_source(ErrorKind::NotFound, "model gone".into());
        assert_eq!(err.to_string(), "the requested resource was not found: model gone");
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = Error::from_kind(ErrorKind::TimedOut);
        assert_eq!(err.to_string(), "request timed out");
    }
}
