//! Transport failures, classified the same way as HTTP failures

use std::error::Error as StdError;
use std::fmt;

use crate::providers::ErrorKind;

/// A request that never produced a usable response.
#[derive(Debug)]
pub(crate) struct RequestError {
    source: reqwest::Error,
}

impl From<reqwest::Error> for RequestError {
    fn from(source: reqwest::Error) -> Self {
        RequestError { source }
    }
}

impl RequestError {
    pub(crate) fn kind(&self) -> ErrorKind {
        let err = &self.source;

        if err.is_timeout() {
            ErrorKind::TimedOut
        } else if err.is_connect() {
            ErrorKind::Connection
        } else if err.is_decode() || err.is_redirect() {
            ErrorKind::UnexpectedResponse
        } else {
            ErrorKind::Unknown
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ErrorKind::TimedOut => f.write_str("request timed out"),
            ErrorKind::Connection => f.write_str("connection failed"),
            ErrorKind::UnexpectedResponse if self.source.is_redirect() => {
                f.write_str("redirect policy violated")
            }
            ErrorKind::UnexpectedResponse => f.write_str("failed to decode the response"),
            _ => f.write_str("request failed"),
        }
    }
}

impl StdError for RequestError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.source)
    }
}
