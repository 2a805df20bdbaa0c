//! Turns unsuccessful HTTP responses into classified errors

use reqwest::Response;
use serde::Deserialize;
use std::fmt;

use crate::providers::ErrorKind;

/// An HTTP response with a non-success status, along with the message the
/// service attached to it.
#[derive(Debug)]
pub(crate) struct HttpError {
    pub status: u16,
    pub message: String,
}

impl HttpError {
    pub(crate) fn kind(&self) -> ErrorKind {
        ErrorKind::classify(self.status, &self.message)
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "HTTP {}", self.status)
        } else {
            write!(f, "HTTP {}: {}", self.status, self.message)
        }
    }
}

impl std::error::Error for HttpError {}

// Services disagree on where the message goes:
//   {"error": {"message": "..."}}, {"error": "..."} or {"message": "..."}
#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Nested { error: NestedError },
    Flat { error: String },
    Message { message: String },
}

#[derive(Deserialize)]
struct NestedError {
    message: String,
}

fn extract_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody::Nested { error }) => error.message,
        Ok(ErrorBody::Flat { error }) => error,
        Ok(ErrorBody::Message { message }) => message,
        Err(_) => body.trim().to_string(),
    }
}

/// Passes successful responses through and converts the rest into an [`HttpError`].
pub(crate) async fn ensure_success(res: Response) -> Result<Response, HttpError> {
    let status = res.status();

    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await.unwrap_or_default();

    Err(HttpError {
        status: status.as_u16(),
        message: extract_message(&body),
    })
}
