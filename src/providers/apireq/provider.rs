//! Conversions from request failures into provider errors

use crate::providers::apireq::{HttpError, RequestError};
use crate::providers::Error;

impl From<RequestError> for Error {
    fn from(value: RequestError) -> Self {
        Error::from_source(value.kind(), Box::new(value))
    }
}

impl From<HttpError> for Error {
    fn from(value: HttpError) -> Self {
        Error::from_source(value.kind(), Box::new(value))
    }
}
