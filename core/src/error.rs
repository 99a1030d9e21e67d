//! Error types for the service client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status." All other non-2xx responses land in `HttpError` with the raw
//! status code and body for debugging. Every variant can end up in the error
//! pool returned by `Service::do_request`, so they are cheap to clone and
//! compare.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be parsed.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be encoded.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced a response (DNS, connect, invalid URL...).
    #[error("transport failed: {0}")]
    TransportError(String),

    #[error("unsupported HTTP method: {0}")]
    InvalidMethod(String),

    #[error("invalid service configuration: {0}")]
    InvalidConfig(String),

    /// No model constructor is registered under this key.
    #[error("no model registered as {0:?}")]
    UnknownModel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_display_carries_status_and_body() {
        let err = ApiError::HttpError {
            status: 401,
            body: "Unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 401: Unauthorized");
    }

    #[test]
    fn unknown_model_display_quotes_key() {
        let err = ApiError::UnknownModel("Person".to_string());
        assert_eq!(err.to_string(), r#"no model registered as "Person""#);
    }
}
