//! Adapters translate between logical requests/responses and the wire.
//!
//! # Design
//! An adapter owns both directions for one API flavour: `serialize` turns a
//! `RequestConfig` into an `HttpRequest` (encoding the body, adding headers
//! such as auth), and `unserialize` folds whatever the transport produced
//! (a response or a failure) into `Unserialized`. Failures never escape an
//! adapter as `Err`; they become entries of the error pool.
//!
//! `JsonAdapter` is the fallback for any host without its own adapter.

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ServiceConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, RequestConfig};

/// The normalized result of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Unserialized {
    Data(Value),
    Errors(Vec<ApiError>),
}

#[async_trait]
pub trait Adapter: Send + Sync {
    /// Produce the transport request for `config`.
    async fn serialize(
        &self,
        config: RequestConfig,
        service: &ServiceConfig,
    ) -> Result<HttpRequest, ApiError>;

    /// Normalize the transport outcome into data or a pool of errors.
    async fn unserialize(
        &self,
        response: Result<HttpResponse, ApiError>,
        service: &ServiceConfig,
    ) -> Unserialized;
}

/// Plain JSON over HTTP.
///
/// String bodies are sent verbatim, any other body is JSON-encoded. A 2xx
/// response body is parsed as JSON and returned as the data; every other
/// outcome becomes a single-entry error pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonAdapter;

#[async_trait]
impl Adapter for JsonAdapter {
    async fn serialize(
        &self,
        config: RequestConfig,
        _service: &ServiceConfig,
    ) -> Result<HttpRequest, ApiError> {
        let mut headers: Vec<(String, String)> = config.headers.into_iter().collect();
        let body = match config.body {
            None => None,
            Some(Value::String(raw)) => Some(raw),
            Some(value) => Some(
                serde_json::to_string(&value).map_err(|e| ApiError::SerializationError(e.to_string()))?,
            ),
        };

        set_default_header(&mut headers, "accept", "application/json");
        if body.is_some() {
            set_default_header(&mut headers, "content-type", "application/json");
        }

        Ok(HttpRequest {
            method: config.method,
            url: config.url.value().to_string(),
            headers,
            body,
        })
    }

    async fn unserialize(
        &self,
        response: Result<HttpResponse, ApiError>,
        _service: &ServiceConfig,
    ) -> Unserialized {
        let parsed = response.and_then(|response| {
            check_status(&response)?;
            response.json()
        });
        match parsed {
            Ok(data) => Unserialized::Data(data),
            Err(err) => Unserialized::Errors(vec![err]),
        }
    }
}

fn set_default_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    if !headers.iter().any(|(key, _)| key.eq_ignore_ascii_case(name)) {
        headers.push((name.to_string(), value.to_string()));
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::types::{Headers, Params};
    use crate::url::Url;
    use serde_json::json;

    fn config(method: HttpMethod, body: Option<Value>) -> RequestConfig {
        RequestConfig {
            url: Url::build("http://localhost:3000", "/api/people/", &Params::new()),
            method,
            headers: Headers::new(),
            params: Params::new(),
            body,
        }
    }

    fn response(status: u16, body: &str) -> Result<HttpResponse, ApiError> {
        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        })
    }

    async fn unserialize(response: Result<HttpResponse, ApiError>) -> Unserialized {
        JsonAdapter.unserialize(response, &ServiceConfig::default()).await
    }

    #[tokio::test]
    async fn serialize_get_has_no_body_and_accepts_json() {
        let req = JsonAdapter
            .serialize(config(HttpMethod::Get, None), &ServiceConfig::default())
            .await
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/api/people/");
        assert_eq!(req.headers, vec![("accept".to_string(), "application/json".to_string())]);
        assert!(req.body.is_none());
    }

    #[tokio::test]
    async fn serialize_encodes_json_body() {
        let req = JsonAdapter
            .serialize(
                config(HttpMethod::Post, Some(json!({ "name": "Leia Organa" }))),
                &ServiceConfig::default(),
            )
            .await
            .unwrap();
        assert_eq!(req.body.as_deref(), Some(r#"{"name":"Leia Organa"}"#));
        assert!(req
            .headers
            .contains(&("content-type".to_string(), "application/json".to_string())));
    }

    #[tokio::test]
    async fn serialize_sends_string_body_verbatim() {
        let req = JsonAdapter
            .serialize(config(HttpMethod::Put, Some(json!("foo"))), &ServiceConfig::default())
            .await
            .unwrap();
        assert_eq!(req.body.as_deref(), Some("foo"));
    }

    #[tokio::test]
    async fn serialize_keeps_caller_content_type() {
        let mut cfg = config(HttpMethod::Post, Some(json!("a=1")));
        cfg.headers
            .insert("Content-Type".to_string(), "application/x-www-form-urlencoded".to_string());
        let req = JsonAdapter.serialize(cfg, &ServiceConfig::default()).await.unwrap();
        let content_types: Vec<_> = req
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .collect();
        assert_eq!(content_types.len(), 1);
        assert_eq!(content_types[0].1, "application/x-www-form-urlencoded");
    }

    #[tokio::test]
    async fn success_body_becomes_data() {
        let out = unserialize(response(200, r#"{"name":"Luke Skywalker"}"#)).await;
        assert_eq!(out, Unserialized::Data(json!({ "name": "Luke Skywalker" })));
    }

    #[tokio::test]
    async fn empty_success_body_is_null_data() {
        assert_eq!(unserialize(response(204, "")).await, Unserialized::Data(Value::Null));
    }

    #[tokio::test]
    async fn transport_failure_becomes_error_pool() {
        let out = unserialize(Err(ApiError::TransportError("connection refused".to_string()))).await;
        assert_eq!(
            out,
            Unserialized::Errors(vec![ApiError::TransportError("connection refused".to_string())])
        );
    }

    #[tokio::test]
    async fn not_found_status() {
        assert_eq!(
            unserialize(response(404, r#"{"detail":"Not found"}"#)).await,
            Unserialized::Errors(vec![ApiError::NotFound])
        );
    }

    #[tokio::test]
    async fn error_status_keeps_body() {
        let out = unserialize(response(401, "Unauthorized")).await;
        assert_eq!(
            out,
            Unserialized::Errors(vec![ApiError::HttpError {
                status: 401,
                body: "Unauthorized".to_string()
            }])
        );
    }

    #[tokio::test]
    async fn malformed_success_body_is_an_error() {
        let out = unserialize(response(200, "<html>")).await;
        assert!(matches!(
            out,
            Unserialized::Errors(errors) if matches!(errors[..], [ApiError::DeserializationError(_)])
        ));
    }
}
