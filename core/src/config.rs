//! Declarative service configuration.
//!
//! Every field has a default, so a configuration can be written with only
//! the fields that matter. Unknown keys are ignored when deserializing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{Headers, ParamValue, Params};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Domain to query, e.g. `https://swapi.dev`.
    pub host: String,
    /// Path template appended to the host; may hold `{param}` placeholders.
    pub path: String,
    pub method: HttpMethod,
    pub headers: Headers,
    /// Fills path placeholders; the rest become the query string.
    pub params: Params,
    /// Payload for POST, PUT and PATCH. Ignored for other methods.
    pub body: Option<Value>,
    /// Emit request diagnostics through `tracing`.
    pub debug: bool,
}

impl ServiceConfig {
    /// Config for `path` on `host` with every other field defaulted.
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Parse a configuration object. Unknown keys are ignored; an unknown
    /// method or a mistyped field is an error.
    pub fn from_json(value: Value) -> Result<Self, ApiError> {
        serde_json::from_value(value).map_err(|e| ApiError::InvalidConfig(e.to_string()))
    }

    /// Set the HTTP verb.
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Add a header, replacing any earlier value for `name`.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add a path or query parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Set the request payload.
    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Turn request diagnostics on or off.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
