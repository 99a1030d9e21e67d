//! Declarative HTTP service client.
//!
//! # Overview
//! A `Service` is configured with a host, a path template, a method,
//! headers, params and an optional body. `Service::do_request` turns that
//! configuration into a request, lets an `Adapter` encode it, sends it
//! through a `Transport`, lets the adapter decode the outcome and finally
//! maps the data onto a registered `Model` when one applies.
//!
//! # Design
//! - `do_request` never fails: network errors, bad statuses and malformed
//!   bodies all come back as `ServiceResponse::Errors`.
//! - Adapters and models are resolved by key through an explicit `Registry`
//!   handed to the service, not through global state.
//! - `Transport` returns responses as plain data with an owned body, so the
//!   core can be driven by any HTTP client. `ReqwestTransport` is the default.
//! - Diagnostics go through `tracing` and only when `ServiceConfig::debug`
//!   is set.

pub mod adapter;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod registry;
pub mod service;
pub mod transport;
pub mod types;
pub mod url;

pub use adapter::{Adapter, JsonAdapter, Unserialized};
pub use config::ServiceConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestConfig};
pub use model::{MethodModels, Model, ModelHook, NoModel};
pub use registry::Registry;
pub use service::{Service, ServiceResponse};
pub use transport::{ReqwestTransport, Transport};
pub use types::{Headers, ParamValue, Params};
pub use url::Url;
