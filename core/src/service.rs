//! The service: one configured endpoint and its request/response cycle.
//!
//! # Design
//! A `Service` owns a `ServiceConfig` plus three collaborators: the
//! `Registry` (models and adapters), the `Transport`, and the `ModelHook`
//! that names the model for each method. `do_request` is a single linear
//! pass with no retries:
//!
//! 1. build the `RequestConfig` (URL, headers, params, body);
//! 2. `Adapter::serialize` turns it into an `HttpRequest`;
//! 3. the transport sends it;
//! 4. `Adapter::unserialize` folds the outcome into data or errors;
//! 5. data is turned into a model when the hook names one.
//!
//! Nothing in that pass returns `Err` to the caller: every failure ends up in
//! `ServiceResponse::Errors`. The adapter is resolved once and reused. The
//! model is per request, reset before and after use.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Value};
use tracing::{debug, debug_span, error, warn, Instrument, Span};

use crate::adapter::{Adapter, Unserialized};
use crate::config::ServiceConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestConfig};
use crate::model::{Model, ModelHook, NoModel};
use crate::registry::{Registry, ADAPTER_PREFIX};
use crate::transport::{ReqwestTransport, Transport};
use crate::url::Url;

/// What `Service::do_request` resolves to.
#[derive(Debug)]
pub enum ServiceResponse {
    /// The data was mapped onto the model named by the service's hook.
    Model(Box<dyn Model>),
    /// Unserialized data, no model applies.
    Data(Value),
    /// The pool of errors; never empty.
    Errors(Vec<ApiError>),
}

impl ServiceResponse {
    /// True unless the request ended in the error pool.
    pub fn is_ok(&self) -> bool {
        !matches!(self, ServiceResponse::Errors(_))
    }

    /// Unserialized data, when no model was applied.
    pub fn data(&self) -> Option<&Value> {
        match self {
            ServiceResponse::Data(data) => Some(data),
            _ => None,
        }
    }

    /// The error pool of a failed request.
    pub fn errors(&self) -> Option<&[ApiError]> {
        match self {
            ServiceResponse::Errors(errors) => Some(errors),
            _ => None,
        }
    }

    /// The model built from the response data.
    pub fn model(&self) -> Option<&dyn Model> {
        match self {
            ServiceResponse::Model(model) => Some(&**model),
            _ => None,
        }
    }

    /// The model as its concrete type, if it is a `T`.
    pub fn downcast_model<T: 'static>(&self) -> Option<&T> {
        self.model()?.as_any().downcast_ref::<T>()
    }

    /// `{"data": ...}`, `{"errors": [...]}` or the model's own JSON.
    pub fn to_json(&self) -> Result<Value, ApiError> {
        match self {
            ServiceResponse::Model(model) => model.to_json(),
            ServiceResponse::Data(data) => Ok(json!({ "data": data })),
            ServiceResponse::Errors(errors) => {
                let errors: Vec<String> = errors.iter().map(ToString::to_string).collect();
                Ok(json!({ "errors": errors }))
            }
        }
    }
}

/// One configured endpoint: its config, collaborators and the state of the
/// last request.
pub struct Service {
    config: ServiceConfig,
    registry: Arc<Registry>,
    transport: Arc<dyn Transport>,
    hook: Arc<dyn ModelHook>,
    adapter: Option<Arc<dyn Adapter>>,
    model: Option<Box<dyn Model>>,
    url: Option<Url>,
    request: Option<HttpRequest>,
    response: Option<HttpResponse>,
}

impl Service {
    /// Service with a default registry, the reqwest transport and no models.
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            registry: Arc::new(Registry::new()),
            transport: Arc::new(ReqwestTransport::default()),
            hook: Arc::new(NoModel),
            adapter: None,
            model: None,
            url: None,
            request: None,
            response: None,
        }
    }

    /// Use a shared registry. Drops any memoized adapter.
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self.adapter = None;
        self
    }

    /// Replace the transport that sends requests.
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    /// Replace the hook that names the model for each method.
    pub fn with_model_hook(mut self, hook: impl ModelHook + 'static) -> Self {
        self.hook = Arc::new(hook);
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Mutable access for reconfiguring between requests. Changing the host
    /// does not re-resolve an adapter that was already memoized.
    pub fn config_mut(&mut self) -> &mut ServiceConfig {
        &mut self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// URL of the last built request.
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// The request the adapter produced for the last call.
    pub fn request(&self) -> Option<&HttpRequest> {
        self.request.as_ref()
    }

    /// The raw response of the last call, if the transport produced one.
    pub fn response(&self) -> Option<&HttpResponse> {
        self.response.as_ref()
    }

    /// Name of the model that applies to `method`, as told by the hook.
    pub fn model_name(&self, method: HttpMethod) -> Option<String> {
        self.hook.model_for(method)
    }

    /// Memoized model for the current method, built from `values` on a miss.
    ///
    /// Returns `Ok(None)` without caching anything when no model applies.
    pub fn get_model(&mut self, values: Value) -> Result<Option<&dyn Model>, ApiError> {
        if self.model.is_none() {
            if let Some(name) = self.model_name(self.config.method) {
                self.model = Some(self.registry.create(&name, values)?);
            }
        }
        Ok(self.model.as_deref())
    }

    /// Use `model` as the body source for the next write request.
    pub fn set_model(&mut self, model: Box<dyn Model>) {
        self.model = Some(model);
    }

    pub fn clear_model(&mut self) {
        self.model = None;
    }

    /// Memoized adapter for this service's host.
    pub fn get_adapter(&mut self) -> Arc<dyn Adapter> {
        if let Some(adapter) = &self.adapter {
            return Arc::clone(adapter);
        }
        let host = if self.config.host.is_empty() {
            "JSON"
        } else {
            self.config.host.as_str()
        };
        let adapter = self.registry.create_adapter(&format!("{ADAPTER_PREFIX}{host}"));
        self.adapter = Some(Arc::clone(&adapter));
        adapter
    }

    /// Assemble the logical request from the current configuration.
    pub fn build_request_config(&mut self) -> Result<RequestConfig, ApiError> {
        let url = Url::build(&self.config.host, &self.config.path, &self.config.params);
        self.url = Some(url.clone());

        let body = if self.config.method.has_body() {
            // No body and no preset model: nothing to build a model from.
            let serialized = match self.config.body.clone() {
                None if self.model.is_none() => None,
                values => self
                    .get_model(values.unwrap_or(Value::Null))?
                    .map(|model| model.to_json()),
            };
            self.model = None;
            match serialized.transpose()? {
                Some(json) => Some(json),
                None => self.config.body.clone(),
            }
        } else {
            None
        };

        Ok(RequestConfig {
            url,
            method: self.config.method,
            headers: self.config.headers.clone(),
            params: self.config.params.clone(),
            body,
        })
    }

    /// Perform the request. Always resolves; failures come back as
    /// `ServiceResponse::Errors`.
    pub async fn do_request(&mut self) -> ServiceResponse {
        let span = if self.config.debug {
            debug_span!("request", path = %self.config.path)
        } else {
            Span::none()
        };
        self.run().instrument(span).await
    }

    async fn run(&mut self) -> ServiceResponse {
        self.model = None;
        self.request = None;
        self.response = None;

        let outcome = self.send().await;
        if let Err(err) = &outcome {
            if self.config.debug {
                error!(error = %err, "request failed");
            }
        }

        let response = self.on_request_end(outcome).await;
        if self.config.debug {
            debug!(?response, "response");
        }
        response
    }

    async fn send(&mut self) -> Result<HttpResponse, ApiError> {
        let config = self.build_request_config()?;
        if self.config.debug && !config.url.is_complete() {
            warn!(placeholders = ?config.url.unresolved(), "url has unresolved placeholders");
        }

        let adapter = self.get_adapter();
        let request = adapter.serialize(config, &self.config).await?;
        if self.config.debug {
            debug!(method = %request.method, url = %request.url, headers = ?request.headers, "sending");
        }
        self.request = Some(request.clone());

        let started = Instant::now();
        let response = self.transport.fetch(&request).await;
        if self.config.debug {
            let elapsed_ms = started.elapsed().as_millis() as u64;
            debug!(elapsed_ms, "time");
        }

        let response = response?;
        self.response = Some(response.clone());
        Ok(response)
    }

    async fn on_request_end(&mut self, outcome: Result<HttpResponse, ApiError>) -> ServiceResponse {
        let adapter = self.get_adapter();
        match adapter.unserialize(outcome, &self.config).await {
            Unserialized::Errors(errors) if errors.is_empty() => ServiceResponse::Errors(vec![
                ApiError::DeserializationError("adapter reported failure without errors".to_string()),
            ]),
            Unserialized::Errors(errors) => ServiceResponse::Errors(errors),
            Unserialized::Data(data) => self.resolve_response_model(data),
        }
    }

    /// Map response data onto the hook's model. Empty data (a 204 or a blank
    /// body) is returned as is.
    fn resolve_response_model(&mut self, data: Value) -> ServiceResponse {
        if data.is_null() || self.model_name(self.config.method).is_none() {
            return ServiceResponse::Data(data);
        }
        self.model = None;
        if let Err(err) = self.get_model(data) {
            return ServiceResponse::Errors(vec![err]);
        }
        match self.model.take() {
            Some(model) => ServiceResponse::Model(model),
            None => ServiceResponse::Data(Value::Null),
        }
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("model", &self.model)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}
