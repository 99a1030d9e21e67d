//! Models and the hook that tells a service which model applies.
//!
//! Any `Serialize` type is a `Model`; its JSON form is what gets sent as a
//! request body. A service finds out which model to build for a method by
//! asking its `ModelHook`.

use std::any::Any;
use std::collections::HashMap;
use std::fmt::Debug;

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpMethod;

pub trait Model: Any + Debug + Send + Sync {
    fn to_json(&self) -> Result<Value, ApiError>;

    fn as_any(&self) -> &dyn Any;
}

impl<T> Model for T
where
    T: Serialize + Debug + Send + Sync + 'static,
{
    fn to_json(&self) -> Result<Value, ApiError> {
        serde_json::to_value(self).map_err(|e| ApiError::SerializationError(e.to_string()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Names the registered model a service builds for a given method.
///
/// This is where a concrete service declares its request/response schema.
pub trait ModelHook: Send + Sync {
    fn model_for(&self, method: HttpMethod) -> Option<String>;
}

/// The default hook: no model for any method.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoModel;

impl ModelHook for NoModel {
    fn model_for(&self, _method: HttpMethod) -> Option<String> {
        None
    }
}

impl<F> ModelHook for F
where
    F: Fn(HttpMethod) -> Option<String> + Send + Sync,
{
    fn model_for(&self, method: HttpMethod) -> Option<String> {
        self(method)
    }
}

/// A fixed method-to-model table.
#[derive(Debug, Clone, Default)]
pub struct MethodModels(HashMap<HttpMethod, String>);

impl MethodModels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, method: HttpMethod, model: impl Into<String>) -> Self {
        self.0.insert(method, model.into());
        self
    }
}

impl ModelHook for MethodModels {
    fn model_for(&self, method: HttpMethod) -> Option<String> {
        self.0.get(&method).cloned()
    }
}
