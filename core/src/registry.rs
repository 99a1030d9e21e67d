//! Key-to-constructor registry for models and adapters.
//!
//! # Design
//! Constructors are plain closures keyed by name. The registry is built once,
//! wrapped in an `Arc` and handed to each `Service`, so there is no hidden
//! process-wide state: register everything before the first request.
//!
//! Adapters are looked up as `"Adapter::<host>"`. A lookup miss falls back
//! to `"Adapter::JSON"`, which `Registry::new` always registers.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::adapter::{Adapter, JsonAdapter};
use crate::error::ApiError;
use crate::model::Model;

pub const ADAPTER_PREFIX: &str = "Adapter::";
pub const DEFAULT_ADAPTER_KEY: &str = "Adapter::JSON";

type ModelFactory = Arc<dyn Fn(Value) -> Result<Box<dyn Model>, ApiError> + Send + Sync>;
type AdapterFactory = Arc<dyn Fn() -> Arc<dyn Adapter> + Send + Sync>;

struct ModelEntry {
    type_id: TypeId,
    factory: ModelFactory,
}

pub struct Registry {
    models: HashMap<String, ModelEntry>,
    adapters: HashMap<String, AdapterFactory>,
}

impl Registry {
    pub fn new() -> Self {
        let mut registry = Self {
            models: HashMap::new(),
            adapters: HashMap::new(),
        };
        registry.register_adapter(DEFAULT_ADAPTER_KEY, || JsonAdapter);
        registry
    }

    /// Register a model constructor under `key`, replacing any previous one.
    pub fn register<T, F>(&mut self, key: impl Into<String>, constructor: F) -> &mut Self
    where
        T: Model,
        F: Fn(Value) -> Result<T, ApiError> + Send + Sync + 'static,
    {
        let factory: ModelFactory =
            Arc::new(move |values| constructor(values).map(|model| Box::new(model) as Box<dyn Model>));
        self.models.insert(
            key.into(),
            ModelEntry {
                type_id: TypeId::of::<T>(),
                factory,
            },
        );
        self
    }

    /// Register a model that is built by deserializing the values.
    pub fn register_model<T>(&mut self, key: impl Into<String>) -> &mut Self
    where
        T: Model + DeserializeOwned,
    {
        self.register(key, |values| {
            serde_json::from_value::<T>(values).map_err(|e| ApiError::DeserializationError(e.to_string()))
        })
    }

    pub fn create(&self, key: &str, values: Value) -> Result<Box<dyn Model>, ApiError> {
        let entry = self
            .models
            .get(key)
            .ok_or_else(|| ApiError::UnknownModel(key.to_string()))?;
        (entry.factory)(values)
    }

    /// Whether `instance` is of the type registered under `key`.
    pub fn is(&self, key: &str, instance: &dyn Model) -> bool {
        self.models
            .get(key)
            .is_some_and(|entry| entry.type_id == instance.as_any().type_id())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.models.contains_key(key) || self.adapters.contains_key(key)
    }

    pub fn register_adapter<A, F>(&mut self, key: impl Into<String>, factory: F) -> &mut Self
    where
        A: Adapter + 'static,
        F: Fn() -> A + Send + Sync + 'static,
    {
        self.adapters
            .insert(key.into(), Arc::new(move || Arc::new(factory()) as Arc<dyn Adapter>));
        self
    }

    /// Build the adapter registered under `key`, falling back to JSON.
    pub fn create_adapter(&self, key: &str) -> Arc<dyn Adapter> {
        self.adapters
            .get(key)
            .or_else(|| self.adapters.get(DEFAULT_ADAPTER_KEY))
            .map(|factory| factory())
            .unwrap_or_else(|| Arc::new(JsonAdapter))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut models: Vec<_> = self.models.keys().collect();
        let mut adapters: Vec<_> = self.adapters.keys().collect();
        models.sort();
        adapters.sort();
        f.debug_struct("Registry")
            .field("models", &models)
            .field("adapters", &adapters)
            .finish()
    }
}
