//! Model identifier to backend resolution, memoised for the registry's lifetime.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use reqcheck_core::Result;
use tracing::info;

use crate::backend::{Backend, Provider};
use crate::chat::ChatBackend;
use crate::config::BackendConfig;
use crate::mock::MockBackend;
use crate::ollama::OllamaBackend;

/// Resolves model identifiers to shared backend instances.
///
/// Create one per process and pass it to whoever needs backends. The same
/// identifier always yields the same instance, so provider clients and their
/// connection pools are built once.
pub struct BackendRegistry {
    config: BackendConfig,
    cache: Mutex<HashMap<String, Arc<dyn Backend>>>,
}

impl BackendRegistry {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Return the backend for `model_id`, constructing it on first use.
    ///
    /// Fails with `UnsupportedModel` when no provider prefix matches.
    pub fn resolve(&self, model_id: &str) -> Result<Arc<dyn Backend>> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(backend) = cache.get(model_id) {
            return Ok(Arc::clone(backend));
        }

        let backend = self.construct(model_id)?;
        info!(model = %model_id, provider = %backend.provider(), "backend created");
        cache.insert(model_id.to_string(), Arc::clone(&backend));
        Ok(backend)
    }

    /// Pre-seed the cache with a specific instance for `model_id`.
    ///
    /// Replaces any instance already cached under that identifier.
    pub fn register(&self, model_id: impl Into<String>, backend: Arc<dyn Backend>) {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.insert(model_id.into(), backend);
    }

    /// Identifiers resolved so far, sorted.
    pub fn cached_models(&self) -> Vec<String> {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let mut models: Vec<_> = cache.keys().cloned().collect();
        models.sort();
        models
    }

    fn construct(&self, model_id: &str) -> Result<Arc<dyn Backend>> {
        let backend: Arc<dyn Backend> = match Provider::from_model_id(model_id)? {
            Provider::Mock => Arc::new(MockBackend::new(model_id)),
            Provider::Ollama => Arc::new(OllamaBackend::new(model_id, &self.config)?),
            Provider::VertexAi => Arc::new(ChatBackend::vertex(model_id, &self.config)?),
            Provider::OpenAi => Arc::new(ChatBackend::openai(model_id, &self.config)?),
        };
        Ok(backend)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new(BackendConfig::default())
    }
}
