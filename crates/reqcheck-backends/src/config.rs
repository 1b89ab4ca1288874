//! Provider endpoints, credentials and sampling settings.

use std::fmt;

use reqcheck_core::{Grade, ReqcheckError, Result};
use serde::{Deserialize, Serialize};

/// Fixed sampling seed sent with every request.
pub const DEFAULT_SEED: u64 = 42;

/// Settings shared by every backend the registry constructs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Deterministic sampling seed, honoured where the provider supports it.
    pub seed: u64,
    /// Ollama server root.
    pub ollama_base_url: String,
    /// OpenAI API root (the `/v1` prefix included).
    pub openai_base_url: String,
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,
    /// Google Cloud project hosting the Vertex AI endpoint.
    pub vertex_project: Option<String>,
    pub vertex_location: String,
    /// Overrides the regional `aiplatform.googleapis.com` root.
    pub vertex_base_url: Option<String>,
    #[serde(skip_serializing)]
    pub vertex_access_token: Option<String>,
    /// Per-request timeout.
    pub request_timeout_secs: u64,
    /// Grades strictly below this are failing.
    pub failing_threshold: Grade,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            ollama_base_url: "http://localhost:11434".to_string(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_api_key: None,
            vertex_project: None,
            vertex_location: "us-central1".to_string(),
            vertex_base_url: None,
            vertex_access_token: None,
            request_timeout_secs: 300,
            failing_threshold: Grade::DEFAULT_THRESHOLD,
        }
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("seed", &self.seed)
            .field("ollama_base_url", &self.ollama_base_url)
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("vertex_project", &self.vertex_project)
            .field("vertex_location", &self.vertex_location)
            .field("vertex_base_url", &self.vertex_base_url)
            .field(
                "vertex_access_token",
                &self.vertex_access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("failing_threshold", &self.failing_threshold)
            .finish()
    }
}

impl BackendConfig {
    /// Overlay environment variables on the defaults.
    ///
    /// Both the conventional upper-case names and the lower-case `.env`
    /// spellings (`ollama_base_url`, `openai-api-key`, `seed`) are accepted.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env()
    }

    /// Overlay environment variables on `self`.
    pub fn with_env(mut self) -> Result<Self> {
        if let Some(seed) = env_any(&["REQCHECK_SEED", "seed"]) {
            self.seed = seed
                .trim()
                .parse()
                .map_err(|_| ReqcheckError::Config(format!("invalid seed: {seed:?}")))?;
        }
        if let Some(url) = env_any(&["OLLAMA_BASE_URL", "ollama_base_url"]) {
            self.ollama_base_url = url;
        }
        if let Some(url) = env_any(&["OPENAI_BASE_URL"]) {
            self.openai_base_url = url;
        }
        if let Some(key) = env_any(&["OPENAI_API_KEY", "openai-api-key"]) {
            self.openai_api_key = Some(key);
        }
        if let Some(project) = env_any(&["VERTEX_PROJECT", "GOOGLE_CLOUD_PROJECT"]) {
            self.vertex_project = Some(project);
        }
        if let Some(location) = env_any(&["VERTEX_LOCATION"]) {
            self.vertex_location = location;
        }
        if let Some(url) = env_any(&["VERTEX_BASE_URL"]) {
            self.vertex_base_url = Some(url);
        }
        if let Some(token) = env_any(&["VERTEX_ACCESS_TOKEN"]) {
            self.vertex_access_token = Some(token);
        }
        if let Some(secs) = env_any(&["REQCHECK_TIMEOUT_SECS"]) {
            self.request_timeout_secs = secs
                .trim()
                .parse()
                .map_err(|_| ReqcheckError::Config(format!("invalid timeout: {secs:?}")))?;
        }
        if let Some(grade) = env_any(&["REQCHECK_FAILING_THRESHOLD"]) {
            self.failing_threshold = grade.parse()?;
        }
        Ok(self)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_ollama_base_url(mut self, url: impl Into<String>) -> Self {
        self.ollama_base_url = url.into();
        self
    }

    pub fn with_openai(mut self, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        self.openai_base_url = base_url.into();
        self.openai_api_key = Some(api_key.into());
        self
    }

    pub fn with_vertex(
        mut self,
        project: impl Into<String>,
        location: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        self.vertex_project = Some(project.into());
        self.vertex_location = location.into();
        self.vertex_access_token = Some(access_token.into());
        self
    }

    pub fn with_vertex_base_url(mut self, url: impl Into<String>) -> Self {
        self.vertex_base_url = Some(url.into());
        self
    }

    /// Vertex AI OpenAI-compatible chat completions endpoint, if a project is set.
    pub fn vertex_endpoint(&self) -> Option<String> {
        let project = self.vertex_project.as_deref()?;
        let location = &self.vertex_location;
        let root = self
            .vertex_base_url
            .clone()
            .unwrap_or_else(|| format!("https://{location}-aiplatform.googleapis.com"));
        Some(format!(
            "{}/v1/projects/{project}/locations/{location}/endpoints/openapi/chat/completions",
            root.trim_end_matches('/')
        ))
    }
}

fn env_any(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|v| !v.trim().is_empty())
}
