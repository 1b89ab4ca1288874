//! Pipeline configuration: which subjects and models to run, and where.

use std::fs;
use std::path::{Path, PathBuf};

use reqcheck_backends::BackendConfig;
use reqcheck_core::{ReqcheckError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SUBJECTS_DIR: &str = "data/subjects";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub subjects_dir: PathBuf,
    pub subjects: Vec<String>,
    pub models: Vec<String>,
    pub backend: BackendConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            subjects_dir: PathBuf::from(DEFAULT_SUBJECTS_DIR),
            subjects: Vec::new(),
            models: Vec::new(),
            backend: BackendConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env()
    }

    /// Read a JSON config file. Absent keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| ReqcheckError::io(path, e))?;
        serde_json::from_str(&raw).map_err(|e| {
            ReqcheckError::Config(format!("invalid config file {}: {e}", path.display()))
        })
    }

    /// Optional config file, then the environment on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_env()
    }

    /// Overlay `subjects`, `models` (JSON arrays) and `REQCHECK_SUBJECTS_DIR`,
    /// then the backend settings.
    pub fn with_env(mut self) -> Result<Self> {
        if let Ok(raw) = std::env::var("subjects") {
            self.subjects = parse_list("subjects", &raw)?;
        }
        if let Ok(raw) = std::env::var("models") {
            self.models = parse_list("models", &raw)?;
        }
        if let Ok(dir) = std::env::var("REQCHECK_SUBJECTS_DIR") {
            self.subjects_dir = PathBuf::from(dir);
        }
        self.backend = self.backend.with_env()?;
        Ok(self)
    }
}

/// Parse a JSON array of strings, e.g. `["shop", "bank"]`.
pub fn parse_list(name: &str, raw: &str) -> Result<Vec<String>> {
    serde_json::from_str(raw).map_err(|e| {
        ReqcheckError::Config(format!("{name} must be a JSON array of strings: {e}"))
    })
}
