//! Error taxonomy for reqcheck.

use std::path::PathBuf;

/// Failures raised at the provider boundary.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider answer is not valid JSON: {0}")]
    NonJson(String),

    #[error("provider is not configured: {0}")]
    NotConfigured(String),
}

/// reqcheck errors.
#[derive(Debug, thiserror::Error)]
pub enum ReqcheckError {
    #[error("backend error ({provider}): {source}")]
    Backend {
        provider: &'static str,
        #[source]
        source: BackendError,
    },

    #[error("schema error: {0}")]
    Schema(String),

    #[error("unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("precondition failed for {stage}: missing {}", missing.display())]
    Precondition { stage: &'static str, missing: PathBuf },

    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl ReqcheckError {
    /// Wrap a provider failure.
    pub fn backend(provider: &'static str, source: BackendError) -> Self {
        Self::Backend { provider, source }
    }

    /// Attach the offending path to an I/O failure.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this is a `Precondition` failure.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition { .. })
    }

    /// Whether this is a `Schema` failure.
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema(_))
    }
}

impl From<serde_json::Error> for ReqcheckError {
    fn from(err: serde_json::Error) -> Self {
        ReqcheckError::Schema(err.to_string())
    }
}

/// Result type for reqcheck operations.
pub type Result<T> = std::result::Result<T, ReqcheckError>;
