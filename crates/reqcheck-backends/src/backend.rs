//! The three-operation contract every provider fulfils.

use std::fmt;

use async_trait::async_trait;
use reqcheck_core::{
    CriteriaSet, FeedbackCollection, ImprovedRequirement, ReqcheckError, Result,
};

/// Provider family, selected by model identifier prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Deterministic in-process backend (`mock*`).
    Mock,
    /// Local model served by Ollama (`llama*`).
    Ollama,
    /// Model hosted on Vertex AI model-as-a-service (`meta*`).
    VertexAi,
    /// OpenAI chat completions (`gpt*`).
    OpenAi,
}

impl Provider {
    /// Prefix rule used by the registry.
    pub fn from_model_id(model_id: &str) -> Result<Provider> {
        if model_id.starts_with("gpt") {
            Ok(Provider::OpenAi)
        } else if model_id.starts_with("llama") {
            Ok(Provider::Ollama)
        } else if model_id.starts_with("meta") {
            Ok(Provider::VertexAi)
        } else if model_id.starts_with("mock") {
            Ok(Provider::Mock)
        } else {
            Err(ReqcheckError::UnsupportedModel(model_id.to_string()))
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Provider::Mock => "mock",
            Provider::Ollama => "ollama",
            Provider::VertexAi => "vertex-ai",
            Provider::OpenAi => "openai",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A model backend able to derive criteria, grade a requirement and refine it.
#[async_trait]
pub trait Backend: Send + Sync {
    fn provider(&self) -> Provider;

    /// Model identifier this backend was constructed with.
    fn model(&self) -> &str;

    /// Turn free-form guideline text into an ordered checklist.
    ///
    /// May return an empty set when the provider answers with an empty list.
    async fn determine_criteria(&self, guideline: &str) -> Result<CriteriaSet>;

    /// Grade `requirement` against every criterion, one entry per criterion in
    /// input order.
    async fn analyze_requirement(
        &self,
        criteria: &CriteriaSet,
        requirement: &str,
    ) -> Result<FeedbackCollection>;

    /// Produce an improved requirement addressing the failing feedback.
    ///
    /// Returning the original text means no change was warranted.
    async fn refine_requirement(
        &self,
        feedback: &FeedbackCollection,
        requirement: &str,
    ) -> Result<ImprovedRequirement>;
}
