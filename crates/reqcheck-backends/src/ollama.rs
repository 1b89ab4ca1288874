//! Local models served by Ollama (`/api/generate`, JSON mode).

use async_trait::async_trait;
use reqcheck_core::{CriteriaSet, FeedbackCollection, Grade, ImprovedRequirement, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::backend::{Backend, Provider};
use crate::config::BackendConfig;
use crate::http::{build_client, post_json};
use crate::{prompts, response};

/// Ollama HTTP backend. The model identifier is passed through verbatim.
pub struct OllamaBackend {
    model: String,
    base_url: String,
    seed: u64,
    failing_threshold: Grade,
    client: reqwest::Client,
}

/// Request body for `/api/generate`.
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    format: &'static str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    seed: u64,
}

/// Response body from `/api/generate`; `response` holds the model's text.
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaBackend {
    pub fn new(model: impl Into<String>, config: &BackendConfig) -> Result<Self> {
        Ok(Self {
            model: model.into(),
            base_url: config.ollama_base_url.trim_end_matches('/').to_string(),
            seed: config.seed,
            failing_threshold: config.failing_threshold,
            client: build_client(config)?,
        })
    }

    async fn generate_json(&self, system: &str, user: &str) -> Result<Value> {
        let prompt = format!("{system}\n{user}");
        let body = GenerateRequest {
            model: &self.model,
            prompt: &prompt,
            format: "json",
            stream: false,
            options: GenerateOptions { seed: self.seed },
        };
        let url = format!("{}/api/generate", self.base_url);
        debug!(model = %self.model, url = %url, "ollama generate");

        let parsed: GenerateResponse =
            post_json(Provider::Ollama, self.client.post(&url), &body).await?;
        response::parse_json_answer(Provider::Ollama, &parsed.response)
    }
}

#[async_trait]
impl Backend for OllamaBackend {
    fn provider(&self) -> Provider {
        Provider::Ollama
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn determine_criteria(&self, guideline: &str) -> Result<CriteriaSet> {
        let answer = self
            .generate_json(prompts::CRITERIA_SYSTEM, &prompts::criteria_request(guideline))
            .await?;
        response::criteria_from_answer(&answer)
    }

    async fn analyze_requirement(
        &self,
        criteria: &CriteriaSet,
        requirement: &str,
    ) -> Result<FeedbackCollection> {
        let answer = self
            .generate_json(
                prompts::ANALYSIS_SYSTEM,
                &prompts::analysis_request(criteria, requirement),
            )
            .await?;
        response::feedback_from_answer(&answer, criteria)
    }

    async fn refine_requirement(
        &self,
        feedback: &FeedbackCollection,
        requirement: &str,
    ) -> Result<ImprovedRequirement> {
        if !feedback.needs_refinement(self.failing_threshold) {
            info!(model = %self.model, "no actionable feedback, keeping requirement");
            return Ok(ImprovedRequirement::unchanged(requirement));
        }
        let answer = self
            .generate_json(
                prompts::REFINEMENT_SYSTEM,
                &prompts::refinement_request(feedback, requirement, self.failing_threshold),
            )
            .await?;
        response::improved_from_answer(&answer)
    }
}
