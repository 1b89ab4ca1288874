//! Chat-completions backends: OpenAI (`gpt*`) and Vertex AI model-as-a-service
//! (`meta*`).
//!
//! Both speak the OpenAI chat wire format. OpenAI is asked for strict
//! schema-constrained output built from the record's [`RecordShape`]. Vertex AI
//! gets no response format; answers wrapped in Markdown fences are unwrapped by
//! the response parser.

use async_trait::async_trait;
use reqcheck_core::{
    BackendError, CriteriaSet, FeedbackCollection, Grade, ImprovedRequirement, RecordShape,
    ReqcheckError, Result, Shaped,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::backend::{Backend, Provider};
use crate::config::BackendConfig;
use crate::http::{build_client, post_json};
use crate::{prompts, response};

/// How the answer format is requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnswerFormat {
    /// `response_format: json_schema` with `strict: true`.
    StrictSchema,
    /// Prompt instructions only.
    Unconstrained,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    seed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

fn response_format(format: AnswerFormat, shape: &RecordShape) -> Option<Value> {
    match format {
        AnswerFormat::StrictSchema => Some(json!({
            "type": "json_schema",
            "json_schema": {
                "name": shape.name,
                "strict": true,
                "schema": shape.json_schema()
            }
        })),
        AnswerFormat::Unconstrained => None,
    }
}

/// Backend over an OpenAI-compatible chat completions endpoint.
pub struct ChatBackend {
    provider: Provider,
    model: String,
    endpoint: Option<String>,
    token: Option<String>,
    /// Names the setting to fix when `endpoint` or `token` is missing.
    setup_hint: &'static str,
    format: AnswerFormat,
    seed: u64,
    failing_threshold: Grade,
    http: reqwest::Client,
}

impl ChatBackend {
    /// OpenAI at `{openai_base_url}/chat/completions` with the API key.
    pub fn openai(model: impl Into<String>, config: &BackendConfig) -> Result<Self> {
        let endpoint = format!(
            "{}/chat/completions",
            config.openai_base_url.trim_end_matches('/')
        );
        Self::new(
            Provider::OpenAi,
            model.into(),
            Some(endpoint),
            config.openai_api_key.clone(),
            "set OPENAI_API_KEY",
            AnswerFormat::StrictSchema,
            config,
        )
    }

    /// Vertex AI's `endpoints/openapi` route with an access token.
    pub fn vertex(model: impl Into<String>, config: &BackendConfig) -> Result<Self> {
        Self::new(
            Provider::VertexAi,
            model.into(),
            config.vertex_endpoint(),
            config.vertex_access_token.clone(),
            "set VERTEX_PROJECT and VERTEX_ACCESS_TOKEN",
            AnswerFormat::Unconstrained,
            config,
        )
    }

    fn new(
        provider: Provider,
        model: String,
        endpoint: Option<String>,
        token: Option<String>,
        setup_hint: &'static str,
        format: AnswerFormat,
        config: &BackendConfig,
    ) -> Result<Self> {
        Ok(Self {
            provider,
            model,
            endpoint,
            token,
            setup_hint,
            format,
            seed: config.seed,
            failing_threshold: config.failing_threshold,
            http: build_client(config)?,
        })
    }

    /// One system + user exchange whose answer should match `T`'s shape.
    async fn ask<T: Shaped>(&self, system: &str, user: &str) -> Result<Value> {
        let (Some(endpoint), Some(token)) = (self.endpoint.as_deref(), self.token.as_deref()) else {
            return Err(ReqcheckError::backend(
                self.provider.name(),
                BackendError::NotConfigured(self.setup_hint.to_string()),
            ));
        };

        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            seed: self.seed,
            response_format: response_format(self.format, &T::shape()),
        };
        debug!(provider = %self.provider, model = %self.model, "chat completion");

        let parsed: ChatResponse = post_json(
            self.provider,
            self.http.post(endpoint).bearer_auth(token),
            &body,
        )
        .await?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                ReqcheckError::backend(
                    self.provider.name(),
                    BackendError::NonJson("response contained no message content".to_string()),
                )
            })?;
        response::parse_json_answer(self.provider, &content)
    }
}

#[async_trait]
impl Backend for ChatBackend {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn determine_criteria(&self, guideline: &str) -> Result<CriteriaSet> {
        let answer = self
            .ask::<CriteriaSet>(prompts::CRITERIA_SYSTEM, &prompts::criteria_request(guideline))
            .await?;
        response::criteria_from_answer(&answer)
    }

    async fn analyze_requirement(
        &self,
        criteria: &CriteriaSet,
        requirement: &str,
    ) -> Result<FeedbackCollection> {
        let answer = self
            .ask::<FeedbackCollection>(
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
            .ask::<ImprovedRequirement>(
                prompts::REFINEMENT_SYSTEM,
                &prompts::refinement_request(feedback, requirement, self.failing_threshold),
            )
            .await?;
        response::improved_from_answer(&answer)
    }
}
