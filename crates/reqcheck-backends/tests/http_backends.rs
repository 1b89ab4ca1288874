//! Provider adapters against a local HTTP double.

use reqcheck_backends::{Backend, BackendConfig, ChatBackend, OllamaBackend};
use reqcheck_core::{
    BackendError, CriteriaSet, Criterion, Feedback, FeedbackCollection, Grade, ReqcheckError,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn criteria() -> CriteriaSet {
    CriteriaSet::new(vec![
        Criterion::new("Short title", "The title fits in one line."),
        Criterion::new("Benefit", "The user benefit is stated."),
    ])
}

fn chat_answer(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    })
}

// ── Ollama ──

#[tokio::test]
async fn ollama_criteria_from_nested_json_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "llama3.2",
            "format": "json",
            "stream": false,
            "options": {"seed": 42}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3.2",
            "response": "{\"criteria\": [{\"title\": \"Short title\", \"explanation\": \"Fits in one line.\"}]}",
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = BackendConfig::default().with_ollama_base_url(server.uri());
    let backend = OllamaBackend::new("llama3.2", &config).unwrap();
    let set = backend.determine_criteria("Title should be short.").await.unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set.criteria[0].title, "Short title");
}

#[tokio::test]
async fn ollama_answer_without_criteria_key_is_schema_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3.2",
            "response": "{\"checklist\": [{\"title\": \"Short title\", \"explanation\": \"Fits in one line.\"}]}",
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = BackendConfig::default().with_ollama_base_url(server.uri());
    let backend = OllamaBackend::new("llama3.2", &config).unwrap();
    let err = backend.determine_criteria("Title should be short.").await.unwrap_err();
    assert!(err.is_schema(), "{err:?}");
}

#[tokio::test]
async fn ollama_error_status_is_backend_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model \"llama9\" not found"))
        .mount(&server)
        .await;

    let config = BackendConfig::default().with_ollama_base_url(server.uri());
    let backend = OllamaBackend::new("llama9", &config).unwrap();
    let err = backend.determine_criteria("g").await.unwrap_err();
    match err {
        ReqcheckError::Backend {
            source: BackendError::Status { status, body },
            ..
        } => {
            assert_eq!(status, 404);
            assert!(body.contains("not found"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn ollama_prose_answer_is_non_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"response": "I cannot do that."})),
        )
        .mount(&server)
        .await;

    let config = BackendConfig::default().with_ollama_base_url(server.uri());
    let backend = OllamaBackend::new("llama3.2", &config).unwrap();
    let err = backend.determine_criteria("g").await.unwrap_err();
    assert!(matches!(
        err,
        ReqcheckError::Backend {
            source: BackendError::NonJson(_),
            ..
        }
    ));
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    // port 9 (discard) is not expected to accept HTTP connections
    let mut config = BackendConfig::default().with_ollama_base_url("http://127.0.0.1:9");
    config.request_timeout_secs = 5;
    let backend = OllamaBackend::new("llama3.2", &config).unwrap();
    let err = backend.determine_criteria("g").await.unwrap_err();
    assert!(matches!(
        err,
        ReqcheckError::Backend {
            source: BackendError::Transport(_),
            ..
        }
    ));
}

// ── OpenAI ──

#[tokio::test]
async fn openai_analysis_pairs_feedback_with_criteria() {
    let server = MockServer::start().await;
    let content = json!({"feedback_collection": [
        {"criterion": {"title": "Short title", "explanation": "The title fits in one line."},
         "feedback": {"grade": "A", "suggestion": null}},
        {"criterion": {"title": "Benefit", "explanation": "The user benefit is stated."},
         "feedback": {"grade": "E", "suggestion": "State why the user wants milk."}}
    ]})
    .to_string();
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "seed": 42,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "FeedbackCollection",
                    "strict": true,
                    "schema": {"required": ["feedback_collection"], "additionalProperties": false}
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_answer(&content)))
        .expect(1)
        .mount(&server)
        .await;

    let config =
        BackendConfig::default().with_openai(format!("{}/v1", server.uri()), "sk-test");
    let backend = ChatBackend::openai("gpt-4o", &config).unwrap();
    let fc = backend.analyze_requirement(&criteria(), "Buy milk").await.unwrap();

    assert!(fc.matches_criteria(&criteria()));
    assert_eq!(fc.failing(Grade::D).len(), 1);
    assert_eq!(fc.feedback_collection[1].criterion.title, "Benefit");
}

#[tokio::test]
async fn openai_refinement_is_skipped_without_actionable_feedback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let config =
        BackendConfig::default().with_openai(format!("{}/v1", server.uri()), "sk-test");
    let backend = ChatBackend::openai("gpt-4o", &config).unwrap();
    let feedback = FeedbackCollection::from_pairs(
        &criteria(),
        vec![Feedback::new(Grade::A, None), Feedback::new(Grade::B, None)],
    )
    .unwrap();
    let improved = backend.refine_requirement(&feedback, "Buy milk").await.unwrap();
    assert!(improved.is_unchanged("Buy milk"));
}

#[tokio::test]
async fn openai_refinement_returns_improved_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_answer(
            "{\"improved_requirement\": \"As a shopper, I want to buy milk so that I have breakfast.\"}",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let config =
        BackendConfig::default().with_openai(format!("{}/v1", server.uri()), "sk-test");
    let backend = ChatBackend::openai("gpt-4o", &config).unwrap();
    let feedback = FeedbackCollection::from_pairs(
        &criteria(),
        vec![
            Feedback::new(Grade::A, None),
            Feedback::new(Grade::F, Some("Name the benefit.".into())),
        ],
    )
    .unwrap();
    let improved = backend.refine_requirement(&feedback, "Buy milk").await.unwrap();
    assert!(!improved.is_unchanged("Buy milk"));
    assert!(improved.improved_requirement.contains("so that"));
}

#[tokio::test]
async fn openai_without_api_key_is_not_configured() {
    let backend = ChatBackend::openai("gpt-4o", &BackendConfig::default()).unwrap();
    let err = backend.determine_criteria("g").await.unwrap_err();
    assert!(matches!(
        err,
        ReqcheckError::Backend {
            provider: "openai",
            source: BackendError::NotConfigured(_)
        }
    ));
}

// ── Vertex AI ──

#[tokio::test]
async fn vertex_uses_project_route_and_unwraps_fences() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(
            "/v1/projects/req-proj/locations/us-central1/endpoints/openapi/chat/completions",
        ))
        .and(header("authorization", "Bearer ya29.token"))
        .and(body_partial_json(json!({"model": "meta/llama-3.3-70b-instruct-maas"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_answer(
            "```json\n{\"criteria\": [{\"title\": \"Prefix\", \"explanation\": \"Context prefix present.\"}]}\n```",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let config = BackendConfig::default()
        .with_vertex("req-proj", "us-central1", "ya29.token")
        .with_vertex_base_url(server.uri());
    let backend = ChatBackend::vertex("meta/llama-3.3-70b-instruct-maas", &config).unwrap();
    let set = backend.determine_criteria("Prefix titles.").await.unwrap();
    assert_eq!(set.criteria, vec![Criterion::new("Prefix", "Context prefix present.")]);
}

#[tokio::test]
async fn vertex_without_project_is_not_configured() {
    let backend =
        ChatBackend::vertex("meta/llama-3.3-70b-instruct-maas", &BackendConfig::default()).unwrap();
    let err = backend.determine_criteria("g").await.unwrap_err();
    assert!(matches!(
        err,
        ReqcheckError::Backend {
            source: BackendError::NotConfigured(_),
            ..
        }
    ));
}
