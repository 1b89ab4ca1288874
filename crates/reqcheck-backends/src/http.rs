//! Shared HTTP plumbing for the network-backed providers.

use std::time::Duration;

use reqcheck_core::{BackendError, ReqcheckError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::backend::Provider;
use crate::config::BackendConfig;

pub(crate) fn build_client(config: &BackendConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("reqcheck/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .map_err(|e| ReqcheckError::Config(format!("failed to build HTTP client: {e}")))
}

/// POST `body` as JSON and decode the JSON response envelope.
pub(crate) async fn post_json<B, R>(
    provider: Provider,
    request: reqwest::RequestBuilder,
    body: &B,
) -> Result<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = request
        .json(body)
        .send()
        .await
        .map_err(|e| transport(provider, e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ReqcheckError::backend(
            provider.name(),
            BackendError::Status {
                status: status.as_u16(),
                body,
            },
        ));
    }

    let text = response.text().await.map_err(|e| transport(provider, e))?;
    serde_json::from_str(&text).map_err(|e| {
        ReqcheckError::backend(
            provider.name(),
            BackendError::NonJson(format!("unexpected response envelope: {e}")),
        )
    })
}

fn transport(provider: Provider, err: reqwest::Error) -> ReqcheckError {
    let message = if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };
    ReqcheckError::backend(provider.name(), BackendError::Transport(message))
}
