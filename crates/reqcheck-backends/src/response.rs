//! Parsing of provider answers into records.
//!
//! Answers are expected to be JSON objects whose top-level keys map directly
//! onto the record fields.

use reqcheck_core::{
    decode_value, BackendError, CriteriaSet, Feedback, FeedbackCollection, ImprovedRequirement,
    ReqcheckError, Result,
};
use serde_json::Value;

use crate::backend::Provider;

/// Parse a model's textual answer as JSON, tolerating Markdown code fences.
pub fn parse_json_answer(provider: Provider, content: &str) -> Result<Value> {
    let body = strip_code_fence(content);
    serde_json::from_str(body).map_err(|e| {
        ReqcheckError::backend(
            provider.name(),
            BackendError::NonJson(format!("{e}: {}", truncate(body, 200))),
        )
    })
}

/// Criteria answer. `{"criteria": []}` is an empty set; an answer without
/// the `criteria` key is a schema error.
pub fn criteria_from_answer(answer: &Value) -> Result<CriteriaSet> {
    if answer.get("criteria").is_none() {
        return Err(ReqcheckError::Schema("answer has no criteria array".to_string()));
    }
    decode_value(answer)
}

/// Analysis answer, re-attached to the input criteria by position.
pub fn feedback_from_answer(answer: &Value, criteria: &CriteriaSet) -> Result<FeedbackCollection> {
    let entries = answer
        .get("feedback_collection")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ReqcheckError::Schema("answer has no feedback_collection array".to_string())
        })?;

    let feedback = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            // Accept flat {"grade", "suggestion"} entries as well as nested ones.
            let inner = entry.get("feedback").unwrap_or(entry);
            decode_value::<Feedback>(inner)
                .map_err(|e| ReqcheckError::Schema(format!("feedback_collection[{i}]: {e}")))
        })
        .collect::<Result<Vec<_>>>()?;

    FeedbackCollection::from_pairs(criteria, feedback)
}

/// Refinement answer.
pub fn improved_from_answer(answer: &Value) -> Result<ImprovedRequirement> {
    decode_value(answer)
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the info string ("json") up to the first newline
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
