//! Per-unit outcome record of a pipeline run.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use reqcheck_core::{write_record, ReqcheckError, Result};
use serde::Serialize;
use tracing::error;

use crate::stages::{Stage, StageOutcome};

/// (subject, model[, requirement]) a stage ran for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitKey {
    pub subject: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirement: Option<String>,
}

impl UnitKey {
    pub fn pair(subject: &str, model: &str) -> Self {
        Self {
            subject: subject.to_string(),
            model: model.to_string(),
            requirement: None,
        }
    }

    pub fn requirement(subject: &str, model: &str, requirement: &str) -> Self {
        Self {
            requirement: Some(requirement.to_string()),
            ..Self::pair(subject, model)
        }
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.subject, self.model)?;
        if let Some(requirement) = &self.requirement {
            write!(f, "/{requirement}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "error", rename_all = "snake_case")]
pub enum UnitOutcome {
    Completed,
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitReport {
    #[serde(flatten)]
    pub key: UnitKey,
    pub stage: Stage,
    #[serde(flatten)]
    pub outcome: UnitOutcome,
}

/// Everything one `Pipeline::run` did.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub units: Vec<UnitReport>,
}

impl RunReport {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            units: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn record(&mut self, key: UnitKey, stage: Stage, outcome: &StageOutcome) {
        let outcome = match outcome {
            StageOutcome::Written(_) => UnitOutcome::Completed,
            StageOutcome::Skipped(_) => UnitOutcome::Skipped,
        };
        self.units.push(UnitReport {
            key,
            stage,
            outcome,
        });
    }

    /// Log and record a failed unit.
    pub fn record_failure(&mut self, key: UnitKey, stage: Stage, err: &ReqcheckError) {
        error!(
            subject = %key.subject,
            model = %key.model,
            requirement = key.requirement.as_deref().unwrap_or("-"),
            stage = %stage,
            error = %err,
            "stage failed"
        );
        self.units.push(UnitReport {
            key,
            stage,
            outcome: UnitOutcome::Failed(err.to_string()),
        });
    }

    pub fn failures(&self) -> impl Iterator<Item = &UnitReport> {
        self.units
            .iter()
            .filter(|unit| matches!(unit.outcome, UnitOutcome::Failed(_)))
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn completed_count(&self) -> usize {
        self.count(|o| matches!(o, UnitOutcome::Completed))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, UnitOutcome::Skipped))
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    /// One-line summary for operators.
    pub fn summary(&self) -> String {
        let elapsed = self
            .finished_at
            .map(|end| (end - self.started_at).num_milliseconds())
            .unwrap_or_default();
        format!(
            "{} stages: {} completed, {} skipped, {} failed ({} ms)",
            self.units.len(),
            self.completed_count(),
            self.skipped_count(),
            self.failed_count(),
            elapsed
        )
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        write_record(self, path)
    }

    fn count(&self, predicate: impl Fn(&UnitOutcome) -> bool) -> usize {
        self.units.iter().filter(|u| predicate(&u.outcome)).count()
    }
}
