//! Cross-product driver over (subject, model) pairs.

use std::collections::BTreeSet;
use std::sync::Arc;

use reqcheck_backends::{Backend, BackendRegistry};
use reqcheck_core::{ReqcheckError, Result};
use serde::Serialize;
use tracing::info;

use crate::layout::{CheckpointLayout, RequirementFile};
use crate::report::{RunReport, UnitKey};
use crate::review::CriteriaReviewer;
use crate::stages::{self, Stage, StageOutcome};
use crate::state::{criteria_state, requirement_state, CriteriaState, RequirementState};

/// Sorted, de-duplicated cross-product of subjects and models.
pub fn unique_combinations<S, M>(subjects: &[S], models: &[M]) -> Vec<(String, String)>
where
    S: AsRef<str>,
    M: AsRef<str>,
{
    subjects
        .iter()
        .flat_map(|subject| {
            models
                .iter()
                .map(move |model| (subject.as_ref().to_string(), model.as_ref().to_string()))
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct RequirementStatus {
    pub name: String,
    pub state: RequirementState,
}

/// Checkpoint state of one (subject, model) pair.
#[derive(Debug, Clone, Serialize)]
pub struct PairStatus {
    pub subject: String,
    pub model: String,
    pub criteria: CriteriaState,
    pub requirements: Vec<RequirementStatus>,
    /// Why the requirement directory could not be listed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements_error: Option<String>,
}

/// Runs the four stages for every configured pair.
///
/// Stages run one after another; a failure ends only the unit it occurred in.
pub struct Pipeline {
    layout: CheckpointLayout,
    registry: Arc<BackendRegistry>,
    reviewer: Box<dyn CriteriaReviewer>,
}

impl Pipeline {
    pub fn new(
        layout: CheckpointLayout,
        registry: Arc<BackendRegistry>,
        reviewer: Box<dyn CriteriaReviewer>,
    ) -> Self {
        Self {
            layout,
            registry,
            reviewer,
        }
    }

    pub fn layout(&self) -> &CheckpointLayout {
        &self.layout
    }

    pub fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }

    /// Run every stage over the cross-product of `subjects` and `models`.
    pub async fn run<S, M>(&mut self, subjects: &[S], models: &[M]) -> RunReport
    where
        S: AsRef<str>,
        M: AsRef<str>,
    {
        let mut report = RunReport::start();
        let pairs = unique_combinations(subjects, models);
        info!(pairs = pairs.len(), root = %self.layout.root().display(), "starting pipeline run");

        for (subject, model) in &pairs {
            self.run_pair(subject, model, &mut report).await;
        }

        report.finish();
        info!(summary = %report.summary(), "pipeline run finished");
        report
    }

    async fn run_pair(&mut self, subject: &str, model: &str, report: &mut RunReport) {
        let pair = UnitKey::pair(subject, model);
        info!(subject, model, "processing pair");

        let backend = match self.registry.resolve(model) {
            Ok(backend) => backend,
            Err(err) => {
                report.record_failure(pair, Stage::Resolve, &err);
                return;
            }
        };

        match stages::generate_criteria(&self.layout, subject, model, backend.as_ref()).await {
            Ok(outcome) => report.record(pair.clone(), Stage::Generate, &outcome),
            Err(err) => {
                report.record_failure(pair, Stage::Generate, &err);
                return;
            }
        }

        match stages::filter_criteria(&self.layout, subject, model, self.reviewer.as_mut()) {
            Ok(outcome) => report.record(pair.clone(), Stage::Filter, &outcome),
            Err(err) => {
                report.record_failure(pair, Stage::Filter, &err);
                return;
            }
        }

        let requirements = match self.layout.list_requirements(subject) {
            Ok(requirements) => requirements,
            Err(err) => {
                report.record_failure(pair, Stage::Analyze, &err);
                return;
            }
        };

        for requirement in &requirements {
            self.run_requirement(subject, model, backend.as_ref(), requirement, report)
                .await;
        }
    }

    async fn run_requirement(
        &self,
        subject: &str,
        model: &str,
        backend: &dyn Backend,
        requirement: &RequirementFile,
        report: &mut RunReport,
    ) {
        let key = UnitKey::requirement(subject, model, &requirement.name);

        match stages::analyze_requirement(&self.layout, subject, model, backend, requirement).await
        {
            Ok(outcome) => report.record(key.clone(), Stage::Analyze, &outcome),
            Err(err) => {
                report.record_failure(key, Stage::Analyze, &err);
                return;
            }
        }

        // refinement has no checkpoint guard of its own and is recomputed on every pass
        match stages::refine_requirement(&self.layout, subject, model, backend, requirement).await {
            Ok(outcome) => report.record(key, Stage::Refine, &outcome),
            Err(err) => report.record_failure(key, Stage::Refine, &err),
        }
    }

    /// Criteria generation only.
    pub async fn generate(&self, subject: &str, model: &str) -> Result<StageOutcome> {
        let backend = self.registry.resolve(model)?;
        stages::generate_criteria(&self.layout, subject, model, backend.as_ref()).await
    }

    /// Interactive filtering only.
    pub fn filter(&mut self, subject: &str, model: &str) -> Result<StageOutcome> {
        stages::filter_criteria(&self.layout, subject, model, self.reviewer.as_mut())
    }

    /// Analysis and refinement for one pair, optionally a single requirement.
    pub async fn analyze(
        &self,
        subject: &str,
        model: &str,
        only: Option<&str>,
    ) -> Result<RunReport> {
        let backend = self.registry.resolve(model)?;
        let mut requirements = self.layout.list_requirements(subject)?;
        if let Some(name) = only {
            requirements.retain(|requirement| requirement.name == name);
            if requirements.is_empty() {
                return Err(ReqcheckError::Config(format!(
                    "no requirement named '{name}' for subject '{subject}'"
                )));
            }
        }

        let mut report = RunReport::start();
        for requirement in &requirements {
            self.run_requirement(subject, model, backend.as_ref(), requirement, &mut report)
                .await;
        }
        report.finish();
        Ok(report)
    }

    /// Checkpoint state of every pair, without calling any backend.
    pub fn status<S, M>(&self, subjects: &[S], models: &[M]) -> Vec<PairStatus>
    where
        S: AsRef<str>,
        M: AsRef<str>,
    {
        unique_combinations(subjects, models)
            .into_iter()
            .map(|(subject, model)| {
                let (files, requirements_error) = match self.layout.list_requirements(&subject) {
                    Ok(files) => (files, None),
                    Err(err) => (Vec::new(), Some(err.to_string())),
                };
                let requirements = files
                    .into_iter()
                    .map(|requirement| RequirementStatus {
                        state: requirement_state(&self.layout, &subject, &model, &requirement.name),
                        name: requirement.name,
                    })
                    .collect();
                PairStatus {
                    criteria: criteria_state(&self.layout, &subject, &model),
                    requirements,
                    requirements_error,
                    subject,
                    model,
                }
            })
            .collect()
    }
}
