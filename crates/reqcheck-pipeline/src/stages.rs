//! The four checkpointed stages.
//!
//! Each stage checks its precondition, performs one state transition and
//! reports whether it wrote its checkpoint or found it already present.

use std::fmt;
use std::path::{Path, PathBuf};

use reqcheck_backends::Backend;
use reqcheck_core::{
    read_record, read_text, write_record, write_text, CriteriaSet, FeedbackCollection,
    ReqcheckError, Result,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::layout::{CheckpointLayout, RequirementFile};
use crate::review::{CriteriaReviewer, ReviewContext};

/// Pipeline step a unit of work belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Backend lookup for the model identifier.
    Resolve,
    Generate,
    Filter,
    Analyze,
    Refine,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Resolve => "resolve",
            Stage::Generate => "generate",
            Stage::Filter => "filter",
            Stage::Analyze => "analyze",
            Stage::Refine => "refine",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a stage did with its checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Written(PathBuf),
    Skipped(PathBuf),
}

impl StageOutcome {
    pub fn path(&self) -> &Path {
        match self {
            StageOutcome::Written(path) | StageOutcome::Skipped(path) => path,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, StageOutcome::Skipped(_))
    }
}

/// `NoCriteria -> CriteriaGenerated`.
pub async fn generate_criteria(
    layout: &CheckpointLayout,
    subject: &str,
    model: &str,
    backend: &dyn Backend,
) -> Result<StageOutcome> {
    let checkpoint = layout.criteria(subject, model);
    if checkpoint.is_file() {
        info!(subject, model, path = %checkpoint.display(), "criteria exist, skipping generation");
        return Ok(StageOutcome::Skipped(checkpoint));
    }

    let guideline = read_text(&layout.guideline(subject))?;
    info!(subject, model, "determining criteria");
    let criteria = backend.determine_criteria(&guideline).await?;
    write_record(&criteria, &checkpoint)?;

    info!(subject, model, criteria = criteria.len(), path = %checkpoint.display(), "criteria written");
    Ok(StageOutcome::Written(checkpoint))
}

/// `CriteriaGenerated -> CriteriaFiltered`.
///
/// Nothing is written unless every criterion received a decision.
pub fn filter_criteria(
    layout: &CheckpointLayout,
    subject: &str,
    model: &str,
    reviewer: &mut dyn CriteriaReviewer,
) -> Result<StageOutcome> {
    let checkpoint = layout.filtered_criteria(subject, model);
    if checkpoint.is_file() {
        info!(subject, model, path = %checkpoint.display(), "filtered criteria exist, skipping review");
        return Ok(StageOutcome::Skipped(checkpoint));
    }

    let unfiltered = layout.criteria(subject, model);
    if !unfiltered.is_file() {
        return Err(ReqcheckError::Precondition {
            stage: Stage::Filter.name(),
            missing: unfiltered,
        });
    }

    let criteria: CriteriaSet = read_record(&unfiltered)?;
    let total = criteria.len();
    let decisions = criteria
        .criteria
        .iter()
        .enumerate()
        .map(|(index, criterion)| {
            let context = ReviewContext {
                subject,
                model,
                index,
                total,
            };
            reviewer.review(&context, criterion)
        })
        .collect::<Result<Vec<_>>>()?;

    let kept = criteria.retain_decisions(&decisions);
    write_record(&kept, &checkpoint)?;

    info!(subject, model, kept = kept.len(), total, path = %checkpoint.display(), "filtered criteria written");
    Ok(StageOutcome::Written(checkpoint))
}

/// `CriteriaFiltered -> Analyzed` for one requirement.
pub async fn analyze_requirement(
    layout: &CheckpointLayout,
    subject: &str,
    model: &str,
    backend: &dyn Backend,
    requirement: &RequirementFile,
) -> Result<StageOutcome> {
    let checkpoint = layout.feedback(subject, model, &requirement.name);
    if checkpoint.is_file() {
        info!(subject, model, requirement = %requirement.name, "feedback exists, skipping analysis");
        return Ok(StageOutcome::Skipped(checkpoint));
    }

    let filtered = layout.filtered_criteria(subject, model);
    if !filtered.is_file() {
        return Err(ReqcheckError::Precondition {
            stage: Stage::Analyze.name(),
            missing: filtered,
        });
    }

    let criteria: CriteriaSet = read_record(&filtered)?;
    let text = read_text(&requirement.path)?;
    info!(subject, model, requirement = %requirement.name, criteria = criteria.len(), "analyzing requirement");
    let feedback = backend.analyze_requirement(&criteria, &text).await?;
    if !feedback.matches_criteria(&criteria) {
        return Err(ReqcheckError::Schema(format!(
            "feedback for '{}' does not follow the filtered criteria",
            requirement.name
        )));
    }
    write_record(&feedback, &checkpoint)?;

    info!(subject, model, requirement = %requirement.name, path = %checkpoint.display(), "feedback written");
    Ok(StageOutcome::Written(checkpoint))
}

/// `Analyzed -> Refined` for one requirement.
///
/// Always recomputed; an existing improved file is overwritten.
pub async fn refine_requirement(
    layout: &CheckpointLayout,
    subject: &str,
    model: &str,
    backend: &dyn Backend,
    requirement: &RequirementFile,
) -> Result<StageOutcome> {
    let feedback_path = layout.feedback(subject, model, &requirement.name);
    if !feedback_path.is_file() {
        return Err(ReqcheckError::Precondition {
            stage: Stage::Refine.name(),
            missing: feedback_path,
        });
    }

    let feedback: FeedbackCollection = read_record(&feedback_path)?;
    let text = read_text(&requirement.path)?;
    let improved = backend.refine_requirement(&feedback, &text).await?;
    if improved.is_unchanged(&text) {
        debug!(subject, model, requirement = %requirement.name, "requirement left unchanged");
    }

    let checkpoint = layout.improved(subject, model, &requirement.name);
    write_text(&improved.improved_requirement, &checkpoint)?;

    info!(subject, model, requirement = %requirement.name, path = %checkpoint.display(), "improved requirement written");
    Ok(StageOutcome::Written(checkpoint))
}
