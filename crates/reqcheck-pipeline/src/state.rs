//! Checkpoint-derived pipeline state.
//!
//! Stage completion is recorded only by checkpoint files, so state is always
//! recomputed from the filesystem rather than stored.

use std::fmt;

use serde::Serialize;

use crate::layout::CheckpointLayout;

/// Criteria progress for one (subject, model) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CriteriaState {
    NoCriteria,
    CriteriaGenerated,
    CriteriaFiltered,
}

/// Progress of one requirement under a (subject, model) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementState {
    Pending,
    Analyzed,
    Refined,
}

impl fmt::Display for CriteriaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CriteriaState::NoCriteria => "no criteria",
            CriteriaState::CriteriaGenerated => "criteria generated",
            CriteriaState::CriteriaFiltered => "criteria filtered",
        })
    }
}

impl fmt::Display for RequirementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RequirementState::Pending => "pending",
            RequirementState::Analyzed => "analyzed",
            RequirementState::Refined => "refined",
        })
    }
}

pub fn criteria_state(layout: &CheckpointLayout, subject: &str, model: &str) -> CriteriaState {
    if layout.filtered_criteria(subject, model).is_file() {
        CriteriaState::CriteriaFiltered
    } else if layout.criteria(subject, model).is_file() {
        CriteriaState::CriteriaGenerated
    } else {
        CriteriaState::NoCriteria
    }
}

pub fn requirement_state(
    layout: &CheckpointLayout,
    subject: &str,
    model: &str,
    requirement: &str,
) -> RequirementState {
    if !layout.feedback(subject, model, requirement).is_file() {
        RequirementState::Pending
    } else if layout.improved(subject, model, requirement).is_file() {
        RequirementState::Refined
    } else {
        RequirementState::Analyzed
    }
}
