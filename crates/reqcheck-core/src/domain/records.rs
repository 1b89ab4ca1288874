//! Records exchanged between pipeline stages and persisted as checkpoints.

use serde::{Deserialize, Serialize};

use super::grade::Grade;
use crate::error::{ReqcheckError, Result};

/// One independent, narrow quality rule derived from a guideline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub title: String,
    pub explanation: String,
}

impl Criterion {
    pub fn new(title: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            explanation: explanation.into(),
        }
    }
}

/// Reviewer verdict on a single criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Include,
    Exclude,
}

impl Decision {
    pub fn is_include(self) -> bool {
        matches!(self, Self::Include)
    }
}

/// Ordered checklist produced once per (subject, model).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaSet {
    pub criteria: Vec<Criterion>,
}

impl CriteriaSet {
    pub fn new(criteria: Vec<Criterion>) -> Self {
        Self { criteria }
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Build a new set holding the criteria whose decision is `Include`.
    ///
    /// Decisions are matched by position; criteria without a decision are
    /// excluded. Relative order is preserved.
    pub fn retain_decisions(&self, decisions: &[Decision]) -> CriteriaSet {
        let criteria = self
            .criteria
            .iter()
            .zip(decisions)
            .filter(|(_, d)| d.is_include())
            .map(|(c, _)| c.clone())
            .collect();
        CriteriaSet { criteria }
    }
}

/// Evaluation of a requirement against one criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub grade: Grade,
    /// Absent only when no improvement is needed.
    #[serde(default)]
    pub suggestion: Option<String>,
}

impl Feedback {
    pub fn new(grade: Grade, suggestion: Option<String>) -> Self {
        Self { grade, suggestion }
    }

    /// Suggestion text, ignoring blank strings.
    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// A criterion paired with its evaluation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AugmentedFeedback {
    pub criterion: Criterion,
    pub feedback: Feedback,
}

/// Per-requirement evaluation, one entry per filtered criterion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackCollection {
    pub feedback_collection: Vec<AugmentedFeedback>,
}

impl FeedbackCollection {
    /// Pair criteria with feedback by position.
    pub fn from_pairs(criteria: &CriteriaSet, feedback: Vec<Feedback>) -> Result<Self> {
        if criteria.len() != feedback.len() {
            return Err(ReqcheckError::Schema(format!(
                "expected {} feedback entries, got {}",
                criteria.len(),
                feedback.len()
            )));
        }
        let feedback_collection = criteria
            .criteria
            .iter()
            .cloned()
            .zip(feedback)
            .map(|(criterion, feedback)| AugmentedFeedback {
                criterion,
                feedback,
            })
            .collect();
        Ok(Self {
            feedback_collection,
        })
    }

    pub fn len(&self) -> usize {
        self.feedback_collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feedback_collection.is_empty()
    }

    /// Entries graded strictly worse than `threshold`.
    pub fn failing(&self, threshold: Grade) -> Vec<&AugmentedFeedback> {
        self.feedback_collection
            .iter()
            .filter(|f| f.feedback.grade.is_failing(threshold))
            .collect()
    }

    /// Whether any entry fails or carries a suggestion.
    pub fn needs_refinement(&self, threshold: Grade) -> bool {
        self.feedback_collection.iter().any(|f| {
            f.feedback.grade.is_failing(threshold) || f.feedback.suggestion().is_some()
        })
    }

    /// True when the entries follow `criteria` one-to-one, in order.
    pub fn matches_criteria(&self, criteria: &CriteriaSet) -> bool {
        self.len() == criteria.len()
            && self
                .feedback_collection
                .iter()
                .zip(&criteria.criteria)
                .all(|(f, c)| &f.criterion == c)
    }
}

/// Terminal artifact of one pipeline run for one requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImprovedRequirement {
    pub improved_requirement: String,
}

impl ImprovedRequirement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            improved_requirement: text.into(),
        }
    }

    /// The backend declined to change the requirement.
    pub fn unchanged(original: &str) -> Self {
        Self::new(original)
    }

    pub fn is_unchanged(&self, original: &str) -> bool {
        self.improved_requirement == original
    }
}
