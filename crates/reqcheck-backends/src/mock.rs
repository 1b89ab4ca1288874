//! Deterministic in-process backend.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqcheck_core::{
    AugmentedFeedback, CriteriaSet, Criterion, Feedback, FeedbackCollection, Grade,
    ImprovedRequirement, Result,
};
use tracing::debug;

use crate::backend::{Backend, Provider};

pub const MOCK_SUGGESTION: &str = "This is a mock suggestion.";
pub const REFINED_SUFFIX: &str = " (Refined)";

/// Per-operation invocation counters.
#[derive(Debug, Default)]
pub struct CallCounts {
    determine_criteria: AtomicUsize,
    analyze_requirement: AtomicUsize,
    refine_requirement: AtomicUsize,
}

impl CallCounts {
    pub fn determine_criteria(&self) -> usize {
        self.determine_criteria.load(Ordering::SeqCst)
    }

    pub fn analyze_requirement(&self) -> usize {
        self.analyze_requirement.load(Ordering::SeqCst)
    }

    pub fn refine_requirement(&self) -> usize {
        self.refine_requirement.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.determine_criteria() + self.analyze_requirement() + self.refine_requirement()
    }
}

/// Backend with fixed answers, used for tests and dry runs.
///
/// - criteria: a single `TestCriterion` / `TestExplanation`
/// - analysis: grade `B` with [`MOCK_SUGGESTION`] for every criterion
/// - refinement: the requirement with [`REFINED_SUFFIX`] appended
#[derive(Debug)]
pub struct MockBackend {
    model: String,
    calls: CallCounts,
}

impl MockBackend {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            calls: CallCounts::default(),
        }
    }

    pub fn calls(&self) -> &CallCounts {
        &self.calls
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn provider(&self) -> Provider {
        Provider::Mock
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn determine_criteria(&self, _guideline: &str) -> Result<CriteriaSet> {
        self.calls.determine_criteria.fetch_add(1, Ordering::SeqCst);
        debug!(model = %self.model, "mock determine_criteria called");
        Ok(CriteriaSet::new(vec![Criterion::new(
            "TestCriterion",
            "TestExplanation",
        )]))
    }

    async fn analyze_requirement(
        &self,
        criteria: &CriteriaSet,
        _requirement: &str,
    ) -> Result<FeedbackCollection> {
        self.calls.analyze_requirement.fetch_add(1, Ordering::SeqCst);
        debug!(model = %self.model, criteria = criteria.len(), "mock analyze_requirement called");
        let feedback_collection = criteria
            .criteria
            .iter()
            .map(|criterion| AugmentedFeedback {
                criterion: criterion.clone(),
                feedback: Feedback::new(Grade::B, Some(MOCK_SUGGESTION.to_string())),
            })
            .collect();
        Ok(FeedbackCollection {
            feedback_collection,
        })
    }

    async fn refine_requirement(
        &self,
        _feedback: &FeedbackCollection,
        requirement: &str,
    ) -> Result<ImprovedRequirement> {
        self.calls.refine_requirement.fetch_add(1, Ordering::SeqCst);
        debug!(model = %self.model, "mock refine_requirement called");
        Ok(ImprovedRequirement::new(format!("{requirement}{REFINED_SUFFIX}")))
    }
}
