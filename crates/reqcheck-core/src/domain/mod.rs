//! Domain model: criteria, feedback and refined requirements.

pub mod grade;
pub mod records;

pub use grade::Grade;
pub use records::{
    AugmentedFeedback, CriteriaSet, Criterion, Decision, Feedback, FeedbackCollection,
    ImprovedRequirement,
};
