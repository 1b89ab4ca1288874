//! reqcheck core
//!
//! Records exchanged by the requirement-evaluation pipeline, grade semantics,
//! the error taxonomy, and the JSON checkpoint codec.
//!
//! ## Layer 0 - Data
//!
//! Focus: lossless round-tripping between typed records and checkpoint files.

pub mod codec;
pub mod domain;
pub mod error;
pub mod telemetry;

pub use codec::{
    decode_record, decode_value, read_record, read_shaped, read_text, write_record, write_text,
    FieldType, RecordShape, Shaped,
};
pub use domain::{
    AugmentedFeedback, CriteriaSet, Criterion, Decision, Feedback, FeedbackCollection, Grade,
    ImprovedRequirement,
};
pub use error::{BackendError, ReqcheckError, Result};
pub use telemetry::init_tracing;

/// reqcheck version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
