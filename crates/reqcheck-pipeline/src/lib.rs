//! reqcheck pipeline
//!
//! Resumable evaluation of requirements against guideline-derived criteria.
//!
//! ## Layer 2 - Orchestration
//!
//! Focus: every stage is gated by, and completes with, a checkpoint file.
//!
//! | Stage | Transition | Checkpoint |
//! |-------|------------|------------|
//! | generate | `NoCriteria -> CriteriaGenerated` | `<model>_criteria.json` |
//! | filter | `CriteriaGenerated -> CriteriaFiltered` | `<model>_criteria_filtered.json` |
//! | analyze | `Pending -> Analyzed` | `analysis/<model>/<name>_feedback.json` |
//! | refine | `Analyzed -> Refined` | `analysis/<model>/<name>_improved` |

pub mod config;
pub mod layout;
pub mod orchestrator;
pub mod report;
pub mod review;
pub mod stages;
pub mod state;

pub use config::PipelineConfig;
pub use layout::{model_slug, CheckpointLayout, RequirementFile};
pub use orchestrator::{unique_combinations, PairStatus, Pipeline, RequirementStatus};
pub use report::{RunReport, UnitKey, UnitOutcome, UnitReport};
pub use review::{CriteriaReviewer, ReviewContext, ScriptedReviewer, TerminalReviewer};
pub use stages::{Stage, StageOutcome};
pub use state::{CriteriaState, RequirementState};
