//! Uniform model and contract types shared by every subsystem.
//!
//! `types` defines the data that flows between runners, the orchestrator, and
//! the final report. `traits` defines the contracts those components agree on.

pub mod traits;
pub mod types;

pub use traits::{ChangeCollaborator, Runner, SecurityTool};
pub use types::{
    AssessmentConfig, AssessmentReport, AssessmentResult, Category, CategoryResult,
    ChangeContext, ChangeScope, Issue, Mode, ReportMetadata, Severity, Summary, Suppression,
    WorkPlan, WorkflowPlan,
};
