//! Archive-build orchestration.
//!
//! The [`ModeController`] selects one of three workflows and owns the
//! cleanup guarantees across all of them:
//!
//! ```text
//! Init -> ValidateBoot -> {Revert | LocalInstallFlow | FullArchiveFlow}
//!      -> Cleanup -> {Success | Failed}
//! ```

pub mod controller;
pub mod report;
pub mod request;

pub use controller::ModeController;
pub use report::{RunReport, Stage, StageResult, WorkflowState};
pub use request::{ArchiveMode, ArchiveRequest, StagingContext};
