use crate::archive::ArchiveMode;
use crate::core::BalerError;
use std::fmt;
use std::path::PathBuf;

/// States of the archive workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Init,
    ValidateBoot,
    Revert,
    LocalInstallFlow,
    FullArchiveFlow,
    Cleanup,
    Success,
    Failed,
}

impl WorkflowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

/// Units of work the controller records results for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ValidateBoot,
    ClearStale,
    Snapshot,
    Vendor,
    StripExcluded,
    Package,
    Revert,
    Cleanup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ValidateBoot => "validate boot",
            Stage::ClearStale => "clear stale paths",
            Stage::Snapshot => "snapshot",
            Stage::Vendor => "vendor dependencies",
            Stage::StripExcluded => "strip excluded",
            Stage::Package => "package",
            Stage::Revert => "revert",
            Stage::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

/// Outcome of a single stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageResult {
    pub stage: Stage,
    pub ok: bool,
    pub message: String,
}

/// Everything a finished run produced
#[derive(Debug)]
pub struct RunReport {
    pub mode: ArchiveMode,
    pub state: WorkflowState,
    /// States visited, in order
    pub history: Vec<WorkflowState>,
    pub stages: Vec<StageResult>,
    /// Final artifact (Full Archive success only)
    pub artifact: Option<PathBuf>,
    /// The error that failed the run
    pub error: Option<BalerError>,
}

impl RunReport {
    pub fn new(mode: ArchiveMode) -> Self {
        Self {
            mode,
            state: WorkflowState::Init,
            history: vec![WorkflowState::Init],
            stages: Vec::new(),
            artifact: None,
            error: None,
        }
    }

    pub(crate) fn enter(&mut self, state: WorkflowState) {
        tracing::debug!(from = ?self.state, to = ?state, "workflow transition");
        self.state = state;
        self.history.push(state);
    }

    /// Record a stage outcome; returns whether the workflow may advance
    pub(crate) fn record(&mut self, stage: Stage, outcome: Result<String, BalerError>) -> bool {
        match outcome {
            Ok(message) => {
                tracing::debug!(%stage, %message, "stage passed");
                self.stages.push(StageResult {
                    stage,
                    ok: true,
                    message,
                });
                true
            }
            Err(error) => {
                tracing::error!(%stage, "{}", error);
                self.stages.push(StageResult {
                    stage,
                    ok: false,
                    message: error.to_string(),
                });
                self.error = Some(error);
                false
            }
        }
    }

    pub fn succeeded(&self) -> bool {
        self.state == WorkflowState::Success
    }

    /// Process exit status: 0 for Success, 1 for Failed
    pub fn exit_code(&self) -> u8 {
        if self.succeeded() {
            0
        } else {
            1
        }
    }

    /// Message of the last successful stage
    pub fn last_message(&self) -> Option<&str> {
        self.stages
            .iter()
            .rev()
            .find(|s| s.ok && s.stage != Stage::Cleanup)
            .map(|s| s.message.as_str())
    }

    /// Result of the failing stage, if any
    pub fn failed_stage(&self) -> Option<&StageResult> {
        self.stages.iter().find(|s| !s.ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_exit_code() {
        let mut report = RunReport::new(ArchiveMode::FullArchive);
        assert!(report.record(Stage::ValidateBoot, Ok("ok".to_string())));
        assert!(!report.record(
            Stage::Snapshot,
            Err(BalerError::CopyFailed("copy failed, archive aborted".to_string()))
        ));
        report.enter(WorkflowState::Failed);

        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.failed_stage().unwrap().stage, Stage::Snapshot);
        assert_eq!(report.last_message(), Some("ok"));
        assert!(matches!(report.error, Some(BalerError::CopyFailed(_))));
        assert!(report.state.is_terminal());
    }

    #[test]
    fn test_success_exit_code() {
        let mut report = RunReport::new(ArchiveMode::LocalRevert);
        report.enter(WorkflowState::Success);
        assert_eq!(report.exit_code(), 0);
        assert_eq!(
            report.history,
            vec![WorkflowState::Init, WorkflowState::Success]
        );
    }
}
