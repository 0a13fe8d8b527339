use crate::archive::{
    ArchiveMode, ArchiveRequest, RunReport, Stage, StagingContext, WorkflowState,
};
use crate::core::path::remove_path;
use crate::core::BalerError;
use crate::di::ServiceContainer;
use crate::package::ArchivePackager;
use crate::vendor::{DependencyVendorer, VendorOptions};
use crate::workspace::snapshot::strip_excluded;
use crate::workspace::{validate_boot_marker, PathFilter, Snapshotter};

/// Top-level state machine for archive runs
///
/// Runs are strictly sequential and every stage blocks on its external
/// tool. One controller may serve many runs, but two runs must never target
/// the same workspace at once.
pub struct ModeController {
    services: ServiceContainer,
}

impl ModeController {
    pub fn new(services: ServiceContainer) -> Self {
        Self { services }
    }

    /// Execute `request` to a terminal state
    ///
    /// The returned report carries the terminal state, every stage outcome and
    /// the error that failed the run, if any.
    pub fn run(&self, request: &ArchiveRequest) -> RunReport {
        let mut report = RunReport::new(request.mode);
        let config = self.services.config();

        report.enter(WorkflowState::ValidateBoot);
        let validated = validate_boot_marker(
            &request.workspace_root,
            &request.app_name,
            &config.marker_text,
        )
        .map(|()| "workspace was generated by the expected boot system".to_string());
        if !report.record(Stage::ValidateBoot, validated) {
            report.enter(WorkflowState::Failed);
            return report;
        }

        let filter = PathFilter::new(&request.excluded_paths)
            .with_metadata_dirs(config.metadata_dirs.iter().cloned());

        let staging = match request.mode {
            ArchiveMode::LocalRevert => {
                report.enter(WorkflowState::Revert);
                self.revert(request, &mut report);
                None
            }
            ArchiveMode::LocalInstall => {
                report.enter(WorkflowState::LocalInstallFlow);
                self.local_install(request, &mut report);
                None
            }
            ArchiveMode::FullArchive => {
                report.enter(WorkflowState::FullArchiveFlow);
                let ctx = StagingContext::new(
                    request,
                    &config.archive_extension,
                    self.services.copier().uses_intermediate(),
                );
                self.full_archive(request, &ctx, &filter, &mut report);
                Some(ctx)
            }
        };

        report.enter(WorkflowState::Cleanup);
        self.cleanup(staging.as_ref(), &mut report);

        if report.error.is_none() {
            report.enter(WorkflowState::Success);
        } else {
            report.enter(WorkflowState::Failed);
        }
        report
    }

    fn vendorer<'a>(&'a self, request: &'a ArchiveRequest) -> DependencyVendorer<'a> {
        DependencyVendorer::new(
            self.services.runner(),
            self.services.config(),
            &request.app_name,
        )
    }

    fn revert(&self, request: &ArchiveRequest, report: &mut RunReport) {
        let root = &request.workspace_root;
        let config = self.services.config();
        let vendorer = self.vendorer(request);

        let outcome = remove_path(&vendorer.vendor_dir(root))
            .and_then(|_| remove_path(&root.join(&config.sentinel_file)))
            .and_then(|_| vendorer.boot_check(root))
            .and_then(|booted| {
                if booted {
                    Ok("Local dependencies have been removed and your application has been \
                        restored to use a conventional installation"
                        .to_string())
                } else {
                    Err(BalerError::RevertFailed(
                        "A problem was encountered when trying to boot your application after \
                         removing local dependencies"
                            .to_string(),
                    ))
                }
            });

        report.record(Stage::Revert, outcome);
    }

    fn local_install(&self, request: &ArchiveRequest, report: &mut RunReport) {
        let outcome = self
            .vendorer(request)
            .vendor(&request.workspace_root, VendorOptions::local())
            .map(|()| {
                "Dependencies have been successfully installed to your application. \
                 If you ran this in error or otherwise want to undo it, run: \
                 baler archive --no-local"
                    .to_string()
            });

        report.record(Stage::Vendor, outcome);
    }

    fn full_archive(
        &self,
        request: &ArchiveRequest,
        ctx: &StagingContext,
        filter: &PathFilter,
        report: &mut RunReport,
    ) {
        tracing::info!("Preparing the workspace");

        let cleared = ctx
            .clear_stale()
            .map(|paths| format!("cleared {} stale path(s)", paths.len()));
        if !report.record(Stage::ClearStale, cleared) {
            return;
        }

        let snapshot = Snapshotter::new(self.services.copier(), filter)
            .snapshot(&request.workspace_root, ctx)
            .map(|dir| format!("copied application to {}", dir.display()));
        if !report.record(Stage::Snapshot, snapshot) {
            return;
        }

        let vendored = self
            .vendorer(request)
            .vendor(&ctx.target_dir, VendorOptions::full_archive())
            .map(|()| "dependencies vendored and boot validated".to_string());
        if !report.record(Stage::Vendor, vendored) {
            return;
        }

        tracing::info!("Removing all temporary and output files");
        let stripped = strip_excluded(&ctx.target_dir, filter)
            .map(|removed| format!("removed {} transient entr(ies)", removed.len()));
        if !report.record(Stage::StripExcluded, stripped) {
            return;
        }

        let packager = ArchivePackager::new(
            self.services.compressor(),
            &self.services.config().dependency_manager.state_dir,
        );
        match packager.package(ctx) {
            Ok(package) => {
                report.artifact = Some(package.artifact.clone());
                report.record(Stage::Package, Ok(package.summary()));
            }
            Err(e) => {
                report.record(Stage::Package, Err(e));
            }
        }
    }

    /// Remove transient copies; on failure also the staged tree, unless the
    /// packager failed, in which case the staged tree is kept for inspection.
    fn cleanup(&self, staging: Option<&StagingContext>, report: &mut RunReport) {
        let Some(ctx) = staging else {
            report.record(Stage::Cleanup, Ok("nothing to clean up".to_string()));
            return;
        };

        let mut removed = Vec::new();
        let mut targets: Vec<_> = ctx.temp_copy_dir.iter().collect();

        let keep_staged = matches!(report.error, Some(BalerError::CompressionFailed(_)));
        if report.error.is_some() && !keep_staged {
            targets.push(&ctx.target_dir);
        }

        for path in targets {
            match remove_path(path) {
                Ok(true) => removed.push(path.display().to_string()),
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "cleanup could not remove path"
                    );
                }
            }
        }

        if keep_staged {
            tracing::info!(
                path = %ctx.target_dir.display(),
                "staged directory kept for inspection"
            );
        }

        let message = if removed.is_empty() {
            "nothing to clean up".to_string()
        } else {
            format!("removed {}", removed.join(", "))
        };
        report.record(Stage::Cleanup, Ok(message));
    }
}
