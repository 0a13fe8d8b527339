use baler::archive::{ArchiveMode, ArchiveRequest, ModeController};
use baler::config::Config;
use baler::core::path::find_workspace_root;
use baler::core::{format_error_with_help, BalerError, BalerResult};
use baler::di::ServiceContainer;
use baler::workspace::WorkspaceManifest;
use std::env;
use std::process::ExitCode;

pub struct ArchiveOptions {
    pub local: bool,
    pub no_local: bool,
    pub exclude: Vec<String>,
}

impl ArchiveOptions {
    fn mode(&self) -> ArchiveMode {
        if self.no_local {
            ArchiveMode::LocalRevert
        } else if self.local {
            ArchiveMode::LocalInstall
        } else {
            ArchiveMode::FullArchive
        }
    }
}

/// Run one archive workflow; the exit code comes from its terminal state
pub fn run(options: ArchiveOptions) -> BalerResult<ExitCode> {
    let current_dir = env::current_dir()
        .map_err(|e| BalerError::Path(format!("Failed to get current directory: {}", e)))?;

    let workspace_root = find_workspace_root(&current_dir)?;
    let manifest = WorkspaceManifest::load(&workspace_root)?;
    let config = Config::load()?;

    let request = ArchiveRequest::new(
        options.mode(),
        &workspace_root,
        &manifest.name,
        &manifest.version,
    )
    .exclude(config.exclude.iter().cloned())
    .exclude(manifest.exclude.iter().cloned())
    .exclude(options.exclude);

    tracing::debug!(
        root = %workspace_root.display(),
        mode = ?request.mode,
        excluded = ?request.excluded_paths,
        "starting archive run"
    );

    let services = ServiceContainer::new(config);
    tracing::debug!(
        copier = services.copier().name(),
        compressor = services.compressor().name(),
        "selected providers"
    );

    let report = ModeController::new(services).run(&request);

    match &report.error {
        Some(error) => eprintln!("\n{}", format_error_with_help(error)),
        None => {
            if let Some(message) = report.last_message() {
                println!("✓ {}", message);
            }
            if let Some(artifact) = &report.artifact {
                println!("  Archive: {}", artifact.display());
            }
        }
    }

    Ok(ExitCode::from(report.exit_code()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(local: bool, no_local: bool) -> ArchiveOptions {
        ArchiveOptions {
            local,
            no_local,
            exclude: Vec::new(),
        }
    }

    #[test]
    fn test_mode_from_flags() {
        assert_eq!(options(false, false).mode(), ArchiveMode::FullArchive);
        assert_eq!(options(true, false).mode(), ArchiveMode::LocalInstall);
        assert_eq!(options(false, true).mode(), ArchiveMode::LocalRevert);
    }
}
