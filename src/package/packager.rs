use crate::archive::StagingContext;
use crate::core::path::remove_path;
use crate::core::{BalerError, BalerResult};
use crate::di::{CommandRunner, Compressor};
use baler_core::process::Invocation;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const TARBALL_ABORTED: &str = "A problem was encountered creating the tarball, archive aborted";

/// Pick the compressor by probing for `tar` on the PATH
pub fn select_compressor(runner: Arc<dyn CommandRunner>) -> Arc<dyn Compressor> {
    match which::which("tar") {
        Ok(path) => Arc::new(TarCommand::new(runner, path)),
        Err(_) => {
            tracing::debug!("tar not found, using in-process tar.gz writer");
            Arc::new(NativeTarGz)
        }
    }
}

/// Compresses with the system `tar` command (`tar -czf <artifact> ./<dir>`)
pub struct TarCommand {
    runner: Arc<dyn CommandRunner>,
    program: PathBuf,
}

impl TarCommand {
    pub fn new(runner: Arc<dyn CommandRunner>, program: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }
}

impl Compressor for TarCommand {
    fn name(&self) -> &'static str {
        "tar"
    }

    fn compress(&self, staging_root: &Path, dir_name: &str, artifact: &Path) -> BalerResult<()> {
        let invocation = Invocation::new(&self.program)
            .arg("-czf")
            .arg(artifact)
            .arg(format!("./{}", dir_name))
            .current_dir(staging_root);

        let status = self.runner.run(&invocation)?;
        if !status.success() {
            return Err(BalerError::CompressionFailed(format!(
                "{} (tar exited with code {})",
                TARBALL_ABORTED,
                status.code.unwrap_or(1)
            )));
        }

        Ok(())
    }
}

/// In-process tar.gz writer used when no `tar` binary is available
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeTarGz;

impl Compressor for NativeTarGz {
    fn name(&self) -> &'static str {
        "native tar.gz"
    }

    fn compress(&self, staging_root: &Path, dir_name: &str, artifact: &Path) -> BalerResult<()> {
        let file = File::create(artifact)?;
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder.follow_symlinks(false);
        builder.append_dir_all(dir_name, staging_root.join(dir_name))?;
        builder.into_inner()?.finish()?;
        Ok(())
    }
}

/// Outcome of a successful packaging step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    pub artifact: PathBuf,
    /// Artifact size in bytes; `None` if it could not be measured
    pub size: Option<u64>,
}

impl PackageReport {
    /// Operator-facing completion line
    pub fn summary(&self) -> String {
        match self.size {
            Some(bytes) => format!(
                "Your application archive is complete and is {} in size",
                human_size(bytes)
            ),
            None => "Your application archive is complete".to_string(),
        }
    }
}

/// Compresses a staged directory into the final artifact
pub struct ArchivePackager<'a> {
    compressor: &'a dyn Compressor,
    state_dir: &'a str,
}

impl<'a> ArchivePackager<'a> {
    /// `state_dir` is the dependency manager's lock/config directory name,
    /// cleared from the staging root before compressing
    pub fn new(compressor: &'a dyn Compressor, state_dir: &'a str) -> Self {
        Self {
            compressor,
            state_dir,
        }
    }

    /// Compress `ctx.target_dir` into `ctx.artifact`, then delete the staged tree
    ///
    /// On failure the staged tree is kept for inspection and any partial
    /// artifact is removed.
    pub fn package(&self, ctx: &StagingContext) -> BalerResult<PackageReport> {
        tracing::info!(compressor = self.compressor.name(), "Creating archive");

        remove_path(&ctx.staging_root.join(self.state_dir))?;
        remove_path(&ctx.target_dir.join(self.state_dir))?;

        if let Err(e) =
            self.compressor
                .compress(&ctx.staging_root, &ctx.archive_name, &ctx.artifact)
        {
            if let Err(cleanup) = remove_path(&ctx.artifact) {
                tracing::warn!(error = %cleanup, "could not remove partial artifact");
            }
            return Err(match e {
                e @ BalerError::CompressionFailed(_) => e,
                other => BalerError::CompressionFailed(format!("{} ({})", TARBALL_ABORTED, other)),
            });
        }

        tracing::info!("Cleaning up");
        remove_path(&ctx.target_dir)?;

        let size = fs::metadata(&ctx.artifact).ok().map(|m| m.len());
        Ok(PackageReport {
            artifact: ctx.artifact.clone(),
            size,
        })
    }
}

/// Human-readable size in the style of `du -sh` (e.g. `4.2MB`)
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{}B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1}{}", value, UNITS[unit])
}
