use crate::archive::StagingContext;
use crate::core::path::{ensure_dir, remove_path};
use crate::core::{BalerError, BalerResult};
use crate::di::{CommandRunner, WorkspaceCopier};
use crate::workspace::PathFilter;
use baler_core::process::Invocation;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

const COPY_ABORTED: &str =
    "A problem was encountered when creating a copy of your application, archive aborted";

/// Pick the copy strategy by probing for `rsync` on the PATH
pub fn select_copier(runner: Arc<dyn CommandRunner>) -> Arc<dyn WorkspaceCopier> {
    match which::which("rsync") {
        Ok(path) => {
            tracing::debug!(rsync = %path.display(), "using rsync for workspace copies");
            Arc::new(RsyncCopier::new(runner, path))
        }
        Err(_) => {
            tracing::debug!("rsync not found, using native workspace copy");
            Arc::new(NativeCopier)
        }
    }
}

/// Copies with `rsync`, passing one anchored `--exclude` per excluded entry
pub struct RsyncCopier {
    runner: Arc<dyn CommandRunner>,
    program: PathBuf,
}

impl RsyncCopier {
    pub fn new(runner: Arc<dyn CommandRunner>, program: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    fn invocation(&self, source: &Path, dest: &Path, filter: &PathFilter) -> Invocation {
        Invocation::new(&self.program)
            .args(["-av", "--progress", "./"])
            .arg(dest)
            .args(["--exclude", "/tmp"])
            .args(filter.rsync_excludes())
            .current_dir(source)
    }
}

impl WorkspaceCopier for RsyncCopier {
    fn name(&self) -> &'static str {
        "rsync"
    }

    fn uses_intermediate(&self) -> bool {
        false
    }

    fn copy_tree(
        &self,
        source: &Path,
        ctx: &StagingContext,
        filter: &PathFilter,
    ) -> BalerResult<()> {
        ensure_dir(&ctx.staging_root)?;

        let invocation = self.invocation(source, &ctx.target_dir, filter);
        let status = self.runner.run(&invocation).map_err(|e| {
            BalerError::CopyFailed(format!("{} (could not start rsync: {})", COPY_ABORTED, e))
        })?;

        if !status.success() {
            return Err(BalerError::CopyFailed(format!(
                "{} (rsync exited with code {})",
                COPY_ABORTED,
                status.code.unwrap_or(1)
            )));
        }

        Ok(())
    }
}

/// In-process copy used when no copy-with-exclude tool is installed
///
/// Copies into `ctx.temp_copy_dir` first and then renames that into place.
/// Excluded entries are skipped while walking; symlinks are recreated, not
/// followed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCopier;

impl NativeCopier {
    fn copy_filtered(source: &Path, dest: &Path, filter: &PathFilter) -> BalerResult<()> {
        fs::create_dir_all(dest)?;

        let walker = WalkDir::new(source)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                entry
                    .path()
                    .strip_prefix(source)
                    .map(|rel| !filter.is_excluded(rel))
                    .unwrap_or(false)
            });

        for entry in walker {
            let entry = entry?;
            let rel = entry
                .path()
                .strip_prefix(source)
                .map_err(|e| BalerError::Path(e.to_string()))?;
            let target = dest.join(rel);
            let file_type = entry.file_type();

            if file_type.is_dir() {
                fs::create_dir_all(&target)?;
            } else if file_type.is_symlink() {
                copy_symlink(entry.path(), &target)?;
            } else {
                fs::copy(entry.path(), &target)?;
            }
        }

        Ok(())
    }
}

#[cfg(unix)]
fn copy_symlink(source: &Path, target: &Path) -> BalerResult<()> {
    let link = fs::read_link(source)?;
    std::os::unix::fs::symlink(link, target)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(source: &Path, target: &Path) -> BalerResult<()> {
    if source.is_dir() {
        fs::create_dir_all(target)?;
    } else {
        fs::copy(source, target)?;
    }
    Ok(())
}

impl WorkspaceCopier for NativeCopier {
    fn name(&self) -> &'static str {
        "native"
    }

    fn uses_intermediate(&self) -> bool {
        true
    }

    fn copy_tree(
        &self,
        source: &Path,
        ctx: &StagingContext,
        filter: &PathFilter,
    ) -> BalerResult<()> {
        let scratch = ctx.temp_copy_dir.as_deref().ok_or_else(|| {
            BalerError::CopyFailed(format!("{} (no intermediate copy directory)", COPY_ABORTED))
        })?;

        remove_path(scratch)?;
        Self::copy_filtered(source, scratch, filter)
            .map_err(|e| BalerError::CopyFailed(format!("{} ({})", COPY_ABORTED, e)))?;

        ensure_dir(&ctx.staging_root)?;
        fs::rename(scratch, &ctx.target_dir).map_err(|e| {
            BalerError::CopyFailed(format!(
                "{} (could not move copy into {}: {})",
                COPY_ABORTED,
                ctx.target_dir.display(),
                e
            ))
        })?;

        Ok(())
    }
}

/// Produces the filtered copy of a workspace at `ctx.target_dir`
pub struct Snapshotter<'a> {
    copier: &'a dyn WorkspaceCopier,
    filter: &'a PathFilter,
}

impl<'a> Snapshotter<'a> {
    pub fn new(copier: &'a dyn WorkspaceCopier, filter: &'a PathFilter) -> Self {
        Self { copier, filter }
    }

    /// Copy `source` into the staging context and strip it
    ///
    /// The intermediate copy is always removed. On failure the partially
    /// staged tree is removed too.
    pub fn snapshot(&self, source: &Path, ctx: &StagingContext) -> BalerResult<PathBuf> {
        tracing::info!(copier = self.copier.name(), "Creating a copy of the application");

        let result = self.copy_and_strip(source, ctx);

        if let Some(scratch) = &ctx.temp_copy_dir {
            if let Err(e) = remove_path(scratch) {
                tracing::warn!(
                    path = %scratch.display(),
                    error = %e,
                    "could not remove intermediate copy"
                );
            }
        }

        if result.is_err() {
            if let Err(e) = remove_path(&ctx.target_dir) {
                tracing::warn!(
                    path = %ctx.target_dir.display(),
                    error = %e,
                    "could not remove partial copy"
                );
            }
        }

        result.map(|()| ctx.target_dir.clone())
    }

    fn copy_and_strip(&self, source: &Path, ctx: &StagingContext) -> BalerResult<()> {
        self.copier.copy_tree(source, ctx, self.filter)?;

        strip_excluded(&ctx.target_dir, self.filter)
            .and_then(|_| strip_metadata_dirs(&ctx.target_dir, self.filter))
            .map_err(|e| match e {
                e if e.is_stage_failure() => e,
                other => BalerError::CopyFailed(format!("{} ({})", COPY_ABORTED, other)),
            })?;

        Ok(())
    }
}

/// Remove every excluded root-anchored entry under `root`
///
/// Symlinks are unlinked rather than followed. Only plain relative entries
/// are honoured, so nothing above `root` is ever removed.
pub fn strip_excluded(root: &Path, filter: &PathFilter) -> BalerResult<Vec<PathBuf>> {
    let mut removed = Vec::new();

    for entry in filter.excluded() {
        if !Path::new(entry)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            tracing::warn!(entry, "skipping exclude entry outside {}", root.display());
            continue;
        }
        let path = root.join(entry);
        if remove_path(&path)? {
            tracing::debug!(path = %path.display(), "removed excluded entry");
            removed.push(path);
        }
    }

    Ok(removed)
}

/// Remove metadata directories (`.svn`, `.SYNC`, ...) at any depth under `root`
pub fn strip_metadata_dirs(root: &Path, filter: &PathFilter) -> BalerResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut walker = WalkDir::new(root).min_depth(1).into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry?;
        if entry.file_type().is_dir() && filter.is_metadata_dir(entry.file_name()) {
            found.push(entry.path().to_path_buf());
            walker.skip_current_dir();
        }
    }

    for path in &found {
        tracing::info!(path = %path.display(), "Removing");
        remove_path(path)?;
    }

    Ok(found)
}
