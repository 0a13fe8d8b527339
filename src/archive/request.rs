use crate::core::path::{artifact_path, intermediate_copy_dir, remove_path, staged_dir, tmp_dir};
use crate::core::BalerResult;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Which workflow a run executes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveMode {
    /// Snapshot, vendor and compress a staged copy
    FullArchive,
    /// Vendor dependencies into the live workspace
    LocalInstall,
    /// Undo a previous local install
    LocalRevert,
}

/// Everything one archive run needs to know about the workspace
///
/// Built before the run starts and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRequest {
    pub mode: ArchiveMode,
    /// Extra excluded entries, on top of the default transient directories
    pub excluded_paths: BTreeSet<String>,
    pub workspace_root: PathBuf,
    pub app_name: String,
    pub app_version: String,
}

impl ArchiveRequest {
    pub fn new(
        mode: ArchiveMode,
        workspace_root: &Path,
        app_name: impl Into<String>,
        app_version: impl Into<String>,
    ) -> Self {
        Self {
            mode,
            excluded_paths: BTreeSet::new(),
            workspace_root: workspace_root.to_path_buf(),
            app_name: app_name.into(),
            app_version: app_version.into(),
        }
    }

    /// Add excluded entries
    pub fn exclude<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_paths.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// `<app>-<version>`
    pub fn archive_name(&self) -> String {
        format!("{}-{}", self.app_name, self.app_version)
    }
}

/// Paths owned by one in-flight Full Archive run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingContext {
    /// `<root>/tmp`
    pub staging_root: PathBuf,
    /// `<root>/tmp/<app>-<version>`
    pub target_dir: PathBuf,
    /// Intermediate copy, only for copiers without native exclusion support
    pub temp_copy_dir: Option<PathBuf>,
    /// `<root>/tmp/<app>-<version>.<ext>`
    pub artifact: PathBuf,
    /// `<app>-<version>`
    pub archive_name: String,
}

impl StagingContext {
    pub fn new(request: &ArchiveRequest, extension: &str, uses_intermediate: bool) -> Self {
        let root = &request.workspace_root;
        let archive_name = request.archive_name();

        Self {
            staging_root: tmp_dir(root),
            target_dir: staged_dir(root, &archive_name),
            temp_copy_dir: uses_intermediate
                .then(|| intermediate_copy_dir(root, &request.app_name)),
            artifact: artifact_path(root, &archive_name, extension),
            archive_name,
        }
    }

    /// Remove leftovers of a previous failed run
    pub fn clear_stale(&self) -> BalerResult<Vec<PathBuf>> {
        let mut cleared = Vec::new();
        let candidates = self
            .temp_copy_dir
            .iter()
            .chain([&self.target_dir, &self.artifact]);

        for path in candidates {
            if remove_path(path)? {
                cleared.push(path.clone());
            }
        }

        Ok(cleared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_request_archive_name_and_excludes() {
        let request = ArchiveRequest::new(
            ArchiveMode::FullArchive,
            Path::new("/w/myapp"),
            "myapp",
            "1.2.0",
        )
            .exclude(["simulation", "log"])
            .exclude(vec!["log".to_string()]);

        assert_eq!(request.archive_name(), "myapp-1.2.0");
        assert_eq!(request.excluded_paths.len(), 2);
    }

    #[test]
    fn test_context_layout() {
        let request = ArchiveRequest::new(
            ArchiveMode::FullArchive,
            Path::new("/w/myapp"),
            "myapp",
            "1.2.0",
        );

        let ctx = StagingContext::new(&request, "tar.gz", true);
        assert_eq!(ctx.staging_root, PathBuf::from("/w/myapp/tmp"));
        assert_eq!(ctx.target_dir, PathBuf::from("/w/myapp/tmp/myapp-1.2.0"));
        assert_eq!(ctx.artifact, PathBuf::from("/w/myapp/tmp/myapp-1.2.0.tar.gz"));
        assert_eq!(ctx.temp_copy_dir, Some(PathBuf::from("/w/myapp_copy")));

        let ctx = StagingContext::new(&request, "tar.gz", false);
        assert_eq!(ctx.temp_copy_dir, None);
    }

    #[test]
    fn test_clear_stale() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("myapp");
        let request = ArchiveRequest::new(ArchiveMode::FullArchive, &root, "myapp", "1.2.0");
        let ctx = StagingContext::new(&request, "tar.gz", true);

        fs::create_dir_all(ctx.target_dir.join("old")).unwrap();
        fs::write(&ctx.artifact, "stale").unwrap();
        fs::create_dir_all(ctx.temp_copy_dir.as_ref().unwrap()).unwrap();
        fs::write(ctx.staging_root.join("unrelated.txt"), "keep").unwrap();

        let cleared = ctx.clear_stale().unwrap();

        assert_eq!(cleared.len(), 3);
        assert!(!ctx.target_dir.exists());
        assert!(!ctx.artifact.exists());
        assert!(ctx.staging_root.join("unrelated.txt").exists());
    }
}
