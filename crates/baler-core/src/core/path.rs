use crate::core::error::{BalerError, BalerResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the workspace manifest file.
pub const MANIFEST_FILE: &str = "baler.yaml";

/// Get the Baler home directory
///
/// Platform-specific locations:
/// - Windows: %APPDATA%\baler
/// - Linux: ~/.config/baler
/// - macOS: ~/Library/Application Support/baler
pub fn baler_home() -> BalerResult<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| BalerError::Path("Could not determine config directory".to_string()))?;
    Ok(config_dir.join("baler"))
}

/// Get the site config file path (`<baler home>/config.yaml`)
pub fn config_file() -> BalerResult<PathBuf> {
    Ok(baler_home()?.join("config.yaml"))
}

/// Boot marker generated by the application's bootstrap (`<root>/lbin/<app>`)
pub fn binstub_path(root: &Path, app_name: &str) -> PathBuf {
    root.join("lbin").join(app_name)
}

/// Workspace temporary directory (`<root>/tmp`), the staging root
pub fn tmp_dir(root: &Path) -> PathBuf {
    root.join("tmp")
}

/// Staged copy of the workspace (`<root>/tmp/<name>`)
pub fn staged_dir(root: &Path, name: &str) -> PathBuf {
    tmp_dir(root).join(name)
}

/// Final artifact (`<root>/tmp/<name>.<ext>`)
pub fn artifact_path(root: &Path, name: &str, extension: &str) -> PathBuf {
    tmp_dir(root).join(format!("{}.{}", name, extension))
}

/// Intermediate copy used when no native copy-with-exclude tool exists
/// (`<root>/../<app>_copy`)
pub fn intermediate_copy_dir(root: &Path, app_name: &str) -> PathBuf {
    let parent = root.parent().unwrap_or(root);
    parent.join(format!("{}_copy", app_name))
}

/// Find the workspace root by looking for baler.yaml in `start` or its parents
pub fn find_workspace_root(start: &Path) -> BalerResult<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(MANIFEST_FILE).exists() {
            return Ok(current);
        }

        if let Some(parent) = current.parent() {
            current = parent.to_path_buf();
        } else {
            return Err(BalerError::Path(format!(
                "Could not find {} in current directory or parents",
                MANIFEST_FILE
            )));
        }
    }
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> BalerResult<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Remove a file, symlink or directory tree if it exists.
///
/// Symlinks are unlinked, never followed. Returns whether anything was removed.
pub fn remove_path(path: &Path) -> BalerResult<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(true)
}

/// Expand a leading `~` to the user's home directory
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_workspace_root() {
        let temp = TempDir::new().unwrap();
        let workspace = temp.path().join("myapp");
        fs::create_dir_all(workspace.join("src")).unwrap();
        fs::write(workspace.join(MANIFEST_FILE), "name: myapp\nversion: 1.0.0\n").unwrap();

        let found = find_workspace_root(&workspace.join("src")).unwrap();
        assert_eq!(found, workspace);
    }

    #[test]
    fn test_layout_paths() {
        let root = Path::new("/work/myapp");
        assert_eq!(binstub_path(root, "myapp"), Path::new("/work/myapp/lbin/myapp"));
        assert_eq!(
            staged_dir(root, "myapp-1.2.0"),
            Path::new("/work/myapp/tmp/myapp-1.2.0")
        );
        assert_eq!(
            artifact_path(root, "myapp-1.2.0", "tar.gz"),
            Path::new("/work/myapp/tmp/myapp-1.2.0.tar.gz")
        );
        assert_eq!(
            intermediate_copy_dir(root, "myapp"),
            Path::new("/work/myapp_copy")
        );
    }

    #[test]
    fn test_remove_path_handles_files_dirs_and_missing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("dir");
        fs::create_dir_all(dir.join("nested")).unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        assert!(remove_path(&dir).unwrap());
        assert!(remove_path(&file).unwrap());
        assert!(!remove_path(&temp.path().join("missing")).unwrap());
        assert!(!dir.exists());
        assert!(!file.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_remove_path_unlinks_symlink_without_following() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("target");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("keep.txt"), "x").unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        assert!(remove_path(&link).unwrap());
        assert!(!link.exists());
        assert!(target.join("keep.txt").exists());
    }

    #[test]
    fn test_ensure_dir() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("a").join("b");

        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/opt/gems"), PathBuf::from("/opt/gems"));
    }
}
