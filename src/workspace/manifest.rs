use crate::core::path::MANIFEST_FILE;
use crate::core::{BalerError, BalerResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Application metadata read from `baler.yaml` at the workspace root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceManifest {
    /// Application name (also the name of the `lbin/<name>` entry point)
    pub name: String,
    /// Application version
    pub version: String,
    /// Extra top-level directories to leave out of the archive
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl WorkspaceManifest {
    /// Load the manifest from a workspace root
    pub fn load(workspace_root: &Path) -> BalerResult<Self> {
        let path = workspace_root.join(MANIFEST_FILE);
        let content = fs::read_to_string(&path).map_err(|e| {
            BalerError::Manifest(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parse and validate manifest YAML
    pub fn parse(content: &str) -> BalerResult<Self> {
        let manifest: WorkspaceManifest = serde_yaml::from_str(content).map_err(|e| {
            BalerError::Manifest(format!("Failed to parse {}: {}", MANIFEST_FILE, e))
        })?;

        check_component("name", &manifest.name)?;
        check_component("version", &manifest.version)?;

        Ok(manifest)
    }

    /// `<name>-<version>`, the staged directory and artifact stem
    pub fn archive_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }
}

/// `name` and `version` become a directory name under `tmp/`
fn check_component(field: &str, value: &str) -> BalerResult<()> {
    if value.trim().is_empty() {
        return Err(BalerError::Manifest(format!("{} must not be empty", field)));
    }
    if value.contains(['/', '\\']) {
        return Err(BalerError::Manifest(format!(
            "{} '{}' must not contain path separators",
            field, value
        )));
    }
    if value == "." || value == ".." {
        return Err(BalerError::Manifest(format!(
            "{} '{}' is not a valid directory name",
            field, value
        )));
    }
    Ok(())
}
