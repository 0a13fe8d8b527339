use crate::core::path::binstub_path;
use crate::core::{BalerError, BalerResult};
use regex::Regex;
use std::fs;
use std::path::Path;

/// Confirm the workspace was generated by the expected boot bootstrap
///
/// Reads `<root>/lbin/<app>` and requires it to match the `marker` pattern.
/// Only reads; never touches the filesystem otherwise.
pub fn validate_boot_marker(root: &Path, app_name: &str, marker: &str) -> BalerResult<()> {
    let binstub = binstub_path(root, app_name);

    let content = fs::read(&binstub).map_err(|_| {
        BalerError::PreconditionFailed(format!(
            "boot marker {} was not found",
            binstub.display()
        ))
    })?;
    let content = String::from_utf8_lossy(&content);

    let pattern = Regex::new(marker)
        .map_err(|e| BalerError::Config(format!("Invalid boot marker pattern: {}", e)))?;

    if !pattern.is_match(&content) {
        return Err(BalerError::PreconditionFailed(format!(
            "{} was not generated by the current boot system",
            binstub.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MARKER: &str = "This file was generated by";

    fn write_binstub(root: &Path, content: &str) {
        fs::create_dir_all(root.join("lbin")).unwrap();
        fs::write(root.join("lbin").join("myapp"), content).unwrap();
    }

    #[test]
    fn test_valid_marker() {
        let temp = TempDir::new().unwrap();
        write_binstub(temp.path(), "#!/usr/bin/env ruby\n# This file was generated by Boot\n");
        assert!(validate_boot_marker(temp.path(), "myapp", MARKER).is_ok());
    }

    #[test]
    fn test_missing_marker_file() {
        let temp = TempDir::new().unwrap();
        let err = validate_boot_marker(temp.path(), "myapp", MARKER).unwrap_err();
        assert!(matches!(err, BalerError::PreconditionFailed(_)));
    }

    #[test]
    fn test_stale_marker_contents() {
        let temp = TempDir::new().unwrap();
        write_binstub(temp.path(), "#!/bin/sh\nexec ruby app.rb\n");
        let err = validate_boot_marker(temp.path(), "myapp", MARKER).unwrap_err();
        assert!(matches!(err, BalerError::PreconditionFailed(_)));
    }

    #[test]
    fn test_marker_is_a_pattern() {
        let temp = TempDir::new().unwrap();
        write_binstub(temp.path(), "# generated by Boot 3.1\n");
        assert!(validate_boot_marker(temp.path(), "myapp", r"generated by Boot \d+").is_ok());
        assert!(validate_boot_marker(temp.path(), "myapp", r"generated by Origin").is_err());
    }

    #[test]
    fn test_invalid_pattern_is_a_config_error() {
        let temp = TempDir::new().unwrap();
        write_binstub(temp.path(), "x\n");
        let err = validate_boot_marker(temp.path(), "myapp", "(").unwrap_err();
        assert!(matches!(err, BalerError::Config(_)));
    }
}
