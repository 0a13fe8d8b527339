//! Operator hints attached to errors when they reach the terminal.

use crate::core::error::BalerError;

/// Provides a follow-up suggestion for an error, if one is known.
pub trait ErrorHelp {
    fn help(&self) -> Option<String>;
}

impl ErrorHelp for BalerError {
    fn help(&self) -> Option<String> {
        match self {
            BalerError::PreconditionFailed(_) => Some(
                "An archive can only be created after your application is running the \
                 latest boot system.\n\
                 Run the application's setup command to update it (e.g. `<app> setup`) \
                 and then try again."
                    .to_string(),
            ),
            BalerError::CopyFailed(_) => Some(
                "Check that the workspace is readable and that there is enough free space \
                 under tmp/."
                    .to_string(),
            ),
            BalerError::DependencyPackagingFailed(_) => Some(
                "Make sure the dependency manager can resolve every dependency with network \
                 access, then re-run the archive."
                    .to_string(),
            ),
            BalerError::BootValidationFailed(_) => Some(
                "The vendored tree could not boot the application. Run the application's \
                 `-v` check in the workspace to see the underlying error."
                    .to_string(),
            ),
            BalerError::InstallFailed(_) => Some(
                "Installing from the lockfile failed. Inspect the dependency manager output above."
                    .to_string(),
            ),
            BalerError::CompressionFailed(_) => Some(
                "The staged directory was kept under tmp/ for inspection.".to_string(),
            ),
            BalerError::RevertFailed(_) => Some(
                "The vendor directory was removed but the application did not boot. \
                 Re-install dependencies with the dependency manager."
                    .to_string(),
            ),
            BalerError::Manifest(_) => Some(
                "Create a baler.yaml with `name` and `version` at the workspace root.".to_string(),
            ),
            _ => None,
        }
    }
}

/// Format an error message, appending its help text when available.
pub fn format_error_with_help(error: &BalerError) -> String {
    match error.help() {
        Some(help) => format!("Error: {}\n\n  Help: {}", error, help),
        None => format!("Error: {}", error),
    }
}
