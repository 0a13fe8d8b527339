//! Baler: packages an application workspace together with its vendored
//! dependencies into a single offline-deployable archive.
//!
//! Errors, path layout and the subprocess boundary come from `baler-core`;
//! this crate adds the archive workflow on top.

pub use baler_core::process::{CommandRunner, Invocation, RunStatus, SystemRunner};
pub use baler_core::{format_error_with_help, BalerError, BalerResult, ErrorHelp};

/// Core module re-exported from baler-core.
pub mod core;

/// Site-wide configuration.
pub mod config;

/// Dependency injection infrastructure.
pub mod di;

/// Workspace manifest, exclusion rules and snapshots.
pub mod workspace;

/// Dependency vendoring.
pub mod vendor;

/// Archive compression.
pub mod package;

/// Archive workflow state machine.
pub mod archive;

/// Email notifications.
pub mod mailer;
