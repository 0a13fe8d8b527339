//! Core utilities shared by the Baler binary and library.
//!
//! Holds the error type, workspace path layout and the structured
//! subprocess boundary every archive stage goes through.

pub mod core {
    pub mod error;
    pub mod error_help;
    pub mod path;

    pub use error::{BalerError, BalerResult};
    pub use error_help::{format_error_with_help, ErrorHelp};
}

pub mod process;

pub use crate::core::{format_error_with_help, BalerError, BalerResult, ErrorHelp};
pub use process::{CommandRunner, Invocation, RunStatus, SystemRunner};
