//! Core module re-exports.
//!
//! Errors, path layout and the subprocess boundary live in `baler-core`.

pub use baler_core::core::*;
pub use baler_core::*;

/// Workspace path layout.
pub mod path {
    pub use baler_core::core::path::*;
}
