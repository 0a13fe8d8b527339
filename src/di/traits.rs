//! Trait definitions for dependency injection

use crate::archive::StagingContext;
use crate::core::BalerResult;
use crate::workspace::PathFilter;
use std::path::Path;

pub use baler_core::process::CommandRunner;

/// Strategy for producing the filtered copy of a workspace
///
/// Implementations are selected at startup by probing which tools exist.
pub trait WorkspaceCopier: Send + Sync {
    /// Short name used in log output
    fn name(&self) -> &'static str;

    /// Whether the copy goes through `StagingContext::temp_copy_dir`
    fn uses_intermediate(&self) -> bool;

    /// Copy `source` into `ctx.target_dir`, leaving out excluded paths
    fn copy_tree(&self, source: &Path, ctx: &StagingContext, filter: &PathFilter)
        -> BalerResult<()>;
}

/// Strategy for compressing the staged directory into the final artifact
pub trait Compressor: Send + Sync {
    /// Short name used in log output
    fn name(&self) -> &'static str;

    /// Compress `staging_root/dir_name` into `artifact`, with `dir_name` as
    /// the single top-level entry
    fn compress(&self, staging_root: &Path, dir_name: &str, artifact: &Path) -> BalerResult<()>;
}
