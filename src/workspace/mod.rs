pub mod filter;
pub mod manifest;
pub mod marker;
pub mod snapshot;

pub use filter::{is_excluded, PathFilter, DEFAULT_EXCLUDED_DIRS};
pub use manifest::WorkspaceManifest;
pub use marker::validate_boot_marker;
pub use snapshot::Snapshotter;
