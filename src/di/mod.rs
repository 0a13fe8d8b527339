//! Dependency injection infrastructure for Baler
//!
//! Every external tool the archive workflow touches sits behind a trait, so
//! the workflow can be driven against mocks in tests.
//!
//! # Example (Production)
//! ```no_run
//! use baler::config::Config;
//! use baler::di::ServiceContainer;
//!
//! let container = ServiceContainer::new(Config::default());
//! # let _ = container;
//! ```

pub mod container;
pub mod mocks;
pub mod traits;

// Re-export key types
pub use container::ServiceContainer;
pub use traits::{CommandRunner, Compressor, WorkspaceCopier};
