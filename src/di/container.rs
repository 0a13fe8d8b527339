//! Service container for dependency injection

use super::traits::{CommandRunner, Compressor, WorkspaceCopier};
use crate::config::Config;
use crate::package::packager::select_compressor;
use crate::workspace::snapshot::select_copier;
use baler_core::process::SystemRunner;
use std::sync::Arc;

/// Service container for dependency injection
///
/// Holds the explicit configuration and every external-tool seam used by an
/// archive run, as trait objects so tests can swap in mocks.
///
/// # Example (Production)
///
/// ```no_run
/// use baler::config::Config;
/// use baler::di::ServiceContainer;
///
/// let container = ServiceContainer::new(Config::default());
/// println!("Copying with {}", container.copier().name());
/// ```
///
/// # Example (Testing)
///
/// ```
/// use baler::config::Config;
/// use baler::di::{mocks::MockCommandRunner, ServiceContainer};
/// use baler::package::packager::NativeTarGz;
/// use baler::workspace::snapshot::NativeCopier;
/// use std::sync::Arc;
///
/// let container = ServiceContainer::with_providers(
///     Arc::new(Config::default()),
///     Arc::new(MockCommandRunner::new()),
///     Arc::new(NativeCopier),
///     Arc::new(NativeTarGz),
/// );
/// assert_eq!(container.compressor().name(), "native tar.gz");
/// ```
#[derive(Clone)]
pub struct ServiceContainer {
    pub config: Arc<Config>,
    pub runner: Arc<dyn CommandRunner>,
    pub copier: Arc<dyn WorkspaceCopier>,
    pub compressor: Arc<dyn Compressor>,
}

impl ServiceContainer {
    /// Create a container with production implementations
    ///
    /// Probes the PATH once: `rsync` selects the rsync copier and `tar` the
    /// tar command compressor; otherwise the in-process fallbacks are used.
    pub fn new(config: Config) -> Self {
        let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);

        Self {
            config: Arc::new(config),
            copier: select_copier(runner.clone()),
            compressor: select_compressor(runner.clone()),
            runner,
        }
    }

    /// Create a container with custom provider implementations
    pub fn with_providers(
        config: Arc<Config>,
        runner: Arc<dyn CommandRunner>,
        copier: Arc<dyn WorkspaceCopier>,
        compressor: Arc<dyn Compressor>,
    ) -> Self {
        Self {
            config,
            runner,
            copier,
            compressor,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        self.config.as_ref()
    }

    /// Get the command runner
    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    /// Get the workspace copier
    pub fn copier(&self) -> &dyn WorkspaceCopier {
        self.copier.as_ref()
    }

    /// Get the compressor
    pub fn compressor(&self) -> &dyn Compressor {
        self.compressor.as_ref()
    }
}
