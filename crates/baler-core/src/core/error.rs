use thiserror::Error;

pub type BalerResult<T> = Result<T, BalerError>;

#[derive(Error, Debug)]
pub enum BalerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("WalkDir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Path error: {0}")]
    Path(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Mail error: {0}")]
    Mail(String),

    /// The workspace was not bootstrapped by the expected boot mechanism.
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Copy failed: {0}")]
    CopyFailed(String),

    #[error("Dependency packaging failed: {0}")]
    DependencyPackagingFailed(String),

    #[error("Boot validation failed: {0}")]
    BootValidationFailed(String),

    #[error("Install failed: {0}")]
    InstallFailed(String),

    /// The staged tree is left in place when this is raised.
    #[error("Compression failed: {0}")]
    CompressionFailed(String),

    #[error("Revert failed: {0}")]
    RevertFailed(String),
}

impl BalerError {
    /// True for the stage failures the archive workflow can report.
    pub fn is_stage_failure(&self) -> bool {
        matches!(
            self,
            Self::PreconditionFailed(_)
                | Self::CopyFailed(_)
                | Self::DependencyPackagingFailed(_)
                | Self::BootValidationFailed(_)
                | Self::InstallFailed(_)
                | Self::CompressionFailed(_)
                | Self::RevertFailed(_)
        )
    }
}
