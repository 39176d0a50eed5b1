use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenameError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("source file does not exist: {}", .0.display())]
    SourceMissing(PathBuf),
    #[error("failed to rename {} -> {}: {cause}", .from.display(), .to.display())]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        cause: io::Error,
    },
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl RenameError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }
}

pub type RenameResult<T> = Result<T, RenameError>;
