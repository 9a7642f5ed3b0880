//! Error types for moira-sync.

use std::path::PathBuf;

use thiserror::Error;

use moira_api::ApiError;
use moira_core::DocumentError;

/// All errors that can arise from dump and apply runs.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error talking to the Moira API.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// A local document could not be parsed or rendered.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} does not exist")]
    FileMissing { path: PathBuf },

    #[error("{path} is not a file")]
    NotAFile { path: PathBuf },

    #[error("{path} is not a directory")]
    NotADirectory { path: PathBuf },
}

impl SyncError {
    /// `true` for errors raised by path checks before any work starts.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            SyncError::FileMissing { .. } | SyncError::NotAFile { .. } | SyncError::NotADirectory { .. }
        )
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
