use std::{error::Error, path::Path};
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Failure of a file-backed collaborator, whatever the underlying cause.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing file could not be read, decoded or written.
    #[error("storage unavailable: {action} `{path}`")]
    Unavailable {
        /// What the backend was doing, e.g. `reading roster`.
        action: &'static str,
        /// File involved.
        path: String,
        /// Underlying I/O or decoding failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Wrap a failure that happened while performing `action` on `path`.
    pub fn unavailable(
        action: &'static str,
        path: &Path,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        StorageError::Unavailable {
            action,
            path: path.display().to_string(),
            source: Box::new(source),
        }
    }
}
