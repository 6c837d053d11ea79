//! Error types for the build pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while assembling, refining, or converting a table.
#[derive(Debug, Error)]
pub enum EtlError {
    /// A fragment file could not be read.
    #[error("cannot read fragment {path}: {source}")]
    Fragment {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A body fragment is not valid UTF-8.
    #[error("fragment {path} is not valid UTF-8 (byte offset {offset})")]
    Encoding { path: PathBuf, offset: usize },

    /// An entry violates the table's own definition.
    #[error("entry {code:?} -> {phrase:?} violates the definition: {message}")]
    Validation {
        code: String,
        phrase: String,
        message: String,
    },

    /// An error propagated from `std::io`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error propagated from the core domain layer.
    #[error("table error: {0}")]
    Core(#[from] imtable_core::Error),
}

impl EtlError {
    /// Returns `true` when the error points at the table content rather
    /// than the environment (so retrying the build cannot help).
    pub fn is_content_error(&self) -> bool {
        matches!(
            self,
            Self::Encoding { .. } | Self::Validation { .. } | Self::Core(imtable_core::Error::Parse { .. })
        )
    }
}

/// Convenience alias for pipeline results.
pub type EtlResult<T> = std::result::Result<T, EtlError>;
