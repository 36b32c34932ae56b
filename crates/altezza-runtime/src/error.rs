#![forbid(unsafe_code)]

//! Runtime error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that end a program run.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Entering, reading, or writing the terminal failed.
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    /// The log file could not be opened.
    #[error("cannot open log file {}: {source}", path.display())]
    LogFile {
        /// Requested log path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
