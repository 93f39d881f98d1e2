//! Error types for frame induction.
//!
//! Only malformed inputs are errors. Missing statistics, empty clustering
//! inputs and degenerate ratios are handled in place by the engine and never
//! surface here.

use std::io;

use thiserror::Error;

/// Errors that can occur while loading inputs or the frame cache.
#[derive(Debug, Error)]
pub enum FrameError {
    /// A precomputed statistics table could not be parsed.
    #[error("malformed table {source_name} at line {line}: {message}")]
    Table {
        source_name: String,
        line: usize,
        message: String,
    },

    /// The configuration (or lexicon) file could not be read or parsed.
    #[error("invalid configuration {path}: {message}")]
    Config { path: String, message: String },

    /// A file could not be read or written.
    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A frame cache line could not be decoded.
    #[error("unreadable frame cache line {line}: {message}")]
    Cache { line: usize, message: String },

    /// A token or slot key did not have the expected shape.
    #[error("cannot parse {input:?}: {message}")]
    Parse { input: String, message: String },
}

impl FrameError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: io::Error) -> Self {
        FrameError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

/// Result type for frame induction operations.
pub type FrameResult<T> = Result<T, FrameError>;
