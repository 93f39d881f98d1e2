//! Error types for batch induction.

use std::io;
use std::path::Path;
use std::time::Duration;

use layered_frames::FrameError;
use thiserror::Error;

/// Errors that can occur while claiming, writing or collecting frames.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The core engine failed to read or write a frame.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// A claim marker or output file could not be created.
    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Not every frame file appeared before the wait limit.
    #[error("gave up after {waited:?}: {found} of {expected} frame files present")]
    Timeout {
        expected: usize,
        found: usize,
        waited: Duration,
    },

    /// The wait was cancelled through its flag.
    #[error("wait for frame files cancelled")]
    Cancelled,
}

impl BatchError {
    pub(crate) fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        BatchError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

/// Result type for batch operations.
pub type BatchResult<T> = Result<T, BatchError>;
