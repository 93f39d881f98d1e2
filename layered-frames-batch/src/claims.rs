//! Advisory work claims.
//!
//! A claim says "someone is inducing roles for frame N". Claims are never
//! released. Losing a race is not an error: two workers may both end up
//! inducing the same frame and the later output file replaces the earlier.

use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::errors::{BatchError, BatchResult};

/// Something that hands out at most one claim per frame id.
pub trait WorkClaims {
    /// Claim a frame. `Ok(false)` when it was already claimed.
    fn try_claim(&self, frame_id: u32) -> BatchResult<bool>;

    fn is_claimed(&self, frame_id: u32) -> bool;
}

/// Claims backed by marker files created with create-new semantics, so
/// independent processes sharing a directory see each other's claims.
#[derive(Debug, Clone)]
pub struct DirectoryClaims {
    dir: PathBuf,
}

impl DirectoryClaims {
    pub fn new(dir: impl Into<PathBuf>) -> BatchResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| BatchError::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn marker(&self, frame_id: u32) -> PathBuf {
        self.dir.join(format!("frame-{}.claim", frame_id))
    }
}

impl WorkClaims for DirectoryClaims {
    fn try_claim(&self, frame_id: u32) -> BatchResult<bool> {
        let marker = self.marker(frame_id);
        match OpenOptions::new().write(true).create_new(true).open(&marker) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!(frame_id, marker = %marker.display(), "frame already claimed");
                Ok(false)
            }
            Err(e) => Err(BatchError::io(&marker, e)),
        }
    }

    fn is_claimed(&self, frame_id: u32) -> bool {
        self.marker(frame_id).exists()
    }
}

/// Claims shared between threads of one process.
#[derive(Debug, Default)]
pub struct MemoryClaims {
    claimed: Mutex<BTreeSet<u32>>,
}

impl MemoryClaims {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WorkClaims for MemoryClaims {
    fn try_claim(&self, frame_id: u32) -> BatchResult<bool> {
        let mut claimed = self.claimed.lock().unwrap_or_else(|e| e.into_inner());
        Ok(claimed.insert(frame_id))
    }

    fn is_claimed(&self, frame_id: u32) -> bool {
        self.claimed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&frame_id)
    }
}
