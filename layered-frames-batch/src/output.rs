//! Per-frame output files.
//!
//! Each finished frame is written to its own file whose name carries the
//! frame id and a fingerprint of the settings that shaped it, e.g.
//! `frame-3.vn-c40-args.jsonl`. Runs with different settings can share a
//! directory without reading each other's frames.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use layered_frames::frame_cache;
use layered_frames::{Frame, InductionConfig, TokenTypeMode};
use tracing::debug;

use crate::errors::{BatchError, BatchResult};

/// The settings encoded in output file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    pub mode: TokenTypeMode,
    pub max_cluster_size: Option<usize>,
    pub extract_arguments: bool,
}

impl Fingerprint {
    pub fn of(config: &InductionConfig) -> Self {
        Self {
            mode: config.tokens.mode,
            max_cluster_size: config.tokens.max_cluster_size,
            extract_arguments: config.roles.extract_arguments,
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-", self.mode.short_name())?;
        match self.max_cluster_size {
            Some(size) => write!(f, "c{}", size)?,
            None => write!(f, "cany")?,
        }
        let args = if self.extract_arguments { "args" } else { "noargs" };
        write!(f, "-{}", args)
    }
}

/// A directory of finished frames, one file each.
#[derive(Debug, Clone)]
pub struct FrameOutputDir {
    root: PathBuf,
    suffix: String,
}

impl FrameOutputDir {
    pub fn new(root: impl Into<PathBuf>, fingerprint: Fingerprint) -> BatchResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| BatchError::io(&root, e))?;
        Ok(Self {
            root,
            suffix: format!(".{}.jsonl", fingerprint),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn file_name(&self, frame_id: u32) -> String {
        format!("frame-{}{}", frame_id, self.suffix)
    }

    pub fn path_for(&self, frame_id: u32) -> PathBuf {
        self.root.join(self.file_name(frame_id))
    }

    /// Write a frame next to its final name, then rename it into place.
    /// Readers never see a partial file and a later write replaces an
    /// earlier one.
    pub fn write_frame(&self, frame: &Frame) -> BatchResult<PathBuf> {
        let path = self.path_for(frame.id());
        let temp = self.root.join(format!(
            ".{}.{}.tmp",
            self.file_name(frame.id()),
            process::id()
        ));

        let line = frame_cache::to_cache_line(frame)?;
        let file = File::create(&temp).map_err(|e| BatchError::io(&temp, e))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", line).map_err(|e| BatchError::io(&temp, e))?;
        writer.flush().map_err(|e| BatchError::io(&temp, e))?;
        drop(writer);

        fs::rename(&temp, &path).map_err(|e| BatchError::io(&path, e))?;
        debug!(frame_id = frame.id(), path = %path.display(), "wrote frame");
        Ok(path)
    }

    /// Ids of the frames present with this directory's fingerprint, ascending.
    pub fn frame_ids(&self) -> BatchResult<Vec<u32>> {
        let entries = fs::read_dir(&self.root).map_err(|e| BatchError::io(&self.root, e))?;
        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| BatchError::io(&self.root, e))?;
            let name = entry.file_name();
            let id = name
                .to_str()
                .and_then(|name| name.strip_prefix("frame-"))
                .and_then(|rest| rest.strip_suffix(self.suffix.as_str()))
                .and_then(|id| id.parse::<u32>().ok());
            if let Some(id) = id {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    /// Load every frame present, ordered by id.
    pub fn load_frames(&self) -> BatchResult<Vec<Frame>> {
        self.load_frames_with_ids(&self.frame_ids()?)
    }

    /// Load the frames with the given ids, in that order.
    pub fn load_frames_with_ids(&self, ids: &[u32]) -> BatchResult<Vec<Frame>> {
        let mut frames = Vec::new();
        for &id in ids {
            frames.extend(frame_cache::load_frames(&self.path_for(id))?);
        }
        Ok(frames)
    }
}
