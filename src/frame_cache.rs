//! Line-oriented persistence of finished frames.
//!
//! One frame per line, as a JSON object:
//!
//! ```text
//! {"id":3,"tokens":[{"token":"v-kidnap","score":1.5}],"roles":[{"role_type":"PERSON","slots":["v-kidnap:o"],"arguments":[{"head":"mayor","score":0.75}]}]}
//! ```
//!
//! Floats are written with enough precision to reload bit-identical values,
//! so a reloaded cache compares equal to the frames that were saved.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::errors::{FrameError, FrameResult};
use crate::frame::Frame;

/// Encode one frame as a single cache line (no trailing newline).
pub fn to_cache_line(frame: &Frame) -> FrameResult<String> {
    serde_json::to_string(frame).map_err(|e| FrameError::Cache {
        line: 0,
        message: e.to_string(),
    })
}

/// Decode one cache line. `line` is only used for error reporting.
pub fn from_cache_line(text: &str, line: usize) -> FrameResult<Frame> {
    serde_json::from_str(text).map_err(|e| FrameError::Cache {
        line,
        message: e.to_string(),
    })
}

/// Write frames, one line each.
pub fn write_frames<W: Write>(mut writer: W, frames: &[Frame], target: &str) -> FrameResult<()> {
    for frame in frames {
        let line = to_cache_line(frame)?;
        writeln!(writer, "{}", line).map_err(|e| FrameError::io(target, e))?;
    }
    writer.flush().map_err(|e| FrameError::io(target, e))
}

/// Read every frame of a cache. Blank lines are skipped; any other
/// unreadable line fails the whole read.
pub fn read_frames<R: BufRead>(reader: R, source: &str) -> FrameResult<Vec<Frame>> {
    let mut frames = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| FrameError::io(source, e))?;
        if line.trim().is_empty() {
            continue;
        }
        frames.push(from_cache_line(&line, idx + 1)?);
    }
    Ok(frames)
}

pub fn save_frames(path: &Path, frames: &[Frame]) -> FrameResult<()> {
    let file = File::create(path).map_err(|e| FrameError::io(path, e))?;
    write_frames(BufWriter::new(file), frames, &path.display().to_string())?;
    debug!(path = %path.display(), frames = frames.len(), "saved frame cache");
    Ok(())
}

pub fn load_frames(path: &Path) -> FrameResult<Vec<Frame>> {
    let file = File::open(path).map_err(|e| FrameError::io(path, e))?;
    read_frames(BufReader::new(file), &path.display().to_string())
}
