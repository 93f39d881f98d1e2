//! Waiting for workers and running a whole batch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use layered_frames::{Frame, FrameInducer, InductionCache, InductionContext};
use tracing::{debug, info};

use crate::claims::WorkClaims;
use crate::errors::{BatchError, BatchResult};
use crate::output::FrameOutputDir;
use crate::worker::{RoleWorker, WorkOutcome};

/// How often and how long to poll the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub max_wait: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_wait: Duration::from_secs(6 * 60 * 60),
        }
    }
}

/// Poll until the files of frames `0..expected` exist, then load them.
/// Files of other frame ids (left over from an earlier run) are ignored.
///
/// Fails with [`BatchError::Timeout`] once `max_wait` has passed and with
/// [`BatchError::Cancelled`] as soon as `cancel` is set.
pub fn wait_for_frames(
    output: &FrameOutputDir,
    expected: usize,
    options: &PollOptions,
    cancel: &AtomicBool,
) -> BatchResult<Vec<Frame>> {
    let started = Instant::now();
    loop {
        if cancel.load(Ordering::Relaxed) {
            return Err(BatchError::Cancelled);
        }
        let ids: Vec<u32> = output
            .frame_ids()?
            .into_iter()
            .filter(|&id| (id as usize) < expected)
            .collect();
        let found = ids.len();
        if found >= expected {
            info!(found, waited = ?started.elapsed(), "all frame files present");
            return output.load_frames_with_ids(&ids);
        }

        let waited = started.elapsed();
        if waited >= options.max_wait {
            return Err(BatchError::Timeout {
                expected,
                found,
                waited,
            });
        }
        debug!(found, expected, "waiting for frame files");
        thread::sleep(options.interval.min(options.max_wait - waited));
    }
}

/// Cluster tokens into frames, induce the roles of every frame this process
/// can claim, then wait for the rest (claimed by other processes) to appear.
pub fn run_batch(
    ctx: &InductionContext<'_>,
    claims: &dyn WorkClaims,
    output: &FrameOutputDir,
    options: &PollOptions,
    cancel: &AtomicBool,
) -> BatchResult<Vec<Frame>> {
    let frames = FrameInducer::new(ctx).cluster_tokens();
    let mut cache = InductionCache::new();
    let outcomes = RoleWorker::new(ctx, claims, output).process_all(&frames, &mut cache)?;
    let written = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, WorkOutcome::Written(_)))
        .count();
    info!(frames = frames.len(), written, "finished claimed frames");
    wait_for_frames(output, frames.len(), options, cancel)
}
