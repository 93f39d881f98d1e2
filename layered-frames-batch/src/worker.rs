//! Role induction workers.

use std::path::PathBuf;

use layered_frames::{Frame, FrameInducer, InductionCache, InductionContext};
use tracing::info;

use crate::claims::WorkClaims;
use crate::errors::BatchResult;
use crate::output::FrameOutputDir;

/// What a worker did with one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkOutcome {
    /// Roles were induced and the frame written here.
    Written(PathBuf),
    /// Another worker holds the claim.
    ClaimedElsewhere,
}

/// Claims frames, induces their roles and writes them out.
pub struct RoleWorker<'w, 'a> {
    ctx: &'w InductionContext<'a>,
    claims: &'w dyn WorkClaims,
    output: &'w FrameOutputDir,
}

impl<'w, 'a> RoleWorker<'w, 'a> {
    pub fn new(
        ctx: &'w InductionContext<'a>,
        claims: &'w dyn WorkClaims,
        output: &'w FrameOutputDir,
    ) -> Self {
        Self {
            ctx,
            claims,
            output,
        }
    }

    /// Process one frame (as produced by token clustering) if it can be claimed.
    pub fn process(&self, frame: &Frame, cache: &mut InductionCache) -> BatchResult<WorkOutcome> {
        if !self.claims.try_claim(frame.id())? {
            info!(frame_id = frame.id(), "skipping frame claimed by another worker");
            return Ok(WorkOutcome::ClaimedElsewhere);
        }

        let mut frame = frame.clone();
        let report = FrameInducer::new(self.ctx).induce_frame_roles(&mut frame, cache);
        let path = self.output.write_frame(&frame)?;
        // the frame's slot scores are not needed again
        cache.discard_frame(frame.id());
        info!(
            frame_id = frame.id(),
            stage = ?report.stage,
            roles = frame.roles().len(),
            "induced frame roles"
        );
        Ok(WorkOutcome::Written(path))
    }

    /// Process every frame this worker manages to claim.
    pub fn process_all(
        &self,
        frames: &[Frame],
        cache: &mut InductionCache,
    ) -> BatchResult<Vec<WorkOutcome>> {
        frames.iter().map(|frame| self.process(frame, cache)).collect()
    }
}
