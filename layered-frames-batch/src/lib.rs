//! Batch role induction for `layered-frames`.
//!
//! Role induction is independent per frame, so several processes can share
//! the work. Each one claims frames through a [`WorkClaims`] implementation,
//! induces the roles of the frames it won and writes them to a
//! [`FrameOutputDir`]. A coordinator waits with [`wait_for_frames`] until
//! every frame file is present.
//!
//! ```ignore
//! use std::sync::atomic::AtomicBool;
//! use layered_frames::{CorpusTables, InductionConfig, InductionContext, WordListLexicon};
//! use layered_frames_batch::{run_batch, DirectoryClaims, Fingerprint, FrameOutputDir, PollOptions};
//!
//! let tables = CorpusTables::load_dir("stats/".as_ref())?;
//! let lexicon = WordListLexicon::load("lexicon.toml".as_ref())?;
//! let config = InductionConfig::default();
//! let ctx = InductionContext::new(&tables, &lexicon, &config);
//!
//! let output = FrameOutputDir::new("out/frames", Fingerprint::of(&config))?;
//! let claims = DirectoryClaims::new("out/claims")?;
//! let frames = run_batch(&ctx, &claims, &output, &PollOptions::default(), &AtomicBool::new(false))?;
//! ```

mod claims;
mod coordinator;
mod errors;
mod output;
mod worker;

pub use claims::{DirectoryClaims, MemoryClaims, WorkClaims};
pub use coordinator::{run_batch, wait_for_frames, PollOptions};
pub use errors::{BatchError, BatchResult};
pub use output::{Fingerprint, FrameOutputDir};
pub use worker::{RoleWorker, WorkOutcome};

#[cfg(test)]
mod tests;
