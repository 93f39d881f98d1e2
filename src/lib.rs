#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Unsupervised induction of event frames and their semantic roles.
//!
//! Frames (kidnapping, bombing, ...) are clusters of predicate tokens that
//! tend to occur in the same documents. Roles (perpetrator, victim,
//! instrument, ...) are clusters of the grammatical slots of those tokens
//! that are filled by similar arguments. Everything is learned from
//! precomputed corpus statistics; no annotated data is needed.
//!
//! ## Inputs
//!
//! - [`CorpusTables`] - document frequencies, argument counts, co-occurrence
//!   and coreference counts, loaded with [`CorpusTables::load_dir`]
//! - [`Lexicon`] - lexical categories of argument heads ([`WordListLexicon`])
//! - [`InductionConfig`] - every threshold, loadable from TOML
//!
//! ## Engine
//!
//! - [`AssociationScorer`] - token and slot association scores
//! - [`AgglomerativeClusterer`] - single-link clustering producing a merge
//!   history of [`MergeEvent`]s
//! - [`ClusterReconstructor`] - replays merge histories, optionally under a
//!   [`MergeGuard`] such as the [`ClashGuard`]
//! - [`SlotTypeClassifier`] - PERSON / LOCATION / EVENT / PHYSOBJECT / OTHER
//! - [`RoleInducer`] and [`RoleMaintenance`] - roles of one frame
//! - [`FrameInducer`] - the whole pipeline
//!
//! ## Example
//!
//! ```ignore
//! use layered_frames::{induce_all_frames, CorpusTables, InductionConfig, WordListLexicon};
//!
//! let tables = CorpusTables::load_dir("stats/".as_ref())?;
//! let lexicon = WordListLexicon::load("lexicon.toml".as_ref())?;
//! let frames = induce_all_frames(&tables, &lexicon, &InductionConfig::default());
//! for frame in &frames {
//!     for role in frame.roles() {
//!         println!("{} {:?}", role.role_type(), role.ranked_argument_heads());
//!     }
//! }
//! ```

mod association;
mod clustering;
mod config;
mod context;
mod errors;
mod frame;
mod frames;
mod guard;
mod lexicon;
mod maintenance;
mod pair_cache;
mod ranking;
mod reconstruct;
mod role_inducer;
mod slot_type;
mod tables;
mod token;

// One JSON line per frame
pub mod frame_cache;

pub use association::{count_cosine, AssociationScorer, SlotSimilarity};
pub use clustering::{AgglomerativeClusterer, ClusterParams, ForbiddenPairs, MergeEvent};
pub use config::{
    GuardConfig, InductionConfig, MaintenanceConfig, RoleConfig, ScoringConfig,
    TokenClusterConfig, TokenTypeMode,
};
pub use context::{InductionCache, InductionContext};
pub use errors::{FrameError, FrameResult};
pub use frame::{ArgumentScore, Frame, Role, TriggerToken};
pub use frames::{induce_all_frames, FrameInducer};
pub use guard::{has_clash, ClashGuard, ItemGuard};
pub use lexicon::{Lexicon, WordListLexicon};
pub use maintenance::RoleMaintenance;
pub use pair_cache::{ItemPair, PairScoreCache, SYNONYM_SCORE};
pub use ranking::rank_arguments;
pub use reconstruct::{ClusterReconstructor, MergeGuard, Reconstruction};
pub use role_inducer::{InductionReport, InductionStage, RoleInducer};
pub use slot_type::{SlotType, SlotTypeClassifier, TypeVotes};
pub use tables::{
    ArgumentTable, CooccurrenceTable, CorefTable, CorpusTables, DocFrequency, DomainTables,
    GeneralTables, TokenCounts,
};
pub use token::{Pos, Relation, Slot, Token};
