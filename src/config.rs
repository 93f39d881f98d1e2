//! Induction configuration.
//!
//! Every threshold the engine uses lives here with its default. A config
//! file only needs the values it changes:
//!
//! ```toml
//! [tokens]
//! mode = "verbs"
//! max_cluster_size = 25
//!
//! [roles]
//! occurrence_floor = 10
//!
//! [scoring]
//! slot_similarity = "mean"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::association::SlotSimilarity;
use crate::errors::{FrameError, FrameResult};
use crate::slot_type::SlotType;
use crate::token::Pos;

/// Which parts of speech may become frame triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenTypeMode {
    Verbs,
    VerbsAndNouns,
    All,
}

impl TokenTypeMode {
    pub fn admits(self, pos: Pos) -> bool {
        match self {
            TokenTypeMode::Verbs => pos == Pos::Verb,
            TokenTypeMode::VerbsAndNouns => matches!(pos, Pos::Verb | Pos::Noun),
            TokenTypeMode::All => true,
        }
    }

    /// Short name used in output file fingerprints.
    pub fn short_name(self) -> &'static str {
        match self {
            TokenTypeMode::Verbs => "v",
            TokenTypeMode::VerbsAndNouns => "vn",
            TokenTypeMode::All => "all",
        }
    }
}

/// Association scoring parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Tokens seen in fewer documents get no token association
    pub min_token_docs: u32,
    /// Token pairs seen together fewer times get no token association
    pub min_joint_count: u32,
    /// PMI is scaled by `m / (m + damping)`, `m` the smaller document count
    pub damping: f64,
    pub slot_similarity: SlotSimilarity,
    /// Multiplier for two slots of the same predicate
    pub same_token_penalty: f64,
    /// Slot associations below this are reported as 0
    pub noise_floor: f64,
    /// Cap for domain-vs-general likelihood ratios
    pub max_likelihood_ratio: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_token_docs: 5,
            min_joint_count: 5,
            damping: 10.0,
            slot_similarity: SlotSimilarity::Max,
            same_token_penalty: 0.5,
            noise_floor: 0.1,
            max_likelihood_ratio: 15.0,
        }
    }
}

/// Frame (trigger token) clustering parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenClusterConfig {
    pub mode: TokenTypeMode,
    /// Only the most domain-specific tokens are clustered
    pub max_candidate_tokens: usize,
    pub min_initial_similarity: f64,
    pub min_clustering_score: f64,
    pub max_cluster_size: Option<usize>,
    /// Smaller clusters do not become frames
    pub min_frame_size: usize,
}

impl Default for TokenClusterConfig {
    fn default() -> Self {
        Self {
            mode: TokenTypeMode::VerbsAndNouns,
            max_candidate_tokens: 500,
            min_initial_similarity: 1.0,
            min_clustering_score: 0.6,
            max_cluster_size: Some(40),
            min_frame_size: 2,
        }
    }
}

/// Role induction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleConfig {
    /// Fixed occurrence floor; derived from the corpus size when unset
    pub occurrence_floor: Option<u32>,
    /// A slot's most frequent head must hold at least this share
    pub min_top_head_share: f64,
    pub min_initial_similarity: f64,
    pub min_clustering_score: f64,
    /// Slot types that are clustered into roles
    pub clustered_types: Vec<SlotType>,
    /// Heads inspected by the fast type compatibility check
    pub type_check_heads: usize,
    /// Compute ranked argument heads for roles
    pub extract_arguments: bool,
    pub max_ranked_arguments: usize,
}

impl Default for RoleConfig {
    fn default() -> Self {
        Self {
            occurrence_floor: None,
            min_top_head_share: 0.05,
            min_initial_similarity: 0.45,
            min_clustering_score: 0.45,
            clustered_types: vec![SlotType::Person, SlotType::PhysObject],
            type_check_heads: 5,
            extract_arguments: true,
            max_ranked_arguments: 100,
        }
    }
}

impl RoleConfig {
    /// The per-predicate occurrence floor: `10 + 30 * docs / 1000` unless
    /// fixed in the configuration.
    pub fn occurrence_floor(&self, corpus_docs: u32) -> u32 {
        self.occurrence_floor
            .unwrap_or_else(|| 10 + (30 * corpus_docs as u64 / 1000) as u32)
    }
}

/// Subject/object clash and divergence guard parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Heads whose relative frequencies differ by more than this ratio diverge
    pub ratio_threshold: f64,
    /// Heads below this probability mass on both sides are not compared
    pub min_head_mass: f64,
    /// Number of diverging heads that marks two clusters as different roles
    pub min_divergent_heads: usize,
    pub max_compared_heads: usize,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            ratio_threshold: 0.2,
            min_head_mass: 0.02,
            min_divergent_heads: 2,
            max_compared_heads: 10,
        }
    }
}

/// Post-induction role maintenance parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    pub merge_cutoff: f64,
    /// Roles with less pooled domain argument evidence are removed
    pub min_role_evidence: u64,
    pub add_cutoff: f64,
    /// Accept verb subject slots with any positive score under the cutoff
    pub accept_verb_subjects: bool,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            merge_cutoff: 0.3,
            min_role_evidence: 200,
            add_cutoff: 0.3,
            accept_verb_subjects: true,
        }
    }
}

/// Configuration for a full induction run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InductionConfig {
    pub scoring: ScoringConfig,
    pub tokens: TokenClusterConfig,
    pub roles: RoleConfig,
    pub guard: GuardConfig,
    pub maintenance: MaintenanceConfig,
}

impl InductionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> FrameResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| FrameError::io(path, e))?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    pub fn from_toml_str(content: &str, origin: &str) -> FrameResult<Self> {
        let config: InductionConfig = toml::from_str(content).map_err(|e| FrameError::Config {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        config.validated(origin)
    }

    /// Reject values that cannot work and clamp those that merely look odd.
    fn validated(mut self, origin: &str) -> FrameResult<Self> {
        if self.tokens.max_cluster_size == Some(0) {
            return Err(FrameError::Config {
                path: origin.to_string(),
                message: "tokens.max_cluster_size must be at least 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.scoring.same_token_penalty) {
            let clamped = self.scoring.same_token_penalty.clamp(0.0, 1.0);
            warn!(
                value = self.scoring.same_token_penalty,
                clamped, "scoring.same_token_penalty out of range"
            );
            self.scoring.same_token_penalty = clamped;
        }
        if self.guard.min_divergent_heads == 0 {
            warn!("guard.min_divergent_heads of 0 would stop on every clash, using 1");
            self.guard.min_divergent_heads = 1;
        }
        if self.roles.min_clustering_score <= 0.0 {
            warn!(
                value = self.roles.min_clustering_score,
                "roles.min_clustering_score must be positive, using default"
            );
            self.roles.min_clustering_score = RoleConfig::default().min_clustering_score;
        }
        Ok(self)
    }

    pub fn with_token_mode(mut self, mode: TokenTypeMode) -> Self {
        self.tokens.mode = mode;
        self
    }

    pub fn with_max_cluster_size(mut self, size: Option<usize>) -> Self {
        self.tokens.max_cluster_size = size;
        self
    }

    pub fn with_occurrence_floor(mut self, floor: u32) -> Self {
        self.roles.occurrence_floor = Some(floor);
        self
    }

    pub fn with_slot_similarity(mut self, strategy: SlotSimilarity) -> Self {
        self.scoring.slot_similarity = strategy;
        self
    }

    pub fn with_extract_arguments(mut self, extract: bool) -> Self {
        self.roles.extract_arguments = extract;
        self
    }

    pub fn with_min_role_evidence(mut self, floor: u64) -> Self {
        self.maintenance.min_role_evidence = floor;
        self
    }
}
