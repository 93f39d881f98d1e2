//! Inducing frames from predicate tokens, then their roles.

use tracing::{debug, info};

use crate::clustering::{AgglomerativeClusterer, ClusterParams, ForbiddenPairs};
use crate::config::InductionConfig;
use crate::context::{InductionCache, InductionContext};
use crate::frame::{sort_triggers, Frame, TriggerToken};
use crate::lexicon::Lexicon;
use crate::maintenance::RoleMaintenance;
use crate::pair_cache::PairScoreCache;
use crate::reconstruct::ClusterReconstructor;
use crate::role_inducer::{InductionReport, RoleInducer};
use crate::tables::CorpusTables;
use crate::token::Token;

/// Induce every frame and its roles with a fresh cache.
pub fn induce_all_frames(
    tables: &CorpusTables,
    lexicon: &dyn Lexicon,
    config: &InductionConfig,
) -> Vec<Frame> {
    let ctx = InductionContext::new(tables, lexicon, config);
    let mut cache = InductionCache::new();
    FrameInducer::new(&ctx).induce_all_frames(&mut cache)
}

/// Clusters trigger tokens into frames and drives role induction.
pub struct FrameInducer<'c, 'a> {
    ctx: &'c InductionContext<'a>,
}

impl<'c, 'a> FrameInducer<'c, 'a> {
    pub fn new(ctx: &'c InductionContext<'a>) -> Self {
        Self { ctx }
    }

    /// Tokens eligible as triggers, in canonical order.
    ///
    /// Only the `max_candidate_tokens` most domain-specific tokens of the
    /// admitted parts of speech are kept.
    pub fn candidate_tokens(&self) -> Vec<Token> {
        let config = self.ctx.config;
        let doc_freq = &self.ctx.tables.domain.doc_freq;
        let cap = config.scoring.max_likelihood_ratio;

        let mut ranked: Vec<(&Token, f64)> = doc_freq
            .tokens()
            .into_iter()
            .filter(|token| config.tokens.mode.admits(token.pos()))
            .filter(|token| doc_freq.docs(token) >= config.scoring.min_token_docs)
            .map(|token| (token, self.ctx.tables.likelihood_ratio(token).min(cap)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(config.tokens.max_candidate_tokens);

        let mut tokens: Vec<Token> = ranked.into_iter().map(|(t, _)| t.clone()).collect();
        tokens.sort();
        tokens
    }

    /// Cluster candidate tokens into frames without roles.
    pub fn cluster_tokens(&self) -> Vec<Frame> {
        let tokens = self.candidate_tokens();
        let scorer = self.ctx.scorer();
        let domain = &self.ctx.tables.domain;

        let mut scores = PairScoreCache::new();
        for (i, a) in tokens.iter().enumerate() {
            for (j, b) in tokens.iter().enumerate().skip(i + 1) {
                let score = scorer.token_association(a, b, &domain.cooccurrence, &domain.doc_freq);
                if score > 0.0 {
                    scores.insert_max(i, j, score);
                }
                if self.ctx.lexicon.are_synonyms(a, b) {
                    scores.boost_synonym(i, j);
                }
            }
        }

        let settings = &self.ctx.config.tokens;
        let clusterer = AgglomerativeClusterer::new(ClusterParams {
            min_initial_similarity: settings.min_initial_similarity,
            min_clustering_score: settings.min_clustering_score,
            max_cluster_size: settings.max_cluster_size,
        });
        let history = clusterer.cluster(tokens.len(), &scores, &ForbiddenPairs::new());
        let clusters = ClusterReconstructor::new(tokens.len()).unconstrained(&history);

        let frames: Vec<Frame> = clusters
            .into_iter()
            .filter(|cluster| cluster.len() >= settings.min_frame_size.max(1))
            .enumerate()
            .map(|(id, cluster)| {
                let members: Vec<&Token> = cluster.iter().map(|&i| &tokens[i]).collect();
                let mut triggers: Vec<TriggerToken> = members
                    .iter()
                    .map(|token| TriggerToken {
                        token: (*token).clone(),
                        score: self.mean_association(token, &members),
                    })
                    .collect();
                sort_triggers(&mut triggers);
                Frame::new(id as u32, triggers)
            })
            .collect();

        info!(
            candidates = tokens.len(),
            merges = history.len(),
            frames = frames.len(),
            "clustered trigger tokens"
        );
        frames
    }

    /// Mean token association of `token` with every other member of
    /// `triggers`.
    fn mean_association(&self, token: &Token, triggers: &[&Token]) -> f64 {
        let scorer = self.ctx.scorer();
        let domain = &self.ctx.tables.domain;
        let others: Vec<&&Token> = triggers.iter().filter(|t| **t != token).collect();
        if others.is_empty() {
            return 0.0;
        }
        let sum: f64 = others
            .iter()
            .map(|other| scorer.token_association(token, other, &domain.cooccurrence, &domain.doc_freq))
            .sum();
        sum / others.len() as f64
    }

    /// Induce roles for one frame, then merge, prune and complete them.
    pub fn induce_frame_roles(&self, frame: &mut Frame, cache: &mut InductionCache) -> InductionReport {
        let report = RoleInducer::new(self.ctx).induce(frame, cache);
        let maintenance = RoleMaintenance::new(self.ctx);
        let merged = maintenance.merge_roles(frame, self.ctx.config.maintenance.merge_cutoff, cache);
        let removed = maintenance.remove_roles(frame);
        let forced = maintenance.force_triggers_into_slots(frame, cache);
        debug!(
            frame_id = frame.id(),
            merged,
            removed,
            forced,
            roles = frame.roles().len(),
            "maintained roles"
        );
        report
    }

    /// Cluster tokens into frames and induce every frame's roles.
    pub fn induce_all_frames(&self, cache: &mut InductionCache) -> Vec<Frame> {
        let mut frames = self.cluster_tokens();
        for frame in &mut frames {
            self.induce_frame_roles(frame, cache);
        }
        frames
    }

    /// How strongly a token is associated with each frame, as a probability
    /// distribution over frame ids. `None` when it is associated with none.
    pub fn frame_distribution(&self, token: &Token, frames: &[Frame]) -> Option<Vec<(u32, f64)>> {
        let weights: Vec<(u32, f64)> = frames
            .iter()
            .map(|frame| {
                let triggers: Vec<&Token> = frame.trigger_tokens().collect();
                (frame.id(), self.mean_association(token, &triggers))
            })
            .collect();
        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            return None;
        }
        Some(weights.into_iter().map(|(id, w)| (id, w / total)).collect())
    }
}
