//! Inducing the roles of one frame.
//!
//! Role induction runs in four steps, each recorded in the returned
//! [`InductionReport`]:
//!
//! 1. gather the slots of the frame's triggers (and nearby words) that occur
//!    often enough,
//! 2. filter slots with flat or sparse argument distributions,
//! 3. type the slots and cluster each clustered type separately, replaying
//!    the merges under the [`ClashGuard`],
//! 4. turn every cluster into a role with ranked argument heads.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::clustering::{AgglomerativeClusterer, ClusterParams, ForbiddenPairs};
use crate::context::{InductionCache, InductionContext};
use crate::frame::{Frame, Role};
use crate::guard::ClashGuard;
use crate::pair_cache::PairScoreCache;
use crate::ranking::rank_arguments;
use crate::reconstruct::ClusterReconstructor;
use crate::slot_type::SlotType;
use crate::token::{Slot, Token};

/// Furthest step a role induction run reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InductionStage {
    Empty,
    CandidatesGathered,
    Filtered,
    ClusteredPerType,
    RolesEmitted,
}

/// What happened while inducing one frame's roles.
#[derive(Debug, Clone, PartialEq)]
pub struct InductionReport {
    pub frame_id: u32,
    pub stage: InductionStage,
    /// Occurrence floor applied to tokens and slots
    pub occurrence_floor: u32,
    pub candidates: usize,
    pub filtered: usize,
    /// Surviving slots per type, clustered or not
    pub typed: BTreeMap<SlotType, usize>,
    pub clusters: usize,
    /// Clustered types whose replay was stopped by the guard
    pub guard_stops: usize,
    pub roles: usize,
}

impl InductionReport {
    fn new(frame_id: u32, occurrence_floor: u32) -> Self {
        Self {
            frame_id,
            stage: InductionStage::Empty,
            occurrence_floor,
            candidates: 0,
            filtered: 0,
            typed: BTreeMap::new(),
            clusters: 0,
            guard_stops: 0,
            roles: 0,
        }
    }
}

/// Induces roles for a frame from its trigger tokens.
pub struct RoleInducer<'c, 'a> {
    ctx: &'c InductionContext<'a>,
}

impl<'c, 'a> RoleInducer<'c, 'a> {
    pub fn new(ctx: &'c InductionContext<'a>) -> Self {
        Self { ctx }
    }

    fn occurrence_floor(&self) -> u32 {
        let corpus_docs = self.ctx.tables.domain.doc_freq.total_docs();
        self.ctx.config.roles.occurrence_floor(corpus_docs)
    }

    /// Replace the frame's roles with freshly induced ones.
    pub fn induce(&self, frame: &mut Frame, cache: &mut InductionCache) -> InductionReport {
        let frame_id = frame.id();
        let floor = self.occurrence_floor();
        let mut report = InductionReport::new(frame_id, floor);
        frame.set_roles(Vec::new());

        // Step 1: gather
        let mut tokens: Vec<Token> = frame.trigger_tokens().cloned().collect();
        for token in self.ctx.tables.nearby_words(frame_id) {
            if !tokens.contains(token) {
                tokens.push(token.clone());
            }
        }
        let candidates = self.gather_candidates(frame_id, &tokens);
        report.candidates = candidates.len();
        report.stage = InductionStage::CandidatesGathered;
        if candidates.is_empty() {
            debug!(frame_id, floor, "no slot reaches the occurrence floor");
            return report;
        }

        // Step 2: filter
        let survivors = self.filter_candidates(frame_id, candidates);
        report.filtered = survivors.len();
        report.stage = InductionStage::Filtered;
        if survivors.is_empty() {
            debug!(frame_id, "every candidate slot was filtered");
            return report;
        }

        // Step 3: partition by type and cluster
        let mut by_type: BTreeMap<SlotType, Vec<Slot>> = BTreeMap::new();
        for slot in survivors {
            let slot_type = cache.slot_type(self.ctx, frame_id, &slot);
            by_type.entry(slot_type).or_default().push(slot);
        }
        report.typed = by_type.iter().map(|(ty, slots)| (*ty, slots.len())).collect();

        let mut roles = Vec::new();
        for &slot_type in &self.ctx.config.roles.clustered_types {
            let items = match by_type.get(&slot_type) {
                Some(items) => items,
                None => continue,
            };
            let (clusters, stopped) = self.cluster_slots(frame_id, slot_type, items, cache);
            if stopped {
                report.guard_stops += 1;
            }
            report.clusters += clusters.len();
            roles.extend(
                clusters
                    .into_iter()
                    .map(|slots| Role::new(slot_type, slots)),
            );
        }
        report.stage = InductionStage::ClusteredPerType;

        // Step 4: emit
        if self.ctx.config.roles.extract_arguments {
            for role in &mut roles {
                let ranked = rank_arguments(self.ctx, frame_id, role.role_type(), role.slots());
                role.set_arguments(ranked);
            }
        }
        report.roles = roles.len();
        report.stage = InductionStage::RolesEmitted;
        frame.set_roles(roles);

        info!(
            frame_id,
            candidates = report.candidates,
            filtered = report.filtered,
            roles = report.roles,
            "induced roles"
        );
        report
    }

    /// Slots governed by `tokens` whose token occurs in at least
    /// occurrence-floor documents, in canonical order.
    ///
    /// Tokens missing from the document frequencies are measured by the
    /// summed argument counts of their slots instead.
    pub fn gather_candidates(&self, frame_id: u32, tokens: &[Token]) -> Vec<Slot> {
        let arguments = self.ctx.arguments_for(frame_id);
        let floor = self.occurrence_floor();
        let mut gathered = BTreeSet::new();
        for token in tokens {
            let slots = arguments.slots_of(token);
            let occurrences = match self.ctx.tables.domain.doc_freq.get(token) {
                Some(counts) => counts.docs as u64,
                None => slots.iter().map(|slot| arguments.total(slot)).sum(),
            };
            if occurrences < floor as u64 {
                debug!(%token, occurrences, floor, "token under occurrence floor");
                continue;
            }
            gathered.extend(slots.into_iter().cloned());
        }
        gathered.into_iter().collect()
    }

    /// Keep slots with enough observations whose most frequent head is not
    /// lost in the noise.
    pub fn filter_candidates(&self, frame_id: u32, candidates: Vec<Slot>) -> Vec<Slot> {
        let arguments = self.ctx.arguments_for(frame_id);
        let floor = self.occurrence_floor() as u64;
        let min_share = self.ctx.config.roles.min_top_head_share;
        candidates
            .into_iter()
            .filter(|slot| {
                let total = arguments.total(slot);
                if total == 0 || total < floor {
                    return false;
                }
                let top = arguments
                    .top_heads(slot, 1)
                    .first()
                    .map_or(0, |&(_, count)| count);
                top as f64 / total as f64 >= min_share
            })
            .collect()
    }

    /// Cluster the slots of one type into roles. Returns the clusters and
    /// whether the guard cut the merge history short.
    fn cluster_slots(
        &self,
        frame_id: u32,
        slot_type: SlotType,
        items: &[Slot],
        cache: &mut InductionCache,
    ) -> (Vec<Vec<Slot>>, bool) {
        let mut scores = PairScoreCache::new();
        let mut forbidden = ForbiddenPairs::new();
        for (i, a) in items.iter().enumerate() {
            for (j, b) in items.iter().enumerate().skip(i + 1) {
                let score = cache.slot_association(self.ctx, frame_id, slot_type, a, b);
                if score > 0.0 {
                    scores.insert(i, j, score);
                }
                if a.complement().as_ref() == Some(b) {
                    forbidden.insert(i, j);
                }
            }
        }

        let roles = &self.ctx.config.roles;
        let clusterer = AgglomerativeClusterer::new(ClusterParams {
            min_initial_similarity: roles.min_initial_similarity,
            min_clustering_score: roles.min_clustering_score,
            max_cluster_size: None,
        });
        let history = clusterer.cluster(items.len(), &scores, &forbidden);

        let guard = ClashGuard::new(
            self.ctx.arguments_for(frame_id),
            self.ctx.lexicon,
            slot_type,
            &self.ctx.config.guard,
        );
        let result =
            ClusterReconstructor::new(items.len()).constrained(&history, &guard.for_items(items));
        debug!(
            frame_id,
            %slot_type,
            items = items.len(),
            merges = history.len(),
            clusters = result.clusters.len(),
            "clustered slots"
        );

        let clusters = result
            .clusters
            .into_iter()
            .map(|cluster| cluster.into_iter().map(|i| items[i].clone()).collect())
            .collect();
        (clusters, result.stopped_at.is_some())
    }
}
