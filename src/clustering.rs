//! Single-link agglomerative clustering producing a merge history.
//!
//! The clusterer does not build clusters for its callers: it records which
//! pairs merged, in order, and leaves the interpretation of that history to
//! [`ClusterReconstructor`](crate::ClusterReconstructor).

use std::collections::HashSet;

use tracing::debug;

use crate::pair_cache::{ItemPair, PairScoreCache};

/// One step of a merge history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeEvent {
    /// Item in the first cluster
    pub a: usize,
    /// Item in the second cluster
    pub b: usize,
    /// Single-link score of the merge
    pub score: f64,
}

/// Pairs of items that are never merged with each other directly.
///
/// Only the edge between the two items is dropped. They can still meet in
/// one cluster through other members; catching that is left to the merge
/// guard of a constrained replay.
#[derive(Debug, Clone, Default)]
pub struct ForbiddenPairs {
    pairs: HashSet<ItemPair>,
}

impl ForbiddenPairs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, a: usize, b: usize) {
        if a != b {
            self.pairs.insert(ItemPair::new(a, b));
        }
    }

    pub fn contains(&self, a: usize, b: usize) -> bool {
        self.pairs.contains(&ItemPair::new(a, b))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Thresholds for [`AgglomerativeClusterer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterParams {
    /// Two singletons only merge at or above this score
    pub min_initial_similarity: f64,
    /// No merge happens below this score
    pub min_clustering_score: f64,
    /// Clustering stops as soon as a cluster reaches this size
    pub max_cluster_size: Option<usize>,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            min_initial_similarity: 0.45,
            min_clustering_score: 0.45,
            max_cluster_size: None,
        }
    }
}

/// Single-link hierarchical clustering over items `0..n`.
#[derive(Debug, Clone, Default)]
pub struct AgglomerativeClusterer {
    params: ClusterParams,
}

impl AgglomerativeClusterer {
    pub fn new(params: ClusterParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ClusterParams {
        &self.params
    }

    /// Run clustering and return the merge history.
    ///
    /// Each step merges the two clusters with the highest single-link score
    /// (the best score between any of their members) that are allowed to
    /// merge. Equal scores go to the pair with the lowest combined index,
    /// then the lowest first index, so the history is reproducible.
    pub fn cluster(
        &self,
        n: usize,
        scores: &PairScoreCache,
        forbidden: &ForbiddenPairs,
    ) -> Vec<MergeEvent> {
        let params = &self.params;
        let floor = params.min_clustering_score;

        // Step 1: candidate edges, best first
        let mut edges: Vec<(usize, usize, f64)> = scores
            .iter()
            .filter(|(pair, score)| {
                pair.second() < n
                    && *score > 0.0
                    && *score >= floor
                    && !forbidden.contains(pair.first(), pair.second())
            })
            .map(|(pair, score)| (pair.first(), pair.second(), score))
            .collect();
        edges.sort_by(|x, y| {
            y.2.total_cmp(&x.2)
                .then_with(|| (x.0 + x.1).cmp(&(y.0 + y.1)))
                .then_with(|| x.0.cmp(&y.0))
        });

        // Step 2: every item starts in its own cluster, labelled by its
        // smallest member
        let mut labels: Vec<usize> = (0..n).collect();
        let mut members: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();
        let mut history = Vec::new();

        // Step 3: merge the best valid pair until none is left. The first
        // valid edge in sorted order is the single-link score of its pair.
        loop {
            let pick = edges.iter().position(|&(a, b, score)| {
                let (x, y) = (labels[a], labels[b]);
                if x == y {
                    return false;
                }
                members[x].len() > 1
                    || members[y].len() > 1
                    || score >= params.min_initial_similarity
            });

            let (a, b, score) = match pick {
                Some(idx) => edges[idx],
                None => break,
            };

            let (keep, absorb) = {
                let (x, y) = (labels[a], labels[b]);
                (x.min(y), x.max(y))
            };
            let moved = std::mem::take(&mut members[absorb]);
            for &item in &moved {
                labels[item] = keep;
            }
            members[keep].extend(moved);
            history.push(MergeEvent { a, b, score });

            if let Some(max) = params.max_cluster_size {
                if members[keep].len() >= max {
                    debug!(size = members[keep].len(), max, "cluster size cap reached");
                    break;
                }
            }

            edges.retain(|&(a, b, _)| labels[a] != labels[b]);
        }

        history
    }
}
