//! Sparse symmetric pair scores over item indices.

use std::collections::BTreeMap;

/// Score forced onto synonym pairs. Larger than any computed association.
pub const SYNONYM_SCORE: f64 = 1_000.0;

/// Unordered pair of item indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemPair(usize, usize);

impl ItemPair {
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            ItemPair(a, b)
        } else {
            ItemPair(b, a)
        }
    }

    pub fn first(&self) -> usize {
        self.0
    }

    pub fn second(&self) -> usize {
        self.1
    }
}

/// Symmetric map from item pairs to similarity scores.
///
/// Absent pairs score 0. Once a pair has been boosted as synonyms no insert
/// can lower it.
#[derive(Debug, Clone, Default)]
pub struct PairScoreCache {
    scores: BTreeMap<ItemPair, f64>,
}

impl PairScoreCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the score of a pair. Self pairs are ignored.
    pub fn insert(&mut self, a: usize, b: usize, score: f64) {
        if a == b || !score.is_finite() {
            return;
        }
        let entry = self.scores.entry(ItemPair::new(a, b)).or_insert(score);
        if *entry < SYNONYM_SCORE {
            *entry = score;
        }
    }

    /// Insert an edge, keeping the larger of the existing and new score.
    pub fn insert_max(&mut self, a: usize, b: usize, score: f64) {
        if a == b || !score.is_finite() {
            return;
        }
        let entry = self
            .scores
            .entry(ItemPair::new(a, b))
            .or_insert(f64::NEG_INFINITY);
        if score > *entry {
            *entry = score;
        }
    }

    /// Force a pair to merge before anything else.
    pub fn boost_synonym(&mut self, a: usize, b: usize) {
        if a != b {
            self.scores.insert(ItemPair::new(a, b), SYNONYM_SCORE);
        }
    }

    pub fn get(&self, a: usize, b: usize) -> f64 {
        self.scores
            .get(&ItemPair::new(a, b))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn is_synonym(&self, a: usize, b: usize) -> bool {
        self.get(a, b) >= SYNONYM_SCORE
    }

    /// All stored pairs in ascending pair order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemPair, f64)> + '_ {
        self.scores.iter().map(|(pair, &score)| (*pair, score))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn clear(&mut self) {
        self.scores.clear();
    }
}
