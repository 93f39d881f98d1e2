//! Pairwise association between predicate tokens and between slots.
//!
//! Both scores are "evidence" scores: 0 means no evidence, never
//! anti-correlation, and neither is ever NaN or infinite.

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ScoringConfig;
use crate::tables::{ArgumentTable, CooccurrenceTable, CorefTable, DocFrequency};
use crate::token::{Slot, Token};

/// How the argument cosine and the coreference cosine of two slots are
/// combined. Chosen once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotSimilarity {
    /// The larger of the two cosines
    Max,
    /// The average of the two cosines
    Mean,
    /// Argument-head cosine only
    Arguments,
    /// Coreference cosine only
    Coref,
}

impl SlotSimilarity {
    pub fn combine(self, arguments: f64, coref: f64) -> f64 {
        match self {
            SlotSimilarity::Max => arguments.max(coref),
            SlotSimilarity::Mean => (arguments + coref) / 2.0,
            SlotSimilarity::Arguments => arguments,
            SlotSimilarity::Coref => coref,
        }
    }
}

/// Computes token and slot association scores.
#[derive(Debug, Clone, Copy)]
pub struct AssociationScorer<'a> {
    config: &'a ScoringConfig,
}

impl<'a> AssociationScorer<'a> {
    pub fn new(config: &'a ScoringConfig) -> Self {
        Self { config }
    }

    /// Damped pointwise mutual information of two tokens.
    ///
    /// `P(a,b)` is the pair's share of all joint counts and `P(a)` the
    /// token's share of corpus documents. Pairs under the document or joint
    /// count floors, and negative PMI, score 0.
    pub fn token_association(
        &self,
        a: &Token,
        b: &Token,
        cooccurrence: &CooccurrenceTable,
        doc_freq: &DocFrequency,
    ) -> f64 {
        if a == b {
            return 0.0;
        }
        let docs_a = doc_freq.docs(a);
        let docs_b = doc_freq.docs(b);
        if docs_a < self.config.min_token_docs || docs_b < self.config.min_token_docs {
            return 0.0;
        }
        let joint = cooccurrence.count(a, b);
        if joint == 0 || joint < self.config.min_joint_count {
            return 0.0;
        }

        let total_joint = cooccurrence.total();
        let total_docs = doc_freq.total_docs();
        if total_joint == 0 || total_docs == 0 {
            debug!(%a, %b, "degenerate corpus totals, no token association");
            return 0.0;
        }

        let p_ab = joint as f64 / total_joint as f64;
        let p_a = docs_a as f64 / total_docs as f64;
        let p_b = docs_b as f64 / total_docs as f64;
        let pmi = (p_ab / (p_a * p_b)).ln();
        if !pmi.is_finite() || pmi <= 0.0 {
            return 0.0;
        }

        let m = docs_a.min(docs_b) as f64;
        pmi * m / (m + self.config.damping)
    }

    /// Blended slot similarity in `[0, 1]`.
    ///
    /// Combines the argument-head cosine and the coreference-partner cosine
    /// with the configured [`SlotSimilarity`], penalizes two slots of the
    /// same predicate, and drops scores under the noise floor.
    pub fn slot_association(
        &self,
        a: &Slot,
        b: &Slot,
        arguments: &ArgumentTable,
        coref: &CorefTable,
    ) -> f64 {
        let argument_cosine = match (arguments.heads(a), arguments.heads(b)) {
            (Some(x), Some(y)) => count_cosine(x, y),
            _ => 0.0,
        };
        let coref_cosine = match (coref.partners(a), coref.partners(b)) {
            (Some(x), Some(y)) => count_cosine(x, y),
            _ => 0.0,
        };

        let mut score = self
            .config
            .slot_similarity
            .combine(argument_cosine, coref_cosine);
        if a.token() == b.token() {
            score *= self.config.same_token_penalty;
        }
        if score < self.config.noise_floor {
            return 0.0;
        }
        score.clamp(0.0, 1.0)
    }

    /// Highest slot association between any member of `a` and any member of
    /// `b`.
    pub fn slot_set_association(
        &self,
        a: &[Slot],
        b: &[Slot],
        arguments: &ArgumentTable,
        coref: &CorefTable,
    ) -> f64 {
        let mut best = 0.0;
        for x in a {
            for y in b {
                let score = self.slot_association(x, y, arguments, coref);
                if score > best {
                    best = score;
                }
            }
        }
        best
    }
}

/// Cosine similarity of two count vectors.
///
/// Dot product and norms are accumulated as integers, so the result does not
/// depend on argument order or map iteration order. Zero vectors score 0.
pub fn count_cosine<K: Eq + Hash>(a: &HashMap<K, u32>, b: &HashMap<K, u32>) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: u128 = small
        .iter()
        .filter_map(|(key, &x)| large.get(key).map(|&y| x as u128 * y as u128))
        .sum();
    if dot == 0 {
        return 0.0;
    }
    let norm_a: u128 = a.values().map(|&x| x as u128 * x as u128).sum();
    let norm_b: u128 = b.values().map(|&x| x as u128 * x as u128).sum();
    let cosine = dot as f64 / ((norm_a as f64).sqrt() * (norm_b as f64).sqrt());
    cosine.clamp(0.0, 1.0)
}
