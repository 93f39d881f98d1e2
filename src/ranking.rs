//! Ranking the argument heads that characterize a role.

use std::collections::BTreeMap;

use crate::context::InductionContext;
use crate::frame::ArgumentScore;
use crate::slot_type::SlotType;
use crate::token::{Slot, Token};

/// Ranked, normalized argument heads for a set of slots.
///
/// A head scores `domain_count * min(ratio, cap) + general_count`, where
/// `ratio` is the head noun's domain-vs-general likelihood ratio. Heads the
/// role type does not admit are dropped. Scores are normalized to sum to 1
/// and sorted best first, ties by head.
pub fn rank_arguments(
    ctx: &InductionContext<'_>,
    frame_id: u32,
    role_type: SlotType,
    slots: &[Slot],
) -> Vec<ArgumentScore> {
    let domain = ctx.arguments_for(frame_id);
    let general = ctx.tables.general_arguments();
    let cap = ctx.config.scoring.max_likelihood_ratio;

    let mut domain_counts: BTreeMap<&str, u64> = BTreeMap::new();
    for slot in slots {
        if let Some(heads) = domain.heads(slot) {
            for (head, &count) in heads {
                *domain_counts.entry(head.as_str()).or_insert(0) += count as u64;
            }
        }
    }

    let mut ranked: Vec<ArgumentScore> = domain_counts
        .into_iter()
        .filter(|(head, _)| role_type.admits(head, ctx.lexicon))
        .map(|(head, count)| {
            let ratio = ctx.tables.likelihood_ratio(&Token::noun(head)).min(cap);
            let general_count: u64 = general.map_or(0, |table| {
                slots.iter().map(|slot| table.count(slot, head) as u64).sum()
            });
            ArgumentScore {
                head: head.to_string(),
                score: count as f64 * ratio + general_count as f64,
            }
        })
        .filter(|argument| argument.score > 0.0)
        .collect();

    let total: f64 = ranked.iter().map(|a| a.score).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    for argument in &mut ranked {
        argument.score /= total;
    }
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.head.cmp(&b.head)));
    ranked.truncate(ctx.config.roles.max_ranked_arguments);
    ranked
}
