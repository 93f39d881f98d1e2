//! Blocking merges of slot clusters that play opposite roles.
//!
//! The subject and the object of the same verb can have similar argument
//! distributions ("the police arrested the guerrillas" and "the guerrillas
//! attacked the police"), so argument similarity alone would happily put
//! perpetrators and victims in one role. A merge is refused when the two
//! clusters use one verb in opposite positions *and* their pooled argument
//! distributions disagree on several frequent heads.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::config::GuardConfig;
use crate::lexicon::Lexicon;
use crate::reconstruct::MergeGuard;
use crate::slot_type::SlotType;
use crate::tables::ArgumentTable;
use crate::token::{Pos, Slot};

/// Subject/object clash plus distribution divergence check.
#[derive(Clone, Copy)]
pub struct ClashGuard<'a> {
    arguments: &'a ArgumentTable,
    lexicon: &'a dyn Lexicon,
    slot_type: SlotType,
    config: &'a GuardConfig,
}

impl<'a> ClashGuard<'a> {
    pub fn new(
        arguments: &'a ArgumentTable,
        lexicon: &'a dyn Lexicon,
        slot_type: SlotType,
        config: &'a GuardConfig,
    ) -> Self {
        Self {
            arguments,
            lexicon,
            slot_type,
            config,
        }
    }

    /// Guard over clustering items, where item `i` is `items[i]`.
    pub fn for_items<'g>(&'g self, items: &'g [Slot]) -> ItemGuard<'g, 'a> {
        ItemGuard { guard: self, items }
    }

    /// Whether joining the two slot sets should be refused.
    pub fn refuses(&self, a: &[Slot], b: &[Slot]) -> bool {
        if !has_clash(a, b) {
            return false;
        }
        let divergent = self.divergent_heads(a, b);
        let refused = divergent >= self.config.min_divergent_heads;
        if refused {
            debug!(
                slot_type = %self.slot_type,
                divergent,
                "subject/object clash with diverging arguments"
            );
        }
        refused
    }

    /// Number of frequent heads whose relative frequencies differ by more
    /// than the configured ratio between the two pooled distributions.
    pub fn divergent_heads(&self, a: &[Slot], b: &[Slot]) -> usize {
        let (pooled_a, total_a) = self.pool(a);
        let (pooled_b, total_b) = self.pool(b);
        if total_a == 0 || total_b == 0 {
            return 0;
        }

        let mass = |pooled: &HashMap<&str, u64>, total: u64, head: &str| {
            pooled.get(head).copied().unwrap_or(0) as f64 / total as f64
        };

        let heads: BTreeSet<&str> = pooled_a.keys().chain(pooled_b.keys()).copied().collect();
        let mut compared: Vec<(&str, f64, f64)> = heads
            .into_iter()
            .map(|head| {
                (
                    head,
                    mass(&pooled_a, total_a, head),
                    mass(&pooled_b, total_b, head),
                )
            })
            .filter(|&(_, pa, pb)| pa >= self.config.min_head_mass || pb >= self.config.min_head_mass)
            .collect();
        compared.sort_by(|x, y| (y.1 + y.2).total_cmp(&(x.1 + x.2)).then_with(|| x.0.cmp(y.0)));
        compared.truncate(self.config.max_compared_heads);

        compared
            .iter()
            .filter(|&&(_, pa, pb)| pa.min(pb) / pa.max(pb) < self.config.ratio_threshold)
            .count()
    }

    /// Type-filtered argument counts summed over a slot set.
    fn pool(&self, slots: &[Slot]) -> (HashMap<&'a str, u64>, u64) {
        let mut pooled: HashMap<&'a str, u64> = HashMap::new();
        let mut total = 0;
        let arguments: &'a ArgumentTable = self.arguments;
        for slot in slots {
            let heads = match arguments.heads(slot) {
                Some(heads) => heads,
                None => continue,
            };
            for (head, &count) in heads {
                if self.slot_type.admits(head, self.lexicon) {
                    *pooled.entry(head.as_str()).or_insert(0) += count as u64;
                    total += count as u64;
                }
            }
        }
        (pooled, total)
    }
}

/// A verb appears as subject on one side and as object on the other.
pub fn has_clash(a: &[Slot], b: &[Slot]) -> bool {
    a.iter().any(|x| {
        x.token().pos() == Pos::Verb
            && b.iter().any(|y| {
                x.token() == y.token()
                    && ((x.is_subject() && y.is_object()) || (x.is_object() && y.is_subject()))
            })
    })
}

/// [`ClashGuard`] seen through clustering item indices.
pub struct ItemGuard<'g, 'a> {
    guard: &'g ClashGuard<'a>,
    items: &'g [Slot],
}

impl ItemGuard<'_, '_> {
    fn slots(&self, indices: &[usize]) -> Vec<Slot> {
        indices
            .iter()
            .filter_map(|&i| self.items.get(i).cloned())
            .collect()
    }
}

impl MergeGuard for ItemGuard<'_, '_> {
    fn allows_merge(&self, a: &[usize], b: &[usize]) -> bool {
        !self.guard.refuses(&self.slots(a), &self.slots(b))
    }
}
