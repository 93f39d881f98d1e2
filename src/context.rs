//! Shared inputs of an induction run and its memo tables.

use std::collections::HashMap;

use crate::association::AssociationScorer;
use crate::config::InductionConfig;
use crate::lexicon::Lexicon;
use crate::slot_type::{SlotType, SlotTypeClassifier};
use crate::tables::{ArgumentTable, CorpusTables};
use crate::token::Slot;

/// Read-only inputs of a run.
#[derive(Clone, Copy)]
pub struct InductionContext<'a> {
    pub tables: &'a CorpusTables,
    pub lexicon: &'a dyn Lexicon,
    pub config: &'a InductionConfig,
}

impl<'a> InductionContext<'a> {
    pub fn new(
        tables: &'a CorpusTables,
        lexicon: &'a dyn Lexicon,
        config: &'a InductionConfig,
    ) -> Self {
        Self {
            tables,
            lexicon,
            config,
        }
    }

    pub fn scorer(&self) -> AssociationScorer<'a> {
        AssociationScorer::new(&self.config.scoring)
    }

    pub fn classifier(&self) -> SlotTypeClassifier<'a> {
        SlotTypeClassifier::new(self.lexicon).with_check_heads(self.config.roles.type_check_heads)
    }

    pub fn arguments_for(&self, frame_id: u32) -> &'a ArgumentTable {
        self.tables.arguments_for(frame_id)
    }
}

/// Memoized slot types and slot-pair scores.
///
/// Owned by whoever drives the run and passed down by `&mut`. Entries are
/// keyed by frame because frames may carry their own argument counts.
#[derive(Debug, Default)]
pub struct InductionCache {
    slot_types: HashMap<(u32, Slot), SlotType>,
    slot_pairs: HashMap<(u32, SlotType), HashMap<(Slot, Slot), f64>>,
}

impl InductionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Type of a slot under the frame's argument counts.
    pub fn slot_type(&mut self, ctx: &InductionContext<'_>, frame_id: u32, slot: &Slot) -> SlotType {
        *self
            .slot_types
            .entry((frame_id, slot.clone()))
            .or_insert_with(|| ctx.classifier().classify_in(slot, ctx.arguments_for(frame_id)))
    }

    /// Slot association under the frame's argument counts.
    pub fn slot_association(
        &mut self,
        ctx: &InductionContext<'_>,
        frame_id: u32,
        slot_type: SlotType,
        a: &Slot,
        b: &Slot,
    ) -> f64 {
        let key = if a <= b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        };
        *self
            .slot_pairs
            .entry((frame_id, slot_type))
            .or_default()
            .entry(key)
            .or_insert_with(|| {
                ctx.scorer().slot_association(
                    a,
                    b,
                    ctx.arguments_for(frame_id),
                    &ctx.tables.domain.coref,
                )
            })
    }

    /// Best slot association between any members of two slot sets.
    pub fn slot_set_association(
        &mut self,
        ctx: &InductionContext<'_>,
        frame_id: u32,
        slot_type: SlotType,
        a: &[Slot],
        b: &[Slot],
    ) -> f64 {
        let mut best = 0.0;
        for x in a {
            for y in b {
                let score = self.slot_association(ctx, frame_id, slot_type, x, y);
                if score > best {
                    best = score;
                }
            }
        }
        best
    }

    /// Forget everything computed for one frame.
    pub fn discard_frame(&mut self, frame_id: u32) {
        self.slot_types.retain(|(id, _), _| *id != frame_id);
        self.slot_pairs.retain(|(id, _), _| *id != frame_id);
    }

    pub fn clear(&mut self) {
        self.slot_types.clear();
        self.slot_pairs.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.slot_types.is_empty() && self.slot_pairs.is_empty()
    }
}
