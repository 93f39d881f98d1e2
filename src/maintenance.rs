//! Refining the roles of an induced frame.

use tracing::debug;

use crate::context::{InductionCache, InductionContext};
use crate::frame::{Frame, Role, TriggerToken};
use crate::guard::ClashGuard;
use crate::ranking::rank_arguments;
use crate::role_inducer::RoleInducer;
use crate::token::{Relation, Slot, Token};

/// Post-induction operations on a frame's roles.
pub struct RoleMaintenance<'c, 'a> {
    ctx: &'c InductionContext<'a>,
}

impl<'c, 'a> RoleMaintenance<'c, 'a> {
    pub fn new(ctx: &'c InductionContext<'a>) -> Self {
        Self { ctx }
    }

    /// Repeatedly merge the first pair of same-type roles (in index order)
    /// whose slot sets associate at `cutoff` or better and that the clash
    /// guard does not refuse. Returns the number of merges.
    pub fn merge_roles(&self, frame: &mut Frame, cutoff: f64, cache: &mut InductionCache) -> usize {
        let frame_id = frame.id();
        let max_merges = frame.roles().len().saturating_sub(1);
        let mut merges = 0;

        while merges < max_merges {
            let pick = self.find_merge(frame, cutoff, cache);
            let (i, j) = match pick {
                Some(pair) => pair,
                None => break,
            };
            let roles = frame.roles_mut();
            let absorbed = roles.remove(j);
            roles[i].absorb(absorbed);
            self.rerank(frame_id, &mut roles[i]);
            debug!(frame_id, keep = i, absorbed = j, "merged roles");
            merges += 1;
        }
        merges
    }

    fn find_merge(
        &self,
        frame: &Frame,
        cutoff: f64,
        cache: &mut InductionCache,
    ) -> Option<(usize, usize)> {
        let frame_id = frame.id();
        let roles = frame.roles();
        for i in 0..roles.len() {
            for j in (i + 1)..roles.len() {
                let slot_type = roles[i].role_type();
                if roles[j].role_type() != slot_type {
                    continue;
                }
                let score = cache.slot_set_association(
                    self.ctx,
                    frame_id,
                    slot_type,
                    roles[i].slots(),
                    roles[j].slots(),
                );
                if score < cutoff || score <= 0.0 {
                    continue;
                }
                let guard = ClashGuard::new(
                    self.ctx.arguments_for(frame_id),
                    self.ctx.lexicon,
                    slot_type,
                    &self.ctx.config.guard,
                );
                if guard.refuses(roles[i].slots(), roles[j].slots()) {
                    continue;
                }
                return Some((i, j));
            }
        }
        None
    }

    /// Drop roles with too little argument evidence. Returns the number of
    /// removed roles.
    pub fn remove_roles(&self, frame: &mut Frame) -> usize {
        let frame_id = frame.id();
        let arguments = self.ctx.arguments_for(frame_id);
        let floor = self.ctx.config.maintenance.min_role_evidence;
        let roles = frame.roles_mut();
        let before = roles.len();
        roles.retain(|role| {
            let evidence: u64 = role.slots().iter().map(|slot| arguments.total(slot)).sum();
            if evidence < floor {
                debug!(frame_id, evidence, floor, "removing role");
            }
            evidence >= floor
        });
        before - roles.len()
    }

    /// Offer the subject and object slots of every trigger to the roles,
    /// accepting any positive association.
    pub fn force_triggers_into_slots(&self, frame: &mut Frame, cache: &mut InductionCache) -> usize {
        let arguments = self.ctx.arguments_for(frame.id());
        let mut candidates = Vec::new();
        for token in frame.trigger_tokens() {
            for relation in [Relation::Subject, Relation::Object] {
                let slot = token.slot(relation);
                if arguments.contains(&slot) && frame.role_of(&slot).is_none() {
                    candidates.push(slot);
                }
            }
        }
        self.add_slots_to_roles(&candidates, frame, false, cache)
    }

    /// Assign unassigned candidate slots to their best matching role of the
    /// same type. Returns the number of slots added.
    pub fn add_slots_to_roles(
        &self,
        candidates: &[Slot],
        frame: &mut Frame,
        cutoff_low_scores: bool,
        cache: &mut InductionCache,
    ) -> usize {
        let frame_id = frame.id();
        let settings = &self.ctx.config.maintenance;
        let mut touched = Vec::new();
        let mut added = 0;

        for slot in candidates {
            if frame.role_of(slot).is_some() {
                continue;
            }
            let slot_type = cache.slot_type(self.ctx, frame_id, slot);

            let mut best: Option<(usize, f64)> = None;
            for (idx, role) in frame.roles().iter().enumerate() {
                if role.role_type() != slot_type {
                    continue;
                }
                let score = cache.slot_set_association(
                    self.ctx,
                    frame_id,
                    slot_type,
                    std::slice::from_ref(slot),
                    role.slots(),
                );
                if best.map_or(true, |(_, top)| score > top) {
                    best = Some((idx, score));
                }
            }

            let (idx, score) = match best {
                Some(best) => best,
                None => continue,
            };
            let accept = score >= settings.add_cutoff
                || (score > 0.0 && !cutoff_low_scores)
                || (score > 0.0 && settings.accept_verb_subjects && slot.is_verb_subject());
            if accept {
                debug!(frame_id, %slot, role = idx, score, "adding slot to role");
                frame.roles_mut()[idx].add_slot(slot.clone());
                added += 1;
                if !touched.contains(&idx) {
                    touched.push(idx);
                }
            }
        }

        let roles = frame.roles_mut();
        for idx in touched {
            self.rerank(frame_id, &mut roles[idx]);
        }
        added
    }

    /// Add new trigger tokens to a frame and assign their slots to the
    /// existing roles. Returns the number of slots added.
    pub fn add_tokens_to_frame(
        &self,
        frame: &mut Frame,
        tokens: &[Token],
        cache: &mut InductionCache,
    ) -> usize {
        let scorer = self.ctx.scorer();
        let domain = &self.ctx.tables.domain;
        let mut fresh = Vec::new();
        for token in tokens {
            if frame.has_trigger(token) || fresh.contains(token) {
                continue;
            }
            let triggers: Vec<&Token> = frame.trigger_tokens().collect();
            let score = if triggers.is_empty() {
                0.0
            } else {
                triggers
                    .iter()
                    .map(|t| {
                        scorer.token_association(token, t, &domain.cooccurrence, &domain.doc_freq)
                    })
                    .sum::<f64>()
                    / triggers.len() as f64
            };
            frame.add_trigger(TriggerToken {
                token: token.clone(),
                score,
            });
            fresh.push(token.clone());
        }
        if fresh.is_empty() {
            return 0;
        }

        let inducer = RoleInducer::new(self.ctx);
        let candidates = inducer.gather_candidates(frame.id(), &fresh);
        let candidates = inducer.filter_candidates(frame.id(), candidates);
        self.add_slots_to_roles(&candidates, frame, true, cache)
    }

    fn rerank(&self, frame_id: u32, role: &mut Role) {
        if self.ctx.config.roles.extract_arguments {
            let ranked = rank_arguments(self.ctx, frame_id, role.role_type(), role.slots());
            role.set_arguments(ranked);
        }
    }
}
