//! Induced frames and roles.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::slot_type::SlotType;
use crate::token::{Slot, Token};

/// A trigger token of a frame with its association to the other triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerToken {
    pub token: Token,
    pub score: f64,
}

/// One ranked argument head of a role. Scores of a role sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentScore {
    pub head: String,
    pub score: f64,
}

/// A semantic role: typed set of slots that are filled by the same
/// participant of the frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RoleFields")]
pub struct Role {
    role_type: SlotType,
    slots: Vec<Slot>,
    arguments: Vec<ArgumentScore>,
}

impl Role {
    pub(crate) fn new(role_type: SlotType, mut slots: Vec<Slot>) -> Self {
        slots.sort();
        slots.dedup();
        Self {
            role_type,
            slots,
            arguments: Vec::new(),
        }
    }

    pub fn role_type(&self) -> SlotType {
        self.role_type
    }

    /// Member slots in canonical order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn contains(&self, slot: &Slot) -> bool {
        self.slots.binary_search(slot).is_ok()
    }

    /// Argument heads best describing the role, best first. Empty when
    /// argument extraction is disabled.
    pub fn ranked_argument_heads(&self) -> &[ArgumentScore] {
        &self.arguments
    }

    pub(crate) fn add_slot(&mut self, slot: Slot) {
        if let Err(pos) = self.slots.binary_search(&slot) {
            self.slots.insert(pos, slot);
        }
    }

    /// Take over every slot of `other`.
    pub(crate) fn absorb(&mut self, other: Role) {
        for slot in other.slots {
            self.add_slot(slot);
        }
    }

    pub(crate) fn set_arguments(&mut self, arguments: Vec<ArgumentScore>) {
        self.arguments = arguments;
    }
}

// Loaded slots may come in any order or repeat; membership lookups need
// them sorted and unique.
#[derive(Deserialize)]
struct RoleFields {
    role_type: SlotType,
    slots: Vec<Slot>,
    #[serde(default)]
    arguments: Vec<ArgumentScore>,
}

impl From<RoleFields> for Role {
    fn from(fields: RoleFields) -> Self {
        let mut role = Role::new(fields.role_type, fields.slots);
        role.arguments = fields.arguments;
        role
    }
}

/// A cluster of trigger tokens describing one kind of event, with the roles
/// of its participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FrameFields")]
pub struct Frame {
    id: u32,
    tokens: Vec<TriggerToken>,
    roles: Vec<Role>,
}

impl Frame {
    /// A frame with no roles yet.
    pub fn new(id: u32, tokens: Vec<TriggerToken>) -> Self {
        Self {
            id,
            tokens,
            roles: Vec::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Trigger tokens, best associated first.
    pub fn tokens(&self) -> &[TriggerToken] {
        &self.tokens
    }

    pub fn trigger_tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().map(|t| &t.token)
    }

    pub fn has_trigger(&self, token: &Token) -> bool {
        self.tokens.iter().any(|t| &t.token == token)
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Index of the role a slot belongs to.
    pub fn role_of(&self, slot: &Slot) -> Option<usize> {
        self.roles.iter().position(|role| role.contains(slot))
    }

    pub(crate) fn roles_mut(&mut self) -> &mut Vec<Role> {
        &mut self.roles
    }

    pub(crate) fn set_roles(&mut self, roles: Vec<Role>) {
        self.roles = roles;
    }

    /// Add a trigger, keeping triggers sorted by score then token.
    pub(crate) fn add_trigger(&mut self, trigger: TriggerToken) {
        if self.has_trigger(&trigger.token) {
            return;
        }
        self.tokens.push(trigger);
        sort_triggers(&mut self.tokens);
    }
}

#[derive(Deserialize)]
struct FrameFields {
    id: u32,
    tokens: Vec<TriggerToken>,
    roles: Vec<Role>,
}

impl TryFrom<FrameFields> for Frame {
    type Error = String;

    fn try_from(fields: FrameFields) -> Result<Self, Self::Error> {
        {
            let mut seen = BTreeSet::new();
            for slot in fields.roles.iter().flat_map(|role| role.slots()) {
                if !seen.insert(slot) {
                    return Err(format!(
                        "slot {} belongs to more than one role of frame {}",
                        slot, fields.id
                    ));
                }
            }
        }
        Ok(Self {
            id: fields.id,
            tokens: fields.tokens,
            roles: fields.roles,
        })
    }
}

pub(crate) fn sort_triggers(tokens: &mut [TriggerToken]) {
    tokens.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.token.cmp(&b.token)));
}
