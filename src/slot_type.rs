//! Coarse semantic typing of slots from the heads that fill them.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lexicon::Lexicon;
use crate::tables::ArgumentTable;
use crate::token::Slot;

/// Semantic type of a slot and of the role it ends up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SlotType {
    Person,
    Location,
    Event,
    #[serde(rename = "PHYSOBJECT")]
    PhysObject,
    Other,
}

impl SlotType {
    /// Whether an argument head is compatible with this type.
    ///
    /// Unknown words are admitted as people and places: in news text most
    /// of them are names.
    pub fn admits(self, head: &str, lexicon: &dyn Lexicon) -> bool {
        match self {
            SlotType::Person => lexicon.is_person(head) || lexicon.is_unknown_word(head),
            SlotType::Location => lexicon.is_location(head) || lexicon.is_unknown_word(head),
            SlotType::PhysObject => lexicon.is_physical_object(head) || lexicon.is_material(head),
            SlotType::Event => lexicon.is_event_noun(head),
            SlotType::Other => true,
        }
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SlotType::Person => "PERSON",
            SlotType::Location => "LOCATION",
            SlotType::Event => "EVENT",
            SlotType::PhysObject => "PHYSOBJECT",
            SlotType::Other => "OTHER",
        };
        f.write_str(name)
    }
}

/// Vote tally over the five slot types.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TypeVotes {
    pub person: f64,
    pub location: f64,
    pub event: f64,
    pub phys_object: f64,
    pub other: f64,
}

impl TypeVotes {
    /// Decide the type. Concrete types compete by plurality
    /// (ties: person, physical object, location, event); OTHER wins when it
    /// has more than twice the best concrete vote.
    pub fn winner(&self) -> SlotType {
        let concrete = [
            (SlotType::Person, self.person),
            (SlotType::PhysObject, self.phys_object),
            (SlotType::Location, self.location),
            (SlotType::Event, self.event),
        ];
        let mut best = concrete[0];
        for candidate in &concrete[1..] {
            if candidate.1 > best.1 {
                best = *candidate;
            }
        }
        if best.1 <= 0.0 || self.other > 2.0 * best.1 {
            SlotType::Other
        } else {
            best.0
        }
    }
}

/// Assigns a [`SlotType`] to slots.
#[derive(Clone, Copy)]
pub struct SlotTypeClassifier<'a> {
    lexicon: &'a dyn Lexicon,
    check_heads: usize,
}

impl<'a> SlotTypeClassifier<'a> {
    pub fn new(lexicon: &'a dyn Lexicon) -> Self {
        Self {
            lexicon,
            check_heads: 5,
        }
    }

    /// Number of top heads inspected by [`Self::slot_type_matches`].
    pub fn with_check_heads(mut self, check_heads: usize) -> Self {
        self.check_heads = check_heads;
        self
    }

    /// Count-weighted vote over the heads observed in the slot.
    pub fn votes(&self, observed: &HashMap<String, u32>) -> TypeVotes {
        let mut votes = TypeVotes::default();
        for (head, &count) in observed {
            let weight = count as f64;
            let lexicon = self.lexicon;
            if lexicon.is_person(head) {
                votes.person += weight;
            } else if lexicon.is_location(head) {
                votes.location += weight;
            } else if lexicon.is_physical_object(head) || lexicon.is_material(head) {
                votes.phys_object += weight;
            } else if lexicon.is_event_noun(head) {
                votes.event += weight;
            } else if lexicon.is_unknown_word(head) {
                votes.person += weight / 2.0;
                votes.location += weight / 2.0;
            } else {
                votes.other += weight;
            }
        }
        votes
    }

    /// Type of a slot given the heads observed filling it.
    pub fn classify(&self, _slot: &Slot, observed: &HashMap<String, u32>) -> SlotType {
        self.votes(observed).winner()
    }

    /// Type of a slot looked up in an argument table. Slots with no
    /// observations are OTHER.
    pub fn classify_in(&self, slot: &Slot, arguments: &ArgumentTable) -> SlotType {
        match arguments.heads(slot) {
            Some(observed) => self.classify(slot, observed),
            None => SlotType::Other,
        }
    }

    /// Cheap compatibility check: does any of the slot's most frequent heads
    /// fit the type?
    pub fn slot_type_matches(
        &self,
        slot_type: SlotType,
        slot: &Slot,
        arguments: &ArgumentTable,
    ) -> bool {
        if slot_type == SlotType::Other {
            return true;
        }
        arguments
            .top_heads(slot, self.check_heads)
            .into_iter()
            .any(|(head, _)| slot_type.admits(head, self.lexicon))
    }
}
