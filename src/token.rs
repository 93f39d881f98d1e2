//! Predicate tokens and the grammatical slots they govern.
//!
//! Both types have a canonical text form used as table keys and in the
//! frame cache:
//!
//! ```text
//! v-kidnap          verb "kidnap"
//! n-kidnapping      noun "kidnapping"
//! v-kidnap:s        subject of "kidnap"
//! v-kidnap:o        object of "kidnap"
//! n-kidnapping:p_of "of" modifier of "kidnapping"
//! ```

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::FrameError;

static TOKEN_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<pos>[vnj])-(?P<lemma>[^\s:]+)$").expect("valid token regex"));

static SLOT_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<pos>[vnj])-(?P<lemma>[^\s:]+):(?P<rel>[^\s:]+)$").expect("valid slot regex")
});

/// Coarse part of speech of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Pos {
    Verb,
    Noun,
    Adjective,
}

impl Pos {
    fn tag(self) -> char {
        match self {
            Pos::Verb => 'v',
            Pos::Noun => 'n',
            Pos::Adjective => 'j',
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "v" => Some(Pos::Verb),
            "n" => Some(Pos::Noun),
            "j" => Some(Pos::Adjective),
            _ => None,
        }
    }
}

/// A lemma tagged with its part of speech.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Token {
    pos: Pos,
    lemma: String,
}

impl Token {
    pub fn new(pos: Pos, lemma: impl Into<String>) -> Self {
        Self {
            pos,
            lemma: lemma.into(),
        }
    }

    pub fn verb(lemma: impl Into<String>) -> Self {
        Self::new(Pos::Verb, lemma)
    }

    pub fn noun(lemma: impl Into<String>) -> Self {
        Self::new(Pos::Noun, lemma)
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn lemma(&self) -> &str {
        &self.lemma
    }

    /// The slot this token governs under `relation`.
    pub fn slot(&self, relation: Relation) -> Slot {
        Slot::new(self.clone(), relation)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.pos.tag(), self.lemma)
    }
}

impl FromStr for Token {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = TOKEN_KEY.captures(s).ok_or_else(|| FrameError::Parse {
            input: s.to_string(),
            message: "expected a token like `v-kidnap`".to_string(),
        })?;
        let pos = Pos::from_tag(&caps["pos"]).ok_or_else(|| FrameError::Parse {
            input: s.to_string(),
            message: "unknown part of speech".to_string(),
        })?;
        Ok(Token::new(pos, &caps["lemma"]))
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.to_string()
    }
}

impl TryFrom<String> for Token {
    type Error = FrameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Grammatical relation between a predicate and its argument.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Relation {
    Subject,
    Object,
    /// Prepositional modifier, e.g. `p_of`
    Prep(String),
    /// Any other dependency label, kept verbatim
    Other(String),
}

impl Relation {
    pub fn label(&self) -> String {
        match self {
            Relation::Subject => "s".to_string(),
            Relation::Object => "o".to_string(),
            Relation::Prep(prep) => format!("p_{}", prep),
            Relation::Other(label) => label.clone(),
        }
    }

    fn from_label(label: &str) -> Self {
        match label {
            "s" => Relation::Subject,
            "o" => Relation::Object,
            _ => match label.strip_prefix("p_") {
                Some(prep) if !prep.is_empty() => Relation::Prep(prep.to_string()),
                _ => Relation::Other(label.to_string()),
            },
        }
    }
}

/// A predicate token paired with the relation it governs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Slot {
    token: Token,
    relation: Relation,
}

impl Slot {
    pub fn new(token: Token, relation: Relation) -> Self {
        Self { token, relation }
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn relation(&self) -> &Relation {
        &self.relation
    }

    pub fn is_subject(&self) -> bool {
        self.relation == Relation::Subject
    }

    pub fn is_object(&self) -> bool {
        self.relation == Relation::Object
    }

    /// Subject of a verb; these get the verb-subject acceptance override.
    pub fn is_verb_subject(&self) -> bool {
        self.is_subject() && self.token.pos == Pos::Verb
    }

    /// The slot of the same token in the complementary core position
    /// (subject for object and vice versa).
    pub fn complement(&self) -> Option<Slot> {
        match self.relation {
            Relation::Subject => Some(self.token.slot(Relation::Object)),
            Relation::Object => Some(self.token.slot(Relation::Subject)),
            _ => None,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.token, self.relation.label())
    }
}

impl FromStr for Slot {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = SLOT_KEY.captures(s).ok_or_else(|| FrameError::Parse {
            input: s.to_string(),
            message: "expected a slot like `v-kidnap:s`".to_string(),
        })?;
        let pos = Pos::from_tag(&caps["pos"]).ok_or_else(|| FrameError::Parse {
            input: s.to_string(),
            message: "unknown part of speech".to_string(),
        })?;
        Ok(Slot::new(
            Token::new(pos, &caps["lemma"]),
            Relation::from_label(&caps["rel"]),
        ))
    }
}

impl From<Slot> for String {
    fn from(slot: Slot) -> Self {
        slot.to_string()
    }
}

impl TryFrom<String> for Slot {
    type Error = FrameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
