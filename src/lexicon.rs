//! Lexical knowledge consumed by slot typing and frame clustering.
//!
//! The engine only asks category questions about argument head words and
//! synonym questions about predicate tokens. [`WordListLexicon`] answers them
//! from plain word lists, which is enough for tests and for lexicons exported
//! from an external resource into TOML.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::errors::{FrameError, FrameResult};
use crate::token::{Pos, Token};

/// Category predicates over argument head words.
pub trait Lexicon {
    /// Person or group of people ("guerrilla", "mayor", "police").
    fn is_person(&self, word: &str) -> bool;

    fn is_location(&self, word: &str) -> bool;

    fn is_physical_object(&self, word: &str) -> bool;

    /// Substances ("dynamite", "explosive").
    fn is_material(&self, word: &str) -> bool;

    /// Nouns that denote events ("attack", "explosion").
    fn is_event_noun(&self, word: &str) -> bool;

    /// Words the lexicon has never seen. Most of these are proper names.
    fn is_unknown_word(&self, word: &str) -> bool;

    fn lemmatize(&self, word: &str, _pos: Pos) -> String {
        word.to_lowercase()
    }

    /// Whether two predicates should be treated as the same trigger
    /// (synonyms or a verb and its nominalization).
    fn are_synonyms(&self, _a: &Token, _b: &Token) -> bool {
        false
    }
}

/// A lexicon backed by word lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WordListLexicon {
    #[serde(default)]
    persons: HashSet<String>,
    #[serde(default)]
    locations: HashSet<String>,
    #[serde(default)]
    physical_objects: HashSet<String>,
    #[serde(default)]
    materials: HashSet<String>,
    #[serde(default)]
    event_nouns: HashSet<String>,
    /// Known words that belong to none of the categories
    #[serde(default)]
    vocabulary: HashSet<String>,
    /// Groups of lemmas that are interchangeable as triggers
    #[serde(default)]
    synonyms: Vec<Vec<String>>,
    /// Inflected form to lemma
    #[serde(default)]
    lemmas: HashMap<String, String>,
}

impl WordListLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a lexicon from a TOML file.
    pub fn load(path: &Path) -> FrameResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| FrameError::io(path, e))?;
        toml::from_str(&content).map_err(|e| FrameError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub fn with_persons(mut self, words: &[&str]) -> Self {
        self.persons.extend(words.iter().map(|w| w.to_string()));
        self
    }

    pub fn with_locations(mut self, words: &[&str]) -> Self {
        self.locations.extend(words.iter().map(|w| w.to_string()));
        self
    }

    pub fn with_physical_objects(mut self, words: &[&str]) -> Self {
        self.physical_objects
            .extend(words.iter().map(|w| w.to_string()));
        self
    }

    pub fn with_materials(mut self, words: &[&str]) -> Self {
        self.materials.extend(words.iter().map(|w| w.to_string()));
        self
    }

    pub fn with_event_nouns(mut self, words: &[&str]) -> Self {
        self.event_nouns.extend(words.iter().map(|w| w.to_string()));
        self
    }

    pub fn with_vocabulary(mut self, words: &[&str]) -> Self {
        self.vocabulary.extend(words.iter().map(|w| w.to_string()));
        self
    }

    pub fn with_synonyms(mut self, group: &[&str]) -> Self {
        self.synonyms
            .push(group.iter().map(|w| w.to_string()).collect());
        self
    }

    pub fn with_lemma(mut self, form: &str, lemma: &str) -> Self {
        self.lemmas.insert(form.to_string(), lemma.to_string());
        self
    }

    fn knows(&self, word: &str) -> bool {
        self.persons.contains(word)
            || self.locations.contains(word)
            || self.physical_objects.contains(word)
            || self.materials.contains(word)
            || self.event_nouns.contains(word)
            || self.vocabulary.contains(word)
    }
}

impl Lexicon for WordListLexicon {
    fn is_person(&self, word: &str) -> bool {
        self.persons.contains(word)
    }

    fn is_location(&self, word: &str) -> bool {
        self.locations.contains(word)
    }

    fn is_physical_object(&self, word: &str) -> bool {
        self.physical_objects.contains(word)
    }

    fn is_material(&self, word: &str) -> bool {
        self.materials.contains(word)
    }

    fn is_event_noun(&self, word: &str) -> bool {
        self.event_nouns.contains(word)
    }

    fn is_unknown_word(&self, word: &str) -> bool {
        !self.knows(word)
    }

    fn lemmatize(&self, word: &str, _pos: Pos) -> String {
        let lower = word.to_lowercase();
        self.lemmas.get(&lower).cloned().unwrap_or(lower)
    }

    fn are_synonyms(&self, a: &Token, b: &Token) -> bool {
        if a == b {
            return false;
        }
        self.synonyms.iter().any(|group| {
            group.iter().any(|w| w == a.lemma()) && group.iter().any(|w| w == b.lemma())
        })
    }
}
