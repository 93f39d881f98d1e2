//! Precomputed corpus statistics.
//!
//! All tables are produced by an external preprocessing pass and are
//! read-only to the engine. Each table has a tab-separated text form:
//!
//! ```text
//! # domain.idf: corpus size, then token, document count, total count
//! *total*	1300
//! v-kidnap	211	530
//!
//! # domain.args: slot, argument head, count
//! v-kidnap:o	mayor	42
//!
//! # domain.cooc: token pair, joint count
//! v-kidnap	v-release	77
//!
//! # domain.coref: slot pair, coreference count
//! v-kidnap:o	v-release:o	19
//! ```
//!
//! Malformed lines abort loading: clustering on corrupt statistics would
//! produce meaningless frames.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::errors::{FrameError, FrameResult};
use crate::token::{Slot, Token};

/// Document and occurrence counts for one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenCounts {
    /// Number of documents containing the token
    pub docs: u32,
    /// Number of occurrences across the corpus
    pub total: u64,
}

/// Document frequency table (the IDF table).
#[derive(Debug, Clone, Default)]
pub struct DocFrequency {
    counts: HashMap<Token, TokenCounts>,
    total_docs: u32,
    total_tokens: u64,
}

impl DocFrequency {
    pub fn new(total_docs: u32) -> Self {
        Self {
            counts: HashMap::new(),
            total_docs,
            total_tokens: 0,
        }
    }

    /// Record counts for a token. Repeated tokens accumulate, saturating at
    /// the largest representable count.
    pub fn insert(&mut self, token: Token, docs: u32, total: u64) {
        let entry = self.counts.entry(token).or_default();
        entry.docs = entry.docs.saturating_add(docs);
        entry.total = entry.total.saturating_add(total);
        self.total_tokens = self.total_tokens.saturating_add(total);
    }

    pub fn get(&self, token: &Token) -> Option<TokenCounts> {
        self.counts.get(token).copied()
    }

    /// Document count, 0 for unseen tokens.
    pub fn docs(&self, token: &Token) -> u32 {
        self.counts.get(token).map_or(0, |c| c.docs)
    }

    pub fn total_docs(&self) -> u32 {
        self.total_docs
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    /// Relative frequency of the token among all occurrences.
    pub fn probability(&self, token: &Token) -> Option<f64> {
        let counts = self.counts.get(token)?;
        if self.total_tokens == 0 || counts.total == 0 {
            return None;
        }
        Some(counts.total as f64 / self.total_tokens as f64)
    }

    /// All tokens in canonical order.
    pub fn tokens(&self) -> Vec<&Token> {
        let mut tokens: Vec<&Token> = self.counts.keys().collect();
        tokens.sort();
        tokens
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Parse the text form. The `*total*` line is required.
    pub fn read_from<R: BufRead>(reader: R, source_name: &str) -> FrameResult<Self> {
        let mut table = DocFrequency::default();
        let mut saw_total = false;
        for_each_record(reader, source_name, |fields| match fields {
            ["*total*", docs] => {
                table.total_docs = parse_count(docs)?;
                saw_total = true;
                Ok(())
            }
            [token, docs, total] => {
                let token: Token = token.parse().map_err(|e: FrameError| e.to_string())?;
                table.insert(token, parse_count(docs)?, parse_count(total)?);
                Ok(())
            }
            _ => Err(format!("expected 3 fields, found {}", fields.len())),
        })?;
        if !saw_total {
            return Err(FrameError::Table {
                source_name: source_name.to_string(),
                line: 0,
                message: "missing `*total*` corpus size line".to_string(),
            });
        }
        Ok(table)
    }
}

/// Argument head counts per slot.
#[derive(Debug, Clone, Default)]
pub struct ArgumentTable {
    slots: BTreeMap<Slot, HashMap<String, u32>>,
}

impl ArgumentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` observations of `head` filling `slot`. Counts saturate.
    pub fn add(&mut self, slot: Slot, head: impl Into<String>, count: u32) {
        let entry = self
            .slots
            .entry(slot)
            .or_default()
            .entry(head.into())
            .or_insert(0);
        *entry = entry.saturating_add(count);
    }

    pub fn heads(&self, slot: &Slot) -> Option<&HashMap<String, u32>> {
        self.slots.get(slot)
    }

    pub fn count(&self, slot: &Slot, head: &str) -> u32 {
        self.slots
            .get(slot)
            .and_then(|heads| heads.get(head))
            .copied()
            .unwrap_or(0)
    }

    /// Total observed argument count of a slot.
    pub fn total(&self, slot: &Slot) -> u64 {
        self.slots
            .get(slot)
            .map_or(0, |heads| heads.values().map(|&c| c as u64).sum())
    }

    pub fn contains(&self, slot: &Slot) -> bool {
        self.slots.contains_key(slot)
    }

    /// Slots governed by `token`, in canonical order.
    pub fn slots_of(&self, token: &Token) -> Vec<&Slot> {
        self.slots
            .keys()
            .filter(|slot| slot.token() == token)
            .collect()
    }

    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.keys()
    }

    /// The `k` most frequent heads of a slot, ties by head text.
    pub fn top_heads(&self, slot: &Slot, k: usize) -> Vec<(&str, u32)> {
        let mut heads: Vec<(&str, u32)> = match self.slots.get(slot) {
            Some(heads) => heads.iter().map(|(h, &c)| (h.as_str(), c)).collect(),
            None => return Vec::new(),
        };
        heads.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        heads.truncate(k);
        heads
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn read_from<R: BufRead>(reader: R, source_name: &str) -> FrameResult<Self> {
        let mut table = ArgumentTable::default();
        for_each_record(reader, source_name, |fields| match fields {
            [slot, head, count] => {
                let slot: Slot = slot.parse().map_err(|e: FrameError| e.to_string())?;
                if head.is_empty() {
                    return Err("empty argument head".to_string());
                }
                table.add(slot, *head, parse_count(count)?);
                Ok(())
            }
            _ => Err(format!("expected 3 fields, found {}", fields.len())),
        })?;
        Ok(table)
    }
}

/// Joint counts of token pairs. Symmetric.
#[derive(Debug, Clone, Default)]
pub struct CooccurrenceTable {
    counts: HashMap<(Token, Token), u32>,
    total: u64,
}

impl CooccurrenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, a: Token, b: Token, count: u32) {
        let key = if a <= b { (a, b) } else { (b, a) };
        let entry = self.counts.entry(key).or_insert(0);
        *entry = entry.saturating_add(count);
        self.total = self.total.saturating_add(count as u64);
    }

    pub fn count(&self, a: &Token, b: &Token) -> u32 {
        let key = if a <= b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        };
        self.counts.get(&key).copied().unwrap_or(0)
    }

    /// Sum of all joint counts.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn read_from<R: BufRead>(reader: R, source_name: &str) -> FrameResult<Self> {
        let mut table = CooccurrenceTable::default();
        for_each_record(reader, source_name, |fields| match fields {
            [a, b, count] => {
                let a: Token = a.parse().map_err(|e: FrameError| e.to_string())?;
                let b: Token = b.parse().map_err(|e: FrameError| e.to_string())?;
                table.add(a, b, parse_count(count)?);
                Ok(())
            }
            _ => Err(format!("expected 3 fields, found {}", fields.len())),
        })?;
        Ok(table)
    }
}

/// How often two slots' arguments were found coreferent. Symmetric.
#[derive(Debug, Clone, Default)]
pub struct CorefTable {
    partners: BTreeMap<Slot, HashMap<Slot, u32>>,
}

impl CorefTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, a: Slot, b: Slot, count: u32) {
        if a != b {
            let back = self
                .partners
                .entry(b.clone())
                .or_default()
                .entry(a.clone())
                .or_insert(0);
            *back = back.saturating_add(count);
        }
        let entry = self.partners.entry(a).or_default().entry(b).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    /// Coreference partner counts of a slot.
    pub fn partners(&self, slot: &Slot) -> Option<&HashMap<Slot, u32>> {
        self.partners.get(slot)
    }

    pub fn read_from<R: BufRead>(reader: R, source_name: &str) -> FrameResult<Self> {
        let mut table = CorefTable::default();
        for_each_record(reader, source_name, |fields| match fields {
            [a, b, count] => {
                let a: Slot = a.parse().map_err(|e: FrameError| e.to_string())?;
                let b: Slot = b.parse().map_err(|e: FrameError| e.to_string())?;
                table.add(a, b, parse_count(count)?);
                Ok(())
            }
            _ => Err(format!("expected 3 fields, found {}", fields.len())),
        })?;
        Ok(table)
    }
}

/// Statistics from the domain corpus.
#[derive(Debug, Clone, Default)]
pub struct DomainTables {
    pub doc_freq: DocFrequency,
    pub arguments: ArgumentTable,
    pub cooccurrence: CooccurrenceTable,
    pub coref: CorefTable,
}

/// Statistics from a general (out-of-domain) corpus.
#[derive(Debug, Clone, Default)]
pub struct GeneralTables {
    pub doc_freq: DocFrequency,
    pub arguments: Option<ArgumentTable>,
}

/// Everything the engine reads.
#[derive(Debug, Clone, Default)]
pub struct CorpusTables {
    pub domain: DomainTables,
    pub general: Option<GeneralTables>,
    frame_arguments: BTreeMap<u32, ArgumentTable>,
    nearby_words: BTreeMap<u32, Vec<Token>>,
}

impl CorpusTables {
    pub fn new(domain: DomainTables) -> Self {
        Self {
            domain,
            ..Default::default()
        }
    }

    pub fn with_general(mut self, general: GeneralTables) -> Self {
        self.general = Some(general);
        self
    }

    /// Argument counts gathered for one frame (e.g. from documents retrieved
    /// for its triggers).
    pub fn with_frame_arguments(mut self, frame_id: u32, table: ArgumentTable) -> Self {
        self.frame_arguments.insert(frame_id, table);
        self
    }

    /// Extra tokens whose slots are considered when inducing a frame's roles.
    pub fn with_nearby_words(mut self, frame_id: u32, tokens: Vec<Token>) -> Self {
        self.nearby_words.insert(frame_id, tokens);
        self
    }

    /// Argument counts for a frame, falling back to the domain table.
    pub fn arguments_for(&self, frame_id: u32) -> &ArgumentTable {
        match self.frame_arguments.get(&frame_id) {
            Some(table) => table,
            None => {
                debug!(frame_id, "no frame-specific argument counts, using domain table");
                &self.domain.arguments
            }
        }
    }

    pub fn nearby_words(&self, frame_id: u32) -> &[Token] {
        self.nearby_words
            .get(&frame_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn general_arguments(&self) -> Option<&ArgumentTable> {
        self.general.as_ref().and_then(|g| g.arguments.as_ref())
    }

    /// Ratio of a token's domain probability to its general probability.
    ///
    /// 1.0 when either side is unknown and there is no general corpus;
    /// infinite when the token only occurs in the domain. Callers cap it.
    pub fn likelihood_ratio(&self, token: &Token) -> f64 {
        let general = match &self.general {
            Some(general) => general,
            None => return 1.0,
        };
        let domain_p = match self.domain.doc_freq.probability(token) {
            Some(p) => p,
            None => return 1.0,
        };
        match general.doc_freq.probability(token) {
            Some(general_p) => domain_p / general_p,
            None => f64::INFINITY,
        }
    }

    /// Load a table directory.
    ///
    /// `domain.idf`, `domain.args`, `domain.cooc` and `domain.coref` are
    /// required; `general.idf` and `general.args` are optional.
    pub fn load_dir(dir: &Path) -> FrameResult<Self> {
        let domain = DomainTables {
            doc_freq: read_table(dir, "domain.idf", DocFrequency::read_from)?,
            arguments: read_table(dir, "domain.args", ArgumentTable::read_from)?,
            cooccurrence: read_table(dir, "domain.cooc", CooccurrenceTable::read_from)?,
            coref: read_table(dir, "domain.coref", CorefTable::read_from)?,
        };
        let mut tables = CorpusTables::new(domain);

        if dir.join("general.idf").exists() {
            let arguments = if dir.join("general.args").exists() {
                Some(read_table(dir, "general.args", ArgumentTable::read_from)?)
            } else {
                None
            };
            tables.general = Some(GeneralTables {
                doc_freq: read_table(dir, "general.idf", DocFrequency::read_from)?,
                arguments,
            });
        } else {
            debug!(dir = %dir.display(), "no general corpus tables");
        }

        Ok(tables)
    }
}

fn read_table<T>(
    dir: &Path,
    name: &str,
    parse: impl FnOnce(BufReader<File>, &str) -> FrameResult<T>,
) -> FrameResult<T> {
    let path = dir.join(name);
    let file = File::open(&path).map_err(|e| FrameError::io(&path, e))?;
    parse(BufReader::new(file), name)
}

/// Feed every non-blank, non-comment line's tab-separated fields to `f`.
fn for_each_record<R: BufRead>(
    reader: R,
    source_name: &str,
    mut f: impl FnMut(&[&str]) -> Result<(), String>,
) -> FrameResult<()> {
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| FrameError::Table {
            source_name: source_name.to_string(),
            line: line_no,
            message: e.to_string(),
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = trimmed.split('\t').map(str::trim).collect();
        f(&fields).map_err(|message| FrameError::Table {
            source_name: source_name.to_string(),
            line: line_no,
            message,
        })?;
    }
    Ok(())
}

fn parse_count<T: std::str::FromStr>(field: &str) -> Result<T, String> {
    field
        .parse()
        .map_err(|_| format!("expected a non-negative count, found {:?}", field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_doc_frequency_parse() {
        let text = "# idf\n*total*\t1300\nv-kidnap\t211\t530\nn-kidnapping\t90\t120\n";
        let table = DocFrequency::read_from(text.as_bytes(), "domain.idf").unwrap();
        assert_eq!(table.total_docs(), 1300);
        assert_eq!(table.docs(&Token::verb("kidnap")), 211);
        assert_eq!(table.total_tokens(), 650);
        assert_eq!(table.docs(&Token::verb("bomb")), 0);
    }

    #[test]
    fn test_doc_frequency_requires_total() {
        let err = DocFrequency::read_from("v-kidnap\t1\t2\n".as_bytes(), "domain.idf").unwrap_err();
        assert!(matches!(err, FrameError::Table { line: 0, .. }));
    }

    #[test]
    fn test_malformed_line_reports_position() {
        let text = "v-kidnap:s\tguerrilla\t4\nv-kidnap:o\tmayor\tmany\n";
        match ArgumentTable::read_from(text.as_bytes(), "domain.args") {
            Err(FrameError::Table {
                source_name, line, ..
            }) => {
                assert_eq!(source_name, "domain.args");
                assert_eq!(line, 2);
            }
            other => panic!("expected table error, got {:?}", other),
        }
    }

    #[test]
    fn test_argument_table_accumulates() {
        let text = "v-kidnap:o\tmayor\t4\nv-kidnap:o\tmayor\t3\nv-kidnap:o\tpresident\t9\n";
        let table = ArgumentTable::read_from(text.as_bytes(), "domain.args").unwrap();
        let slot: Slot = "v-kidnap:o".parse().unwrap();
        assert_eq!(table.count(&slot, "mayor"), 7);
        assert_eq!(table.total(&slot), 16);
        assert_eq!(table.top_heads(&slot, 1), vec![("president", 9)]);
        assert_eq!(table.slots_of(&Token::verb("kidnap")), vec![&slot]);
    }

    #[test]
    fn test_cooccurrence_is_symmetric() {
        let mut table = CooccurrenceTable::new();
        table.add(Token::verb("release"), Token::verb("kidnap"), 6);
        table.add(Token::verb("kidnap"), Token::verb("release"), 1);
        assert_eq!(table.count(&Token::verb("kidnap"), &Token::verb("release")), 7);
        assert_eq!(table.count(&Token::verb("release"), &Token::verb("kidnap")), 7);
        assert_eq!(table.total(), 7);
    }

    #[test]
    fn test_coref_is_symmetric() {
        let a: Slot = "v-kidnap:o".parse().unwrap();
        let b: Slot = "v-release:o".parse().unwrap();
        let mut table = CorefTable::new();
        table.add(a.clone(), b.clone(), 5);
        assert_eq!(table.partners(&a).unwrap()[&b], 5);
        assert_eq!(table.partners(&b).unwrap()[&a], 5);
    }

    #[test]
    fn test_counts_saturate() {
        let text = "v-kidnap:o\tmayor\t4294967295\nv-kidnap:o\tmayor\t5\n";
        let table = ArgumentTable::read_from(text.as_bytes(), "domain.args").unwrap();
        let slot: Slot = "v-kidnap:o".parse().unwrap();
        assert_eq!(table.count(&slot, "mayor"), u32::MAX);

        let mut idf = DocFrequency::new(10);
        idf.insert(Token::verb("kidnap"), u32::MAX - 1, 3);
        idf.insert(Token::verb("kidnap"), 2, u64::MAX);
        assert_eq!(idf.docs(&Token::verb("kidnap")), u32::MAX);
        assert_eq!(idf.total_tokens(), u64::MAX);

        let mut cooc = CooccurrenceTable::new();
        cooc.add(Token::verb("kidnap"), Token::verb("free"), u32::MAX);
        cooc.add(Token::verb("free"), Token::verb("kidnap"), 1);
        assert_eq!(cooc.count(&Token::verb("kidnap"), &Token::verb("free")), u32::MAX);

        let other: Slot = "v-free:o".parse().unwrap();
        let mut coref = CorefTable::new();
        coref.add(slot.clone(), other.clone(), u32::MAX);
        coref.add(other.clone(), slot.clone(), 1);
        assert_eq!(coref.partners(&slot).unwrap()[&other], u32::MAX);
    }

    #[test]
    fn test_frame_tables_fall_back_to_domain() {
        let mut domain = DomainTables::default();
        domain
            .arguments
            .add("v-kidnap:o".parse().unwrap(), "mayor", 3);
        let mut frame_table = ArgumentTable::new();
        frame_table.add("v-kidnap:o".parse().unwrap(), "mayor", 30);

        let tables = CorpusTables::new(domain).with_frame_arguments(1, frame_table);
        let slot: Slot = "v-kidnap:o".parse().unwrap();
        assert_eq!(tables.arguments_for(1).count(&slot, "mayor"), 30);
        assert_eq!(tables.arguments_for(2).count(&slot, "mayor"), 3);
    }

    #[test]
    fn test_likelihood_ratio() {
        let mut domain = DomainTables::default();
        domain.doc_freq.insert(Token::verb("kidnap"), 10, 40);
        domain.doc_freq.insert(Token::verb("say"), 10, 60);
        let mut general = GeneralTables::default();
        general.doc_freq.insert(Token::verb("kidnap"), 1, 1);
        general.doc_freq.insert(Token::verb("say"), 99, 99);

        let tables = CorpusTables::new(domain.clone());
        assert_eq!(tables.likelihood_ratio(&Token::verb("kidnap")), 1.0);

        let tables = CorpusTables::new(domain).with_general(general);
        assert!((tables.likelihood_ratio(&Token::verb("kidnap")) - 40.0).abs() < 1e-9);
        assert!(tables.likelihood_ratio(&Token::verb("say")) < 1.0);
        assert_eq!(tables.likelihood_ratio(&Token::verb("bomb")), 1.0);
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("domain.idf"), "*total*\t50\nv-kidnap\t20\t25\n").unwrap();
        fs::write(dir.path().join("domain.args"), "v-kidnap:o\tmayor\t4\n").unwrap();
        fs::write(dir.path().join("domain.cooc"), "").unwrap();
        fs::write(dir.path().join("domain.coref"), "# none\n").unwrap();

        let tables = CorpusTables::load_dir(dir.path()).unwrap();
        assert_eq!(tables.domain.doc_freq.total_docs(), 50);
        assert!(tables.general.is_none());

        fs::remove_file(dir.path().join("domain.coref")).unwrap();
        assert!(matches!(
            CorpusTables::load_dir(dir.path()),
            Err(FrameError::Io { .. })
        ));
    }
}
