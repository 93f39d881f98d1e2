use crate::{
    ArgumentTable, CorpusTables, DomainTables, Frame, InductionConfig, Slot, Token, TriggerToken,
    WordListLexicon,
};

pub fn slot(key: &str) -> Slot {
    key.parse().unwrap()
}

pub fn token(key: &str) -> Token {
    key.parse().unwrap()
}

pub fn lexicon() -> WordListLexicon {
    WordListLexicon::new()
        .with_persons(&["guerrilla", "rebel", "president", "mayor", "terrorist", "police"])
        .with_locations(&["embassy", "town"])
        .with_physical_objects(&["car", "bomb", "building"])
        .with_materials(&["dynamite"])
        .with_vocabulary(&["thing", "way"])
}

/// Argument counts where perpetrators (subjects) and victims (objects) are
/// drawn from disjoint sets of heads.
pub fn kidnap_arguments() -> ArgumentTable {
    let mut args = ArgumentTable::new();
    for (key, head, count) in [
        ("v-kidnap:s", "guerrilla", 120),
        ("v-kidnap:s", "rebel", 80),
        ("v-kidnap:o", "president", 100),
        ("v-kidnap:o", "mayor", 100),
        ("v-abduct:s", "guerrilla", 60),
        ("v-abduct:s", "rebel", 60),
        ("v-abduct:o", "president", 60),
        ("v-abduct:o", "mayor", 40),
        ("v-release:s", "guerrilla", 40),
        ("v-release:s", "rebel", 40),
        ("v-release:o", "president", 40),
        ("v-release:o", "mayor", 30),
        ("n-kidnapping:p_of", "president", 30),
        ("n-kidnapping:p_of", "mayor", 30),
    ] {
        args.add(slot(key), head, count);
    }
    args
}

pub fn kidnap_domain() -> DomainTables {
    let mut domain = DomainTables::default();
    domain.doc_freq = crate::DocFrequency::new(1000);
    for key in ["v-kidnap", "v-abduct", "v-release", "n-kidnapping"] {
        domain.doc_freq.insert(token(key), 100, 150);
    }
    domain.arguments = kidnap_arguments();
    domain
}

/// Coreference makes v-abduct:o look like v-kidnap:s. The link is weaker
/// than any link inside the subject or the object group, so both groups are
/// complete before it is considered.
pub fn spurious_link_domain() -> DomainTables {
    let mut domain = kidnap_domain();
    domain.coref.add(slot("v-kidnap:s"), slot("n-ransom:p_for"), 10);
    domain.coref.add(slot("v-abduct:o"), slot("n-ransom:p_for"), 10);
    domain.coref.add(slot("v-abduct:o"), slot("n-negotiation:p_with"), 5);
    domain
}

pub fn kidnap_tables() -> CorpusTables {
    CorpusTables::new(kidnap_domain())
}

pub fn kidnap_frame() -> Frame {
    Frame::new(
        0,
        ["v-kidnap", "v-abduct", "v-release", "n-kidnapping"]
            .iter()
            .map(|key| TriggerToken {
                token: token(key),
                score: 1.0,
            })
            .collect(),
    )
}

pub fn config() -> InductionConfig {
    InductionConfig::default().with_occurrence_floor(10)
}

/// Two frames worth of co-occurrence: kidnap/abduct/release and
/// bomb/explode, plus "say", which is everywhere.
pub fn news_domain() -> DomainTables {
    let mut domain = kidnap_domain();
    for key in ["v-bomb", "v-explode"] {
        domain.doc_freq.insert(token(key), 80, 100);
    }
    domain.doc_freq.insert(token("v-say"), 900, 2000);
    for (a, b, count) in [
        ("v-kidnap", "v-abduct", 60),
        ("v-kidnap", "v-release", 50),
        ("v-abduct", "v-release", 40),
        ("v-bomb", "v-explode", 50),
        ("v-say", "v-kidnap", 40),
        ("v-say", "v-bomb", 30),
    ] {
        domain.cooccurrence.add(token(a), token(b), count);
    }
    for (key, head, count) in [
        ("v-bomb:s", "terrorist", 150),
        ("v-bomb:s", "guerrilla", 90),
        ("v-bomb:o", "building", 120),
        ("v-bomb:o", "embassy", 60),
        ("v-explode:s", "bomb", 140),
        ("v-explode:s", "dynamite", 100),
    ] {
        domain.arguments.add(slot(key), head, count);
    }
    domain
}
