use super::support::{config, kidnap_domain, kidnap_frame, kidnap_tables, lexicon, slot, token};
use crate::{
    CorpusTables, Frame, InductionCache, InductionContext, Role, RoleMaintenance, Slot, SlotType,
};

fn person_role(keys: &[&str]) -> Role {
    Role::new(SlotType::Person, keys.iter().map(|k| slot(k)).collect())
}

fn frame_with(roles: Vec<Role>) -> Frame {
    let mut frame = kidnap_frame();
    frame.set_roles(roles);
    frame
}

fn role_slots(frame: &Frame) -> Vec<Vec<Slot>> {
    frame.roles().iter().map(|r| r.slots().to_vec()).collect()
}

#[test]
fn test_merge_roles_takes_the_union() {
    let tables = kidnap_tables();
    let lexicon = lexicon();
    let config = config();
    let ctx = InductionContext::new(&tables, &lexicon, &config);
    let mut frame = frame_with(vec![
        person_role(&["v-kidnap:o"]),
        person_role(&["v-abduct:o", "n-kidnapping:p_of"]),
        person_role(&["v-kidnap:s"]),
    ]);

    let merges = RoleMaintenance::new(&ctx).merge_roles(&mut frame, 0.3, &mut InductionCache::new());
    assert_eq!(merges, 1);
    assert_eq!(
        role_slots(&frame),
        vec![
            vec![slot("v-abduct:o"), slot("v-kidnap:o"), slot("n-kidnapping:p_of")],
            vec![slot("v-kidnap:s")],
        ]
    );
    // merged roles are re-ranked
    assert_eq!(frame.roles()[0].ranked_argument_heads()[0].head, "president");
}

#[test]
fn test_merge_roles_is_bounded_and_greedy() {
    let tables = kidnap_tables();
    let lexicon = lexicon();
    let config = config();
    let ctx = InductionContext::new(&tables, &lexicon, &config);
    let mut frame = frame_with(vec![
        person_role(&["v-kidnap:o"]),
        person_role(&["v-abduct:o"]),
        person_role(&["v-release:o"]),
        person_role(&["n-kidnapping:p_of"]),
    ]);

    let merges = RoleMaintenance::new(&ctx).merge_roles(&mut frame, 0.3, &mut InductionCache::new());
    assert_eq!(merges, 3);
    assert_eq!(frame.roles().len(), 1);
    assert_eq!(frame.roles()[0].slots().len(), 4);
}

#[test]
fn test_merge_roles_respects_cutoff_and_types() {
    let tables = kidnap_tables();
    let lexicon = lexicon();
    let config = config();
    let ctx = InductionContext::new(&tables, &lexicon, &config);
    let mut frame = frame_with(vec![
        person_role(&["v-kidnap:o"]),
        Role::new(SlotType::Location, vec![slot("v-abduct:o")]),
    ]);
    let maintenance = RoleMaintenance::new(&ctx);
    assert_eq!(maintenance.merge_roles(&mut frame, 0.3, &mut InductionCache::new()), 0);

    let mut frame = frame_with(vec![person_role(&["v-kidnap:o"]), person_role(&["v-abduct:o"])]);
    // the two slots associate at about 0.98
    assert_eq!(maintenance.merge_roles(&mut frame, 0.99, &mut InductionCache::new()), 0);
    assert_eq!(frame.roles().len(), 2);
}

#[test]
fn test_guard_blocks_merging_perpetrators_and_victims() {
    // the two abduct slots share coreference partners, so the role sets
    // associate even though their argument heads are disjoint
    let mut domain = kidnap_domain();
    domain
        .coref
        .add(slot("v-abduct:s"), slot("n-negotiation:p_with"), 10);
    domain
        .coref
        .add(slot("v-abduct:o"), slot("n-negotiation:p_with"), 10);
    let tables = CorpusTables::new(domain);
    let lexicon = lexicon();
    let config = config();
    let ctx = InductionContext::new(&tables, &lexicon, &config);
    let mut cache = InductionCache::new();

    let mut frame = frame_with(vec![
        person_role(&["v-kidnap:s", "v-abduct:s"]),
        person_role(&["v-kidnap:o", "v-abduct:o"]),
    ]);
    let score = cache.slot_set_association(
        &ctx,
        0,
        SlotType::Person,
        frame.roles()[0].slots(),
        frame.roles()[1].slots(),
    );
    assert!((score - 0.5).abs() < 1e-12);

    let merges = RoleMaintenance::new(&ctx).merge_roles(&mut frame, 0.3, &mut cache);
    assert_eq!(merges, 0);
    assert_eq!(frame.roles().len(), 2);
}

#[test]
fn test_remove_roles_keeps_roles_at_the_floor() {
    let tables = kidnap_tables();
    let lexicon = lexicon();
    let config = config();
    let ctx = InductionContext::new(&tables, &lexicon, &config);
    let mut frame = frame_with(vec![
        person_role(&["v-release:o"]),
        person_role(&["v-kidnap:s"]),
        person_role(&["n-kidnapping:p_of"]),
        person_role(&["v-release:s", "v-release:o", "n-kidnapping:p_of"]),
    ]);

    let removed = RoleMaintenance::new(&ctx).remove_roles(&mut frame);
    assert_eq!(removed, 2);
    // 200 exactly, and 80 + 70 + 60
    assert_eq!(
        role_slots(&frame),
        vec![
            vec![slot("v-kidnap:s")],
            vec![slot("v-release:s"), slot("v-release:o"), slot("n-kidnapping:p_of")],
        ]
    );

    let config = config.with_min_role_evidence(0);
    let ctx = InductionContext::new(&tables, &lexicon, &config);
    let mut frame = frame_with(vec![person_role(&["v-bomb:o"])]);
    assert_eq!(RoleMaintenance::new(&ctx).remove_roles(&mut frame), 0);
}

#[test]
fn test_force_triggers_into_slots() {
    let tables = kidnap_tables();
    let lexicon = lexicon();
    let config = config();
    let ctx = InductionContext::new(&tables, &lexicon, &config);
    let mut frame = frame_with(vec![
        person_role(&["v-abduct:o", "v-release:o"]),
        person_role(&["v-abduct:s"]),
    ]);

    let added =
        RoleMaintenance::new(&ctx).force_triggers_into_slots(&mut frame, &mut InductionCache::new());
    assert_eq!(added, 3);
    assert_eq!(frame.role_of(&slot("v-kidnap:o")), Some(0));
    assert_eq!(frame.role_of(&slot("v-kidnap:s")), Some(1));
    assert_eq!(frame.role_of(&slot("v-release:s")), Some(1));
    // only subjects and objects are forced
    assert_eq!(frame.role_of(&slot("n-kidnapping:p_of")), None);
}

fn weak_victim_tables(key: &str) -> CorpusTables {
    let mut domain = kidnap_domain();
    domain.arguments.add(slot(key), "president", 10);
    domain.arguments.add(slot(key), "police", 30);
    CorpusTables::new(domain)
}

#[test]
fn test_add_slots_cutoff() {
    let tables = weak_victim_tables("v-free:o");
    let lexicon = lexicon();
    let config = config();
    let ctx = InductionContext::new(&tables, &lexicon, &config);
    let maintenance = RoleMaintenance::new(&ctx);
    let mut cache = InductionCache::new();

    let mut frame = frame_with(vec![person_role(&["v-kidnap:o"]), person_role(&["v-kidnap:s"])]);
    let score = cache.slot_set_association(
        &ctx,
        0,
        SlotType::Person,
        &[slot("v-free:o")],
        frame.roles()[0].slots(),
    );
    assert!(score > 0.1 && score < 0.3);

    assert_eq!(maintenance.add_slots_to_roles(&[slot("v-free:o")], &mut frame, true, &mut cache), 0);
    assert_eq!(
        maintenance.add_slots_to_roles(&[slot("v-free:o")], &mut frame, false, &mut cache),
        1
    );
    assert_eq!(frame.role_of(&slot("v-free:o")), Some(0));
    // already assigned
    assert_eq!(
        maintenance.add_slots_to_roles(&[slot("v-free:o")], &mut frame, false, &mut cache),
        0
    );
}

#[test]
fn test_verb_subject_acceptance_override() {
    let tables = weak_victim_tables("v-free:s");
    let lexicon = lexicon();
    let config = config();
    let ctx = InductionContext::new(&tables, &lexicon, &config);
    let mut frame = frame_with(vec![person_role(&["v-kidnap:o"])]);
    let added = RoleMaintenance::new(&ctx).add_slots_to_roles(
        &[slot("v-free:s")],
        &mut frame,
        true,
        &mut InductionCache::new(),
    );
    assert_eq!(added, 1);

    let mut strict = config.clone();
    strict.maintenance.accept_verb_subjects = false;
    let ctx = InductionContext::new(&tables, &lexicon, &strict);
    let mut frame = frame_with(vec![person_role(&["v-kidnap:o"])]);
    let added = RoleMaintenance::new(&ctx).add_slots_to_roles(
        &[slot("v-free:s")],
        &mut frame,
        true,
        &mut InductionCache::new(),
    );
    assert_eq!(added, 0);
}

#[test]
fn test_add_slots_ties_keep_the_first_role() {
    let mut domain = kidnap_domain();
    domain.arguments.add(slot("v-seize:o"), "president", 100);
    domain.arguments.add(slot("v-seize:o"), "mayor", 100);
    let tables = CorpusTables::new(domain);
    let lexicon = lexicon();
    let config = config();
    let ctx = InductionContext::new(&tables, &lexicon, &config);

    let mut frame = frame_with(vec![
        person_role(&["v-kidnap:s"]),
        person_role(&["v-seize:o"]),
        person_role(&["v-kidnap:o"]),
    ]);
    let added = RoleMaintenance::new(&ctx).add_slots_to_roles(
        &[slot("v-abduct:o")],
        &mut frame,
        true,
        &mut InductionCache::new(),
    );
    assert_eq!(added, 1);
    assert_eq!(frame.role_of(&slot("v-abduct:o")), Some(1));
}

#[test]
fn test_add_tokens_to_frame() {
    let tables = kidnap_tables();
    let lexicon = lexicon();
    let config = config();
    let ctx = InductionContext::new(&tables, &lexicon, &config);
    let mut frame = Frame::new(0, Vec::new());
    frame.add_trigger(crate::TriggerToken {
        token: token("v-kidnap"),
        score: 1.0,
    });
    frame.set_roles(vec![
        person_role(&["v-abduct:s", "v-kidnap:s"]),
        person_role(&["v-abduct:o", "v-kidnap:o"]),
    ]);

    let maintenance = RoleMaintenance::new(&ctx);
    let mut cache = InductionCache::new();
    let added =
        maintenance.add_tokens_to_frame(&mut frame, &[token("v-release"), token("v-kidnap")], &mut cache);
    assert_eq!(added, 2);
    assert!(frame.has_trigger(&token("v-release")));
    assert_eq!(frame.tokens().len(), 2);
    assert_eq!(frame.role_of(&slot("v-release:s")), Some(0));
    assert_eq!(frame.role_of(&slot("v-release:o")), Some(1));

    assert_eq!(maintenance.add_tokens_to_frame(&mut frame, &[token("v-release")], &mut cache), 0);
}
