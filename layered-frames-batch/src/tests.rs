use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use layered_frames::{
    induce_all_frames, CorpusTables, Frame, FrameInducer, InductionCache, InductionConfig,
    InductionContext, TriggerToken, WordListLexicon,
};

use crate::{
    run_batch, wait_for_frames, BatchError, DirectoryClaims, Fingerprint, FrameOutputDir,
    MemoryClaims, PollOptions, RoleWorker, WorkClaims, WorkOutcome,
};

const DOMAIN_IDF: &str = "\
# token\tdocs\ttotal
*total*\t1000
v-kidnap\t100\t150
v-abduct\t100\t150
v-release\t100\t150
n-kidnapping\t100\t150
v-bomb\t80\t100
v-explode\t80\t100
v-say\t900\t2000
";

const DOMAIN_ARGS: &str = "\
v-kidnap:s\tguerrilla\t120
v-kidnap:s\trebel\t80
v-kidnap:o\tpresident\t100
v-kidnap:o\tmayor\t100
v-abduct:s\tguerrilla\t60
v-abduct:s\trebel\t60
v-abduct:o\tpresident\t60
v-abduct:o\tmayor\t40
v-release:s\tguerrilla\t40
v-release:s\trebel\t40
v-release:o\tpresident\t40
v-release:o\tmayor\t30
n-kidnapping:p_of\tpresident\t30
n-kidnapping:p_of\tmayor\t30
v-bomb:s\tterrorist\t150
v-bomb:s\tguerrilla\t90
v-bomb:o\tbuilding\t120
v-bomb:o\tembassy\t60
v-explode:s\tbomb\t140
v-explode:s\tdynamite\t100
";

const DOMAIN_COOC: &str = "\
v-kidnap\tv-abduct\t60
v-kidnap\tv-release\t50
v-abduct\tv-release\t40
v-bomb\tv-explode\t50
v-say\tv-kidnap\t40
v-say\tv-bomb\t30
";

fn write_tables(dir: &Path) -> CorpusTables {
    fs::write(dir.join("domain.idf"), DOMAIN_IDF).unwrap();
    fs::write(dir.join("domain.args"), DOMAIN_ARGS).unwrap();
    fs::write(dir.join("domain.cooc"), DOMAIN_COOC).unwrap();
    fs::write(dir.join("domain.coref"), "# no coreference counts\n").unwrap();
    CorpusTables::load_dir(dir).unwrap()
}

fn lexicon() -> WordListLexicon {
    WordListLexicon::new()
        .with_persons(&["guerrilla", "rebel", "president", "mayor", "terrorist", "police"])
        .with_locations(&["embassy", "town"])
        .with_physical_objects(&["car", "bomb", "building"])
        .with_materials(&["dynamite"])
        .with_vocabulary(&["thing", "way"])
}

fn config() -> InductionConfig {
    InductionConfig::default().with_occurrence_floor(10)
}

fn quick_poll() -> PollOptions {
    PollOptions {
        interval: Duration::from_millis(5),
        max_wait: Duration::from_secs(5),
    }
}

#[test]
fn test_batch_matches_single_process_induction() {
    let dir = tempfile::tempdir().unwrap();
    let tables = write_tables(dir.path());
    let lexicon = lexicon();
    let config = config();
    let ctx = InductionContext::new(&tables, &lexicon, &config);
    let output = FrameOutputDir::new(dir.path().join("frames"), Fingerprint::of(&config)).unwrap();

    let frames = run_batch(
        &ctx,
        &MemoryClaims::new(),
        &output,
        &quick_poll(),
        &AtomicBool::new(false),
    )
    .unwrap();
    assert_eq!(frames.len(), 2);
    assert!(frames.iter().all(|frame| !frame.roles().is_empty()));
    assert_eq!(frames, induce_all_frames(&tables, &lexicon, &config));
}

#[test]
fn test_second_worker_skips_claimed_frames() {
    let dir = tempfile::tempdir().unwrap();
    let tables = write_tables(dir.path());
    let lexicon = lexicon();
    let config = config();
    let ctx = InductionContext::new(&tables, &lexicon, &config);
    let output = FrameOutputDir::new(dir.path().join("frames"), Fingerprint::of(&config)).unwrap();
    let claims = DirectoryClaims::new(dir.path().join("claims")).unwrap();
    let frames = FrameInducer::new(&ctx).cluster_tokens();

    let first = RoleWorker::new(&ctx, &claims, &output)
        .process_all(&frames[..1], &mut InductionCache::new())
        .unwrap();
    assert_eq!(first, vec![WorkOutcome::Written(output.path_for(0))]);

    let mut cache = InductionCache::new();
    let second = RoleWorker::new(&ctx, &claims, &output)
        .process_all(&frames, &mut cache)
        .unwrap();
    assert_eq!(
        second,
        vec![
            WorkOutcome::ClaimedElsewhere,
            WorkOutcome::Written(output.path_for(1)),
        ]
    );
    // per-frame scores are dropped once a frame is written
    assert!(cache.is_empty());
    assert_eq!(output.frame_ids().unwrap(), vec![0, 1]);
}

#[test]
fn test_abandoned_claim_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let tables = write_tables(dir.path());
    let lexicon = lexicon();
    let config = config();
    let ctx = InductionContext::new(&tables, &lexicon, &config);
    let output = FrameOutputDir::new(dir.path().join("frames"), Fingerprint::of(&config)).unwrap();
    let claims = MemoryClaims::new();
    // claimed by a worker that never finishes
    assert!(claims.try_claim(1).unwrap());

    let options = PollOptions {
        interval: Duration::from_millis(5),
        max_wait: Duration::from_millis(40),
    };
    match run_batch(&ctx, &claims, &output, &options, &AtomicBool::new(false)) {
        Err(BatchError::Timeout {
            expected, found, ..
        }) => {
            assert_eq!(expected, 2);
            assert_eq!(found, 1);
        }
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[test]
fn test_wait_picks_up_late_frames() {
    let dir = tempfile::tempdir().unwrap();
    let output = Arc::new(
        FrameOutputDir::new(dir.path(), Fingerprint::of(&InductionConfig::default())).unwrap(),
    );
    let frame = Frame::new(
        0,
        vec![TriggerToken {
            token: "v-kidnap".parse().unwrap(),
            score: 1.0,
        }],
    );

    let writer = {
        let output = Arc::clone(&output);
        let frame = frame.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            output.write_frame(&frame).unwrap();
        })
    };
    let frames = wait_for_frames(&output, 1, &quick_poll(), &AtomicBool::new(false)).unwrap();
    writer.join().unwrap();
    assert_eq!(frames, vec![frame]);
}

#[test]
fn test_stale_frame_files_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let output = FrameOutputDir::new(dir.path(), Fingerprint::of(&InductionConfig::default())).unwrap();
    let frame = |id: u32| {
        Frame::new(
            id,
            vec![TriggerToken {
                token: "v-kidnap".parse().unwrap(),
                score: 1.0,
            }],
        )
    };
    // left over from a run that produced more frames
    output.write_frame(&frame(5)).unwrap();
    output.write_frame(&frame(0)).unwrap();

    let options = PollOptions {
        interval: Duration::from_millis(5),
        max_wait: Duration::from_millis(30),
    };
    match wait_for_frames(&output, 2, &options, &AtomicBool::new(false)) {
        Err(BatchError::Timeout {
            expected, found, ..
        }) => {
            assert_eq!(expected, 2);
            assert_eq!(found, 1);
        }
        other => panic!("expected timeout, got {:?}", other),
    }

    output.write_frame(&frame(1)).unwrap();
    let frames = wait_for_frames(&output, 2, &quick_poll(), &AtomicBool::new(false)).unwrap();
    assert_eq!(frames, vec![frame(0), frame(1)]);
}

#[test]
fn test_cancelled_wait() {
    let dir = tempfile::tempdir().unwrap();
    let output = FrameOutputDir::new(dir.path(), Fingerprint::of(&InductionConfig::default())).unwrap();
    let cancel = Arc::new(AtomicBool::new(false));

    let canceller = {
        let cancel = Arc::clone(&cancel);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            cancel.store(true, Ordering::Relaxed);
        })
    };
    let result = wait_for_frames(&output, 3, &quick_poll(), &cancel);
    canceller.join().unwrap();
    assert!(matches!(result, Err(BatchError::Cancelled)));
}
