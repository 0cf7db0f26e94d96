use std::path::Path;
use std::sync::{Arc, Mutex};

use penprint_core::compressor::CompressorSettings;
use penprint_core::error::PenprintError;
use penprint_core::evaluation::{load_references, run_evaluation};
use penprint_core::loader::load_text;
use penprint_core::models::{
    EvaluationOptions, LabeledSource, LoadStatus, ProgressUpdate,
};
use penprint_core::progress::ProgressCallback;

const HARBOR: &[&str] = &[
    "harbor", "lantern", "salt", "rope", "tide", "gull", "anchor", "sail", "mast", "keel",
    "the", "of", "and", "drifted", "under",
];
const FORGE: &[&str] = &[
    "ember", "forge", "anvil", "iron", "bellows", "hammer", "soot", "coal", "tongs", "slag",
    "a", "with", "beside", "glowed", "struck",
];

fn prose(vocab: &[&str], seed: u64, words: usize) -> String {
    let mut state = seed;
    let mut out = String::new();
    for i in 0..words {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        out.push_str(vocab[(state >> 33) as usize % vocab.len()]);
        out.push_str(if i % 11 == 10 { ". " } else { " " });
    }
    out
}

fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).expect("write fixture");
    path
}

/// Two reference authors and held-out test text for each.
fn two_author_options(dir: &Path) -> EvaluationOptions {
    let harbor_ref = write(dir, "harbor-train.txt", &prose(HARBOR, 1, 1200));
    let forge_ref = write(dir, "forge-train.txt", &prose(FORGE, 2, 1200));
    let harbor_test = write(dir, "harbor-test.txt", &prose(HARBOR, 3, 400));
    let forge_test = write(dir, "forge-test.txt", &prose(FORGE, 4, 400));

    EvaluationOptions {
        references: vec![
            LabeledSource::new("harbor", harbor_ref),
            LabeledSource::new("forge", forge_ref),
        ],
        tests: vec![
            LabeledSource::new("harbor", harbor_test),
            LabeledSource::new("forge", forge_test),
        ],
        corpus_size: 10_000,
        fragment_count: 4,
        fragment_size: 400,
        threads: 2,
        ..EvaluationOptions::default()
    }
}

#[tokio::test]
async fn held_out_fragments_land_on_their_own_author() {
    let dir = tempfile::tempdir().expect("temp dir");
    let report = run_evaluation(two_author_options(dir.path()), None)
        .await
        .expect("evaluation should succeed");

    let matrix = &report.matrix;
    assert_eq!(matrix.labels(), ["harbor", "forge"]);
    assert!(matrix.count("harbor", "harbor") >= 3, "{:?}", matrix.grid());
    assert!(matrix.count("forge", "forge") >= 3, "{:?}", matrix.grid());
    assert_eq!(report.metadata.fragments_classified, 8);
    assert_eq!(report.metadata.degraded_sources, 0);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
}

#[tokio::test]
async fn row_totals_equal_fragments_per_test_source() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut options = two_author_options(dir.path());
    let short = write(dir.path(), "short.txt", &"x".repeat(1_200));
    options.tests.push(LabeledSource::new("short", short));

    let report = run_evaluation(options, None).await.expect("evaluation");

    for summary in &report.tests {
        assert_eq!(
            report.matrix.row_total(&summary.label),
            summary.fragments.unwrap_or_default() as u64,
            "row {}",
            summary.label
        );
    }
    assert_eq!(report.matrix.total(), report.metadata.fragments_classified as u64);
}

#[tokio::test]
async fn short_test_text_is_truncated_and_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut options = two_author_options(dir.path());
    let short = write(dir.path(), "short.txt", &prose(HARBOR, 9, 200));
    options.tests = vec![LabeledSource::new("harbor", short)];

    let report = run_evaluation(options, None).await.expect("evaluation");
    let produced = report.tests[0].fragments.expect("fragment count");

    assert!(produced < 4);
    assert!(
        report
            .warnings
            .iter()
            .any(|w| w.contains(&format!("produced {produced} of 4 fragments"))),
        "{:?}",
        report.warnings
    );
}

#[tokio::test]
async fn missing_inputs_degrade_instead_of_aborting() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut options = two_author_options(dir.path());
    options
        .references
        .push(LabeledSource::new("ghost", dir.path().join("no-such-reference.txt")));
    options
        .tests
        .push(LabeledSource::new("phantom", dir.path().join("no-such-test.txt")));

    let report = run_evaluation(options, None).await.expect("run should continue");

    let ghost = report
        .references
        .iter()
        .find(|s| s.label == "ghost")
        .expect("ghost summary");
    assert_eq!(ghost.status, LoadStatus::Missing);
    assert_eq!(ghost.chars, 0);

    assert!(report.warnings.iter().any(|w| w.contains("[ghost] file not found")));
    assert!(report.warnings.iter().any(|w| w.contains("[phantom] file not found")));
    assert_eq!(report.matrix.labels(), ["harbor", "forge", "phantom"]);
    assert_eq!(report.matrix.row_total("phantom"), 0);
    assert_eq!(report.metadata.degraded_sources, 2);
}

#[tokio::test]
async fn no_reference_sources_is_fatal() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut options = two_author_options(dir.path());
    options.references.clear();

    let err = run_evaluation(options, None)
        .await
        .expect_err("empty reference set must fail");
    assert!(matches!(err, PenprintError::EmptyReferenceSet));
}

#[tokio::test]
async fn identical_inputs_produce_identical_matrices() {
    let dir = tempfile::tempdir().expect("temp dir");
    let options = two_author_options(dir.path());

    let first = run_evaluation(options.clone(), None).await.expect("first run");
    let second = run_evaluation(
        EvaluationOptions {
            threads: 1,
            ..options
        },
        None,
    )
    .await
    .expect("second run");

    assert_eq!(first.matrix, second.matrix);
    assert_eq!(
        first.metadata.input_fingerprint,
        second.metadata.input_fingerprint
    );
    assert_ne!(first.run_id, second.run_id);
}

#[tokio::test]
async fn progress_reaches_completion() {
    let dir = tempfile::tempdir().expect("temp dir");
    let seen: Arc<Mutex<Vec<ProgressUpdate>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let callback = Arc::new(move |update: ProgressUpdate| {
        sink.lock().expect("sink").push(update);
    }) as ProgressCallback;

    run_evaluation(two_author_options(dir.path()), Some(callback))
        .await
        .expect("evaluation");

    let seen = seen.lock().expect("sink");
    let complete: Vec<_> = seen.iter().filter(|u| u.percent == 100).collect();
    assert_eq!(complete.len(), 1, "{seen:?}");
    assert_eq!(complete[0].processed, 8);
    assert!(seen.iter().all(|u| u.total == 8 && u.phase == "classify"));
}

#[tokio::test]
async fn alternate_compressor_is_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let options = EvaluationOptions {
        compressor: CompressorSettings::Deflate { level: 9 },
        ..two_author_options(dir.path())
    };

    let report = run_evaluation(options, None).await.expect("evaluation");
    assert_eq!(report.compressor, "deflate(level=9)");
    assert_eq!(report.metadata.fragments_classified, 8);
}

#[tokio::test]
async fn load_references_respects_character_budget() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write(dir.path(), "amharic.txt", &"ሰላም ".repeat(100));
    let mut warnings = Vec::new();

    let references = load_references(
        &[
            LabeledSource::new("am", path),
            LabeledSource::new("none", dir.path().join("absent.txt")),
        ],
        10,
        &mut warnings,
    )
    .await;

    let corpus = references.get("am").expect("am corpus");
    assert_eq!(corpus.text.chars().count(), 10);
    assert_eq!(corpus.text, "ሰላም ሰላም ሰላ");
    assert_eq!(references.get("none").map(|c| c.text.as_str()), Some(""));
    assert_eq!(warnings.len(), 1);
}

#[tokio::test]
async fn unreadable_inputs_degrade_with_warning() {
    let dir = tempfile::tempdir().expect("temp dir");

    let loaded = load_text(dir.path(), 100).await;
    assert!(matches!(loaded.status, LoadStatus::Unreadable { .. }));
    assert!(loaded.text.is_empty());
    assert!(
        loaded
            .diagnostic()
            .is_some_and(|d| d.starts_with("error reading file")),
        "{loaded:?}"
    );

    let latin1 = dir.path().join("latin1.txt");
    std::fs::write(&latin1, b"caf\xe9 au lait").expect("write fixture");
    let mut warnings = Vec::new();
    let sources = [LabeledSource::new("cafe", latin1.clone())];
    let references = load_references(&sources, 100, &mut warnings).await;

    assert_eq!(references.get("cafe").map(|c| c.text.as_str()), Some(""));
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("[cafe] error reading file"), "{}", warnings[0]);
    assert!(warnings[0].contains("invalid UTF-8 at byte 3"), "{}", warnings[0]);
    assert!(warnings[0].ends_with("continuing with empty text"), "{}", warnings[0]);
}

#[tokio::test]
async fn stray_byte_past_budget_keeps_prefix() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("tail.txt");
    let mut bytes = vec![b'a'; 200];
    bytes.push(0xff);
    std::fs::write(&path, bytes).expect("write fixture");

    let loaded = load_text(&path, 100).await;
    assert_eq!(loaded.status, LoadStatus::Loaded);
    assert_eq!(loaded.text, "a".repeat(100));
}

#[test]
fn options_load_from_json_plan_with_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let plan = write(
        dir.path(),
        "plan.json",
        r#"{
            "references": [{"label": "a", "path": "/data/a.txt"}],
            "tests": [{"label": "a", "path": "/data/a-test.txt"}],
            "fragment_size": 2048,
            "compressor": {"codec": "zstd", "level": 7}
        }"#,
    );

    let options = EvaluationOptions::from_json_file(&plan).expect("plan");
    assert_eq!(options.references.len(), 1);
    assert_eq!(options.fragment_size, 2048);
    assert_eq!(options.fragment_count, EvaluationOptions::DEFAULT_FRAGMENT_COUNT);
    assert_eq!(options.corpus_size, EvaluationOptions::DEFAULT_CORPUS_SIZE);
    assert_eq!(options.compressor, CompressorSettings::Zstd { level: 7 });

    let missing = EvaluationOptions::from_json_file(&dir.path().join("nope.json"));
    assert!(matches!(missing, Err(PenprintError::MissingPath(_))));
}
