use std::collections::HashSet;

use chrono::Utc;
use rayon::prelude::*;

use crate::aggregator::ResultAggregator;
use crate::classifier::Classifier;
use crate::compressor::{Compressor, build_compressor};
use crate::corpus::ReferenceSet;
use crate::error::{PenprintError, Result};
use crate::identity::{build_run_id, compute_input_fingerprint, compute_text_fingerprint};
use crate::loader::{LoadedText, load_text};
use crate::models::{
    ClassificationDecision, EvaluationMetadata, EvaluationOptions, EvaluationReport, Fragment,
    LabeledSource, SourceSummary,
};
use crate::progress::{ClassificationProgress, ProgressCallback};
use crate::segmenter::segment;

/// Loads every test source, classifies its fragments against the reference
/// corpora and tallies the decisions into a confusion matrix.
///
/// Missing or unreadable inputs degrade to empty text and are reported in
/// `warnings`. Running with no reference sources, or a compressor failure,
/// aborts the run.
pub async fn run_evaluation(
    options: EvaluationOptions,
    progress: Option<ProgressCallback>,
) -> Result<EvaluationReport> {
    validate_options(&options)?;

    let started_at = Utc::now();
    let compressor = build_compressor(&options.compressor)?;
    let mut warnings = Vec::new();

    tracing::info!(
        references = options.references.len(),
        tests = options.tests.len(),
        compressor = %compressor.describe(),
        "starting evaluation"
    );

    let (references, reference_summaries) =
        load_reference_sources(&options.references, options.corpus_size, &mut warnings).await;

    let test_sources = dedup_sources(&options.tests);
    let mut test_summaries = Vec::with_capacity(test_sources.len());
    let mut fragments = Vec::new();

    for source in &test_sources {
        let loaded = load_text(&source.path, options.test_budget()).await;
        push_load_warning(&loaded, &source.label, &mut warnings);

        let produced = segment(
            &source.label,
            &loaded.text,
            options.fragment_count,
            options.fragment_size,
        );
        if produced.len() < options.fragment_count {
            warnings.push(format!(
                "test source '{}' produced {} of {} fragments ({} chars available, {} needed)",
                source.label,
                produced.len(),
                options.fragment_count,
                loaded.text.chars().count(),
                options.test_budget()
            ));
        }

        tracing::debug!(
            label = %source.label,
            fragments = produced.len(),
            "test source segmented"
        );
        test_summaries.push(summarize(source, &loaded, Some(produced.len())));
        fragments.extend(produced);
    }

    let decisions = classify_fragments(
        &references,
        compressor.as_ref(),
        &fragments,
        options.threads,
        progress,
    )?;

    let mut aggregator = ResultAggregator::with_labels(test_sources.iter().map(|s| &s.label));
    for decision in &decisions {
        aggregator.record_decision(decision);
    }
    let matrix = aggregator.finalize();

    let input_fingerprint = compute_input_fingerprint(
        &options,
        &fingerprints(&reference_summaries),
        &fingerprints(&test_summaries),
    );

    let finished_at = Utc::now();
    let metadata = EvaluationMetadata {
        fragments_classified: decisions.len(),
        matches: matrix.matches(),
        degraded_sources: reference_summaries
            .iter()
            .chain(&test_summaries)
            .filter(|summary| summary.status.is_degraded())
            .count(),
        corpus_size: options.corpus_size,
        fragment_count: options.fragment_count,
        fragment_size: options.fragment_size,
        threads: options.threads,
        elapsed_ms: (finished_at - started_at).num_milliseconds().max(0) as u128,
        input_fingerprint: input_fingerprint.clone(),
    };

    tracing::info!(
        fragments = metadata.fragments_classified,
        matches = metadata.matches,
        degraded = metadata.degraded_sources,
        elapsed_ms = metadata.elapsed_ms as u64,
        "evaluation complete"
    );

    Ok(EvaluationReport {
        run_id: build_run_id(&input_fingerprint),
        started_at,
        finished_at,
        compressor: compressor.describe(),
        references: reference_summaries,
        tests: test_summaries,
        matrix,
        warnings,
        metadata,
    })
}

/// Loads `sources` into a reference set in configured order, `corpus_size`
/// characters each. Degraded loads register an empty corpus and add a warning.
pub async fn load_references(
    sources: &[LabeledSource],
    corpus_size: usize,
    warnings: &mut Vec<String>,
) -> ReferenceSet {
    load_reference_sources(sources, corpus_size, warnings)
        .await
        .0
}

async fn load_reference_sources(
    sources: &[LabeledSource],
    corpus_size: usize,
    warnings: &mut Vec<String>,
) -> (ReferenceSet, Vec<SourceSummary>) {
    let sources = dedup_sources(sources);
    let mut references = ReferenceSet::new();
    let mut summaries = Vec::with_capacity(sources.len());

    for source in &sources {
        let loaded = load_text(&source.path, corpus_size).await;
        push_load_warning(&loaded, &source.label, warnings);
        summaries.push(summarize(source, &loaded, None));
        references.register(source.label.clone(), loaded.text);
    }

    (references, summaries)
}

fn classify_fragments(
    references: &ReferenceSet,
    compressor: &dyn Compressor,
    fragments: &[Fragment],
    threads: usize,
    progress: Option<ProgressCallback>,
) -> Result<Vec<ClassificationDecision>> {
    let tracker = ClassificationProgress::new(fragments.len(), progress);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let decisions = pool.install(|| {
        let classifier = Classifier::new(references, compressor)?;
        fragments
            .par_iter()
            .map(|fragment| {
                let decision = classifier.classify(fragment);
                tracker.fragment_done(fragment);
                decision
            })
            .collect::<Result<Vec<_>>>()
    })?;

    tracker.finish();
    Ok(decisions)
}

fn validate_options(options: &EvaluationOptions) -> Result<()> {
    if options.fragment_size == 0 {
        return Err(PenprintError::InvalidOptions(
            "fragment_size must be at least 1 character".to_string(),
        ));
    }
    if options.fragment_count == 0 {
        return Err(PenprintError::InvalidOptions(
            "fragment_count must be at least 1".to_string(),
        ));
    }
    if options.corpus_size == 0 {
        return Err(PenprintError::InvalidOptions(
            "corpus_size must be at least 1 character".to_string(),
        ));
    }
    if options.references.is_empty() {
        return Err(PenprintError::EmptyReferenceSet);
    }
    Ok(())
}

/// Keeps the first position of each label and the last path given for it.
fn dedup_sources(sources: &[LabeledSource]) -> Vec<LabeledSource> {
    let mut seen = HashSet::new();
    let mut out: Vec<LabeledSource> = Vec::with_capacity(sources.len());
    for source in sources {
        if seen.insert(source.label.as_str()) {
            out.push(source.clone());
        } else if let Some(existing) = out.iter_mut().find(|s| s.label == source.label) {
            existing.path = source.path.clone();
        }
    }
    out
}

fn push_load_warning(loaded: &LoadedText, label: &str, warnings: &mut Vec<String>) {
    if let Some(diagnostic) = loaded.diagnostic() {
        warnings.push(format!("[{label}] {diagnostic}; continuing with empty text"));
    }
}

fn summarize(
    source: &LabeledSource,
    loaded: &LoadedText,
    fragments: Option<usize>,
) -> SourceSummary {
    SourceSummary {
        label: source.label.clone(),
        path: source.path.clone(),
        chars: loaded.text.chars().count(),
        bytes: loaded.text.len(),
        fragments,
        fingerprint: compute_text_fingerprint(&source.label, &loaded.text),
        status: loaded.status.clone(),
    }
}

fn fingerprints(summaries: &[SourceSummary]) -> Vec<String> {
    summaries.iter().map(|s| s.fingerprint.clone()).collect()
}
