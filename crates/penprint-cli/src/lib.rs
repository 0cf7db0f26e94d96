pub mod commands;
pub mod render;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use penprint_core::classifier::{Classifier, nearest};
use penprint_core::compressor::{
    CompressorSettings, DeflateCompressor, ZstdCompressor, build_compressor,
};
use penprint_core::evaluation::{load_references, run_evaluation};
use penprint_core::loader::load_text;
use penprint_core::models::{EvaluationOptions, Fragment, ProgressUpdate};
use penprint_core::progress::ProgressCallback;

pub use commands::{Cli, Commands};
use commands::{ClassifyArgs, CompressorArgs, CompressorChoice, EvaluateArgs};

pub async fn run_args(args: Vec<String>) -> anyhow::Result<()> {
    let cli = Cli::parse_from(args);
    tracing_subscriber::fmt()
        .with_env_filter(cli.log.clone())
        .with_writer(std::io::stderr)
        .without_time()
        .try_init()
        .ok();

    match cli.command {
        Commands::Evaluate(cmd) => evaluate(cmd).await,
        Commands::Classify(cmd) => classify(cmd).await,
    }
}

async fn evaluate(cmd: EvaluateArgs) -> anyhow::Result<()> {
    let options = resolve_evaluation_options(&cmd)?;
    tracing::debug!(
        references = options.references.len(),
        tests = options.tests.len(),
        fragment_count = options.fragment_count,
        fragment_size = options.fragment_size,
        "evaluation options resolved"
    );

    let progress = if cmd.quiet {
        None
    } else {
        Some(Arc::new(|p: ProgressUpdate| {
            eprintln!(
                "[{phase}] {percent:>3}% {processed}/{total} ETA={eta:?} {message}",
                phase = p.phase,
                percent = p.percent,
                processed = p.processed,
                total = p.total,
                eta = p.eta_seconds,
                message = p.message
            );
        }) as ProgressCallback)
    };

    let report = run_evaluation(options, progress).await?;

    if !cmd.quiet {
        for warning in &report.warnings {
            eprintln!("warning: {warning}");
        }
    }

    if let Some(path) = cmd.report.as_ref() {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, &json)
            .with_context(|| format!("failed writing report to {}", path.display()))?;
        eprintln!("report saved: {}", path.display());
    }

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("\nClassification Results:");
        print!("{}", render::render_grid(&report.matrix));
        println!(
            "{} of {} fragments matched their source ({})",
            report.metadata.matches, report.metadata.fragments_classified, report.compressor
        );
    }

    Ok(())
}

async fn classify(cmd: ClassifyArgs) -> anyhow::Result<()> {
    if cmd.input_size == 0 {
        anyhow::bail!("--input-size must be at least 1 character");
    }

    let settings = compressor_settings(&cmd.compressor, CompressorSettings::default());
    let compressor = build_compressor(&settings)?;

    let mut warnings = Vec::new();
    let references = load_references(&cmd.references, cmd.corpus_size, &mut warnings).await;
    for warning in &warnings {
        eprintln!("warning: {warning}");
    }

    let input = load_text(&cmd.input, cmd.input_size).await;
    if let Some(diagnostic) = input.diagnostic() {
        anyhow::bail!("cannot classify input: {diagnostic}");
    }

    let fragment = Fragment {
        source: cmd.input.display().to_string(),
        index: 0,
        text: input.text,
    };

    let session = Classifier::new(&references, compressor.as_ref())?;
    let scores = session.score_all(fragment.bytes())?;
    let winner = nearest(&scores)
        .map(|score| score.label.clone())
        .context("no reference scores were produced")?;
    tracing::info!(input = %fragment.source, predicted = %winner, "input classified");

    if cmd.json {
        let payload = serde_json::json!({
            "input": fragment.source,
            "chars": fragment.text.chars().count(),
            "compressor": session.compressor().describe(),
            "predicted": winner,
            "scores": scores,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print!("{}", render::render_scores(&scores, &winner));
        println!("predicted: {winner}");
    }

    Ok(())
}

fn resolve_evaluation_options(cmd: &EvaluateArgs) -> anyhow::Result<EvaluationOptions> {
    let mut options = match cmd.config.as_ref() {
        Some(path) => EvaluationOptions::from_json_file(path)
            .with_context(|| format!("failed to load evaluation plan {}", path.display()))?,
        None => EvaluationOptions::default(),
    };

    if !cmd.references.is_empty() {
        options.references = cmd.references.clone();
    }
    if !cmd.tests.is_empty() {
        options.tests = cmd.tests.clone();
    }
    if let Some(corpus_size) = cmd.corpus_size {
        options.corpus_size = corpus_size;
    }
    if let Some(fragment_count) = cmd.fragment_count {
        options.fragment_count = fragment_count;
    }
    if let Some(fragment_size) = cmd.fragment_size {
        options.fragment_size = fragment_size;
    }
    if let Some(threads) = cmd.threads {
        options.threads = threads;
    }
    options.compressor = compressor_settings(&cmd.compressor, options.compressor);

    if options.references.is_empty() {
        anyhow::bail!("at least one --reference LABEL=PATH (or a --config plan) is required");
    }
    if options.tests.is_empty() {
        anyhow::bail!("at least one --test LABEL=PATH (or a --config plan) is required");
    }

    Ok(options)
}

/// Applies compressor flags on top of `base`. Switching codec resets the
/// levels to that codec's defaults before `--level`/`--window` apply.
fn compressor_settings(args: &CompressorArgs, base: CompressorSettings) -> CompressorSettings {
    let base = match (args.compressor, base) {
        (None, base) => base,
        (Some(CompressorChoice::Brotli), base @ CompressorSettings::Brotli { .. }) => base,
        (Some(CompressorChoice::Zstd), base @ CompressorSettings::Zstd { .. }) => base,
        (Some(CompressorChoice::Deflate), base @ CompressorSettings::Deflate { .. }) => base,
        (Some(CompressorChoice::Brotli), _) => CompressorSettings::default(),
        (Some(CompressorChoice::Zstd), _) => CompressorSettings::Zstd {
            level: ZstdCompressor::DEFAULT_LEVEL,
        },
        (Some(CompressorChoice::Deflate), _) => CompressorSettings::Deflate {
            level: DeflateCompressor::DEFAULT_LEVEL,
        },
    };

    match base {
        CompressorSettings::Brotli {
            quality,
            window_bits,
        } => CompressorSettings::Brotli {
            quality: args.level.unwrap_or(quality),
            window_bits: args.window.unwrap_or(window_bits),
        },
        CompressorSettings::Zstd { level } => CompressorSettings::Zstd {
            level: args.level.map(|l| l as i32).unwrap_or(level),
        },
        CompressorSettings::Deflate { level } => CompressorSettings::Deflate {
            level: args.level.unwrap_or(level),
        },
    }
}
