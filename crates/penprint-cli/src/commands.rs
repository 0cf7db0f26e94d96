use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use penprint_core::models::LabeledSource;

#[derive(Debug, Parser)]
#[command(
    name = "penprint",
    version,
    about = "Compression-distance authorship classifier",
    long_about = "Assigns text fragments to the reference author whose corpus compresses them most efficiently, and tallies the results into a confusion matrix"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, default_value = "info")]
    pub log: String,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Segment test texts, classify every fragment and print the confusion matrix
    Evaluate(EvaluateArgs),

    /// Classify the start of a single file against reference corpora
    Classify(ClassifyArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompressorChoice {
    Brotli,
    Zstd,
    Deflate,
}

#[derive(Debug, Clone, Args)]
pub struct CompressorArgs {
    #[arg(long, value_enum)]
    pub compressor: Option<CompressorChoice>,

    /// Quality (brotli) or level (zstd, deflate)
    #[arg(long)]
    pub level: Option<u32>,

    /// Brotli window size in bits
    #[arg(long)]
    pub window: Option<u32>,
}

#[derive(Debug, Args)]
pub struct EvaluateArgs {
    /// JSON evaluation plan; flags below override its fields
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(long = "reference", value_name = "LABEL=PATH", value_parser = parse_labeled_source)]
    pub references: Vec<LabeledSource>,

    #[arg(long = "test", value_name = "LABEL=PATH", value_parser = parse_labeled_source)]
    pub tests: Vec<LabeledSource>,

    /// Characters read from each reference text
    #[arg(long)]
    pub corpus_size: Option<usize>,

    #[arg(long)]
    pub fragment_count: Option<usize>,

    /// Characters per fragment
    #[arg(long)]
    pub fragment_size: Option<usize>,

    #[arg(long)]
    pub threads: Option<usize>,

    #[command(flatten)]
    pub compressor: CompressorArgs,

    /// Write the full JSON report to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Print the JSON report instead of the grid
    #[arg(long)]
    pub json: bool,

    #[arg(long)]
    pub quiet: bool,
}

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    #[arg(
        long = "reference",
        value_name = "LABEL=PATH",
        value_parser = parse_labeled_source,
        required = true
    )]
    pub references: Vec<LabeledSource>,

    #[arg(long, value_name = "FILE")]
    pub input: PathBuf,

    #[arg(long, default_value_t = penprint_core::EvaluationOptions::DEFAULT_CORPUS_SIZE)]
    pub corpus_size: usize,

    /// Characters read from the start of the input
    #[arg(long, default_value_t = penprint_core::EvaluationOptions::DEFAULT_FRAGMENT_SIZE)]
    pub input_size: usize,

    #[command(flatten)]
    pub compressor: CompressorArgs,

    #[arg(long)]
    pub json: bool,
}

pub fn parse_labeled_source(raw: &str) -> Result<LabeledSource, String> {
    let (label, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=PATH, got '{raw}'"))?;
    let label = label.trim();
    if label.is_empty() {
        return Err(format!("missing label in '{raw}'"));
    }
    if path.trim().is_empty() {
        return Err(format!("missing path for label '{label}'"));
    }
    Ok(LabeledSource::new(label, path.trim()))
}
