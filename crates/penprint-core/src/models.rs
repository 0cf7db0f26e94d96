use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregator::ConfusionMatrix;
use crate::compressor::CompressorSettings;
use crate::error::{PenprintError, Result};
use crate::metric::Delta;

/// A label bound to the path of the text that represents it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabeledSource {
    pub label: String,
    pub path: PathBuf,
}

impl LabeledSource {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub source: String,
    pub index: usize,
    pub text: String,
}

impl Fragment {
    pub fn bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabelScore {
    pub label: String,
    pub delta: Delta,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassificationDecision {
    pub source: String,
    pub index: usize,
    pub predicted: String,
    pub delta: Delta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationOptions {
    pub references: Vec<LabeledSource>,
    pub tests: Vec<LabeledSource>,
    /// Characters read from the start of each reference text.
    #[serde(default = "default_corpus_size")]
    pub corpus_size: usize,
    #[serde(default = "default_fragment_count")]
    pub fragment_count: usize,
    /// Characters per fragment.
    #[serde(default = "default_fragment_size")]
    pub fragment_size: usize,
    #[serde(default = "default_threads")]
    pub threads: usize,
    #[serde(default)]
    pub compressor: CompressorSettings,
}

impl EvaluationOptions {
    pub const DEFAULT_CORPUS_SIZE: usize = 128 * 1024;
    pub const DEFAULT_FRAGMENT_COUNT: usize = 32;
    pub const DEFAULT_FRAGMENT_SIZE: usize = 4 * 1024;

    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PenprintError::MissingPath(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Characters loaded from each test source.
    pub fn test_budget(&self) -> usize {
        self.fragment_count.saturating_mul(self.fragment_size)
    }
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            references: Vec::new(),
            tests: Vec::new(),
            corpus_size: default_corpus_size(),
            fragment_count: default_fragment_count(),
            fragment_size: default_fragment_size(),
            threads: default_threads(),
            compressor: CompressorSettings::default(),
        }
    }
}

fn default_corpus_size() -> usize {
    EvaluationOptions::DEFAULT_CORPUS_SIZE
}

fn default_fragment_count() -> usize {
    EvaluationOptions::DEFAULT_FRAGMENT_COUNT
}

fn default_fragment_size() -> usize {
    EvaluationOptions::DEFAULT_FRAGMENT_SIZE
}

fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum LoadStatus {
    #[default]
    Loaded,
    Missing,
    Unreadable {
        reason: String,
    },
}

impl LoadStatus {
    pub fn is_degraded(&self) -> bool {
        !matches!(self, Self::Loaded)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSummary {
    pub label: String,
    pub path: PathBuf,
    pub chars: usize,
    pub bytes: usize,
    #[serde(default)]
    pub fragments: Option<usize>,
    pub fingerprint: String,
    #[serde(flatten)]
    pub status: LoadStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EvaluationMetadata {
    pub fragments_classified: usize,
    pub matches: u64,
    /// Sources that were missing or unreadable and ran with empty text.
    #[serde(default)]
    pub degraded_sources: usize,
    pub corpus_size: usize,
    pub fragment_count: usize,
    pub fragment_size: usize,
    pub threads: usize,
    pub elapsed_ms: u128,
    pub input_fingerprint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub compressor: String,
    pub references: Vec<SourceSummary>,
    pub tests: Vec<SourceSummary>,
    pub matrix: ConfusionMatrix,
    pub warnings: Vec<String>,
    pub metadata: EvaluationMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub phase: String,
    pub percent: u8,
    pub processed: u64,
    pub total: u64,
    pub eta_seconds: Option<u64>,
    pub message: String,
}
