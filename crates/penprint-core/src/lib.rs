//! Authorship classification by compression distance.
//!
//! A fragment is assigned to the reference corpus whose compressed size grows
//! the least when the fragment is appended to it. Decisions for many fragments
//! are tallied into a [`ConfusionMatrix`].

pub mod aggregator;
pub mod classifier;
pub mod compressor;
pub mod corpus;
pub mod error;
pub mod evaluation;
pub mod identity;
pub mod loader;
pub mod metric;
pub mod models;
pub mod progress;
pub mod segmenter;

pub use aggregator::{ConfusionMatrix, ResultAggregator};
pub use classifier::{Classifier, classify};
pub use compressor::{Compressor, CompressorSettings, build_compressor};
pub use corpus::{ReferenceCorpus, ReferenceSet};
pub use error::{PenprintError, Result};
pub use evaluation::{load_references, run_evaluation};
pub use metric::{Delta, compression_delta};
pub use models::{
    ClassificationDecision, EvaluationOptions, EvaluationReport, Fragment, LabelScore,
    LabeledSource, LoadStatus, ProgressUpdate,
};
pub use segmenter::segment;
