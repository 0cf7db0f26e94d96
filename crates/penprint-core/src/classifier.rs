use rayon::prelude::*;

use crate::compressor::Compressor;
use crate::corpus::{ReferenceCorpus, ReferenceSet};
use crate::error::{PenprintError, Result};
use crate::metric::{Delta, compression_delta, delta_against};
use crate::models::{ClassificationDecision, Fragment, LabelScore};

/// Assigns `fragment` to the reference label whose corpus it extends most
/// cheaply.
///
/// Candidates are visited in registration order and only a strictly smaller
/// delta replaces the current best, so the earliest registered label wins
/// ties.
pub fn classify(
    references: &ReferenceSet,
    fragment: &[u8],
    compressor: &dyn Compressor,
) -> Result<String> {
    let mut best: Option<(&str, Delta)> = None;
    for corpus in references {
        let delta = compression_delta(compressor, corpus.bytes(), fragment)?;
        if best.is_none_or(|(_, smallest)| delta < smallest) {
            best = Some((corpus.label.as_str(), delta));
        }
    }

    best.map(|(label, _)| label.to_string())
        .ok_or(PenprintError::EmptyReferenceSet)
}

/// First score holding the minimum delta.
pub fn nearest(scores: &[LabelScore]) -> Option<&LabelScore> {
    scores.iter().fold(None, |best: Option<&LabelScore>, score| match best {
        Some(current) if current.delta <= score.delta => Some(current),
        _ => Some(score),
    })
}

struct Baseline<'a> {
    corpus: &'a ReferenceCorpus,
    size: usize,
}

/// A classification session over a fixed reference set.
///
/// Each corpus's standalone compressed size is computed once up front; the
/// per-fragment work only compresses `corpus ++ fragment`. The session is
/// read-only after construction and can be shared across worker threads.
pub struct Classifier<'a> {
    compressor: &'a dyn Compressor,
    baselines: Vec<Baseline<'a>>,
}

impl<'a> Classifier<'a> {
    pub fn new(references: &'a ReferenceSet, compressor: &'a dyn Compressor) -> Result<Self> {
        if references.is_empty() {
            return Err(PenprintError::EmptyReferenceSet);
        }

        let baselines = references
            .as_slice()
            .par_iter()
            .map(|corpus| {
                compressor
                    .compressed_size(corpus.bytes())
                    .map(|size| Baseline { corpus, size })
            })
            .collect::<Result<Vec<_>>>()?;

        for baseline in &baselines {
            tracing::debug!(
                label = %baseline.corpus.label,
                raw = baseline.corpus.text.len(),
                compressed = baseline.size,
                "reference baseline ready"
            );
        }

        Ok(Self {
            compressor,
            baselines,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.baselines.iter().map(|b| b.corpus.label.as_str())
    }

    pub fn compressor(&self) -> &dyn Compressor {
        self.compressor
    }

    /// Delta of `fragment` against every reference, in registration order.
    pub fn score_all(&self, fragment: &[u8]) -> Result<Vec<LabelScore>> {
        self.baselines
            .iter()
            .map(|baseline| {
                delta_against(
                    self.compressor,
                    baseline.corpus.bytes(),
                    baseline.size,
                    fragment,
                )
                .map(|delta| LabelScore {
                    label: baseline.corpus.label.clone(),
                    delta,
                })
            })
            .collect()
    }

    pub fn classify(&self, fragment: &Fragment) -> Result<ClassificationDecision> {
        let scores = self.score_all(fragment.bytes())?;
        let winner = nearest(&scores).ok_or(PenprintError::EmptyReferenceSet)?;

        Ok(ClassificationDecision {
            source: fragment.source.clone(),
            index: fragment.index,
            predicted: winner.label.clone(),
            delta: winner.delta,
        })
    }
}
