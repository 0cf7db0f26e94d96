use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::ClassificationDecision;

/// Accumulates per-fragment decisions. [`ResultAggregator::finalize`] consumes
/// the aggregator, so a matrix can only be read once recording is over.
#[derive(Debug, Clone, Default)]
pub struct ResultAggregator {
    labels: Vec<String>,
    counts: HashMap<String, HashMap<String, u64>>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers rows up front so that labels with no decisions still render,
    /// and so row order follows the configured list rather than arrival order.
    pub fn with_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut aggregator = Self::new();
        for label in labels {
            aggregator.ensure_row(label.into());
        }
        aggregator
    }

    pub fn record(&mut self, true_label: &str, predicted_label: &str) {
        let row = self.ensure_row(true_label.to_string());
        *row.entry(predicted_label.to_string()).or_insert(0) += 1;
    }

    pub fn record_decision(&mut self, decision: &ClassificationDecision) {
        self.record(&decision.source, &decision.predicted);
    }

    pub fn finalize(self) -> ConfusionMatrix {
        let counts = self
            .counts
            .into_iter()
            .map(|(label, row)| (label, row.into_iter().collect()))
            .collect();

        ConfusionMatrix {
            labels: self.labels,
            counts,
        }
    }

    fn ensure_row(&mut self, label: String) -> &mut HashMap<String, u64> {
        if !self.counts.contains_key(&label) {
            self.labels.push(label.clone());
        }
        self.counts.entry(label).or_default()
    }
}

/// True label x predicted label counts.
///
/// Rows and columns of [`ConfusionMatrix::grid`] are both keyed by the true
/// labels in first-seen order. Predictions outside that label set still count
/// toward [`ConfusionMatrix::row_total`] but have no grid column.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfusionMatrix {
    labels: Vec<String>,
    counts: BTreeMap<String, BTreeMap<String, u64>>,
}

impl ConfusionMatrix {
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn count(&self, true_label: &str, predicted_label: &str) -> u64 {
        self.counts
            .get(true_label)
            .and_then(|row| row.get(predicted_label))
            .copied()
            .unwrap_or(0)
    }

    pub fn row_total(&self, true_label: &str) -> u64 {
        self.counts
            .get(true_label)
            .map(|row| row.values().sum())
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().flat_map(|row| row.values()).sum()
    }

    /// Fragments whose predicted label equals their true label.
    pub fn matches(&self) -> u64 {
        self.labels
            .iter()
            .map(|label| self.count(label, label))
            .sum()
    }

    pub fn grid(&self) -> Vec<Vec<u64>> {
        self.labels
            .iter()
            .map(|row| {
                self.labels
                    .iter()
                    .map(|column| self.count(row, column))
                    .collect()
            })
            .collect()
    }
}
