use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::EvaluationOptions;

const RUN_NAMESPACE: Uuid = Uuid::from_u128(0x3c1f0e2a9d5b4f61a8e7c4b2d9f01a77);

pub fn compute_text_fingerprint(label: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(label.as_bytes());
    hasher.update(b"|");
    hasher.update((text.len() as u64).to_le_bytes());
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Digest of everything that determines the confusion matrix: the loaded
/// texts (by fingerprint, in configured order) and the evaluation settings.
/// Paths and thread count are excluded.
pub fn compute_input_fingerprint(
    options: &EvaluationOptions,
    reference_fingerprints: &[String],
    test_fingerprints: &[String],
) -> String {
    let descriptor = format!(
        "{}|{}|{}|{:?}|refs={}|tests={}",
        options.corpus_size,
        options.fragment_count,
        options.fragment_size,
        options.compressor,
        reference_fingerprints.join(","),
        test_fingerprints.join(","),
    );

    let mut hasher = Sha256::new();
    hasher.update(descriptor.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn build_run_id(input_fingerprint: &str) -> String {
    let stable = Uuid::new_v5(&RUN_NAMESPACE, input_fingerprint.as_bytes());
    format!("eval-{}-{}", stable.simple(), Uuid::new_v4().simple())
}
