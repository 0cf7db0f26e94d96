//! Compression delta: the marginal compressed cost of a fragment given a
//! reference corpus as context.
//!
//! `delta = size(corpus ++ fragment) - size(corpus)`. The concatenation order
//! matters because real compressors are order sensitive. Smaller deltas mean
//! the fragment is statistically closer to the corpus.
//!
//! The sign is not enforced. For well-behaved compressors appending data does
//! not shrink the output, so deltas are expected to be non-negative, but that
//! is an assumption about the backend and not a guarantee. Very small inputs
//! are dominated by framing overhead and give noisy deltas.

use crate::compressor::Compressor;
use crate::error::Result;

pub type Delta = i64;

pub fn compression_delta(
    compressor: &dyn Compressor,
    corpus: &[u8],
    fragment: &[u8],
) -> Result<Delta> {
    let corpus_size = compressor.compressed_size(corpus)?;
    delta_against(compressor, corpus, corpus_size, fragment)
}

/// Same as [`compression_delta`] with the corpus's standalone compressed size
/// supplied by the caller.
pub fn delta_against(
    compressor: &dyn Compressor,
    corpus: &[u8],
    corpus_size: usize,
    fragment: &[u8],
) -> Result<Delta> {
    let mut combined = Vec::with_capacity(corpus.len() + fragment.len());
    combined.extend_from_slice(corpus);
    combined.extend_from_slice(fragment);

    let combined_size = compressor.compressed_size(&combined)?;
    Ok(combined_size as Delta - corpus_size as Delta)
}
