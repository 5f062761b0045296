//! Cross-validation fold partitioning over corpus group keys.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// One train/test partition of the group-key set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fold<K> {
    /// Keys trained on.
    pub train: Vec<K>,
    /// Keys held out for testing.
    pub test: Vec<K>,
}

/// Split the group keys into `n` contiguous blocks of near-equal size.
///
/// Keys are sorted and deduplicated first, so the partition is deterministic
/// for any input order. Fold `i` tests on block `i` and trains on the union
/// of every other block: test sets cover the key set exactly once each, and
/// `train ∩ test = ∅` within every fold.
///
/// # Errors
///
/// `Error::InvalidInput` when `n` is zero or exceeds the number of distinct
/// keys — a caller bug, reported immediately.
pub fn partition_folds<K: Ord + Clone>(keys: &[K], n: usize) -> Result<Vec<Fold<K>>> {
    let mut sorted: Vec<K> = keys.to_vec();
    sorted.sort();
    sorted.dedup();

    if n == 0 {
        return Err(Error::invalid_input("fold count must be positive"));
    }
    if n > sorted.len() {
        return Err(Error::invalid_input(format!(
            "fold count ({}) exceeds group key count ({})",
            n,
            sorted.len()
        )));
    }

    let len = sorted.len();
    let mut folds = Vec::with_capacity(n);
    for i in 0..n {
        let begin = i * len / n;
        let end = (i + 1) * len / n;
        let test = sorted[begin..end].to_vec();
        let train = sorted[..begin]
            .iter()
            .chain(&sorted[end..])
            .cloned()
            .collect();
        folds.push(Fold { train, test });
    }
    Ok(folds)
}
