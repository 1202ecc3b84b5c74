//! Composite label encoding for joint stratification
//!
//! Fold balancing often needs to stratify on more than the class label alone
//! (e.g. class and session index together). Merging both into one dense
//! surrogate label lets the splitter balance the joint distribution without
//! knowing anything about the underlying attributes.

use std::collections::HashMap;

use super::error::{Result, SplitError};

/// Encode `(class, auxiliary)` pairs into dense labels in `[0, L)`.
///
/// Two positions receive the same output label iff their pairs are equal, and
/// exactly as many output values are produced as distinct pairs observed.
/// Codes are assigned in first-occurrence order; the mapping is rebuilt on
/// every call and is not stable across calls with different inputs.
///
/// # Errors
///
/// Returns [`SplitError::ShapeMismatch`] when the two sequences differ in
/// length.
pub fn merge_labels(classes: &[i64], auxiliary: &[i64]) -> Result<Vec<usize>> {
    if classes.len() != auxiliary.len() {
        return Err(SplitError::ShapeMismatch {
            left: classes.len(),
            right: auxiliary.len(),
        });
    }
    Ok(encode_pairs(classes.iter().copied().zip(auxiliary.iter().copied())))
}

/// Dense first-occurrence encoding over an exact pair stream.
pub(crate) fn encode_pairs(pairs: impl Iterator<Item = (i64, i64)>) -> Vec<usize> {
    let mut seen: HashMap<(i64, i64), usize> = HashMap::new();
    let mut encoded = Vec::new();
    for pair in pairs {
        let next = seen.len();
        let code = *seen.entry(pair).or_insert(next);
        encoded.push(code);
    }
    encoded
}
