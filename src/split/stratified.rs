//! Grouped stratified k-fold splitting
//!
//! Partitions samples into `k` folds so that all samples of a group land in
//! the same fold while the per-label distribution across folds stays as
//! uniform as possible. Greedy balanced assignment: the group list is
//! shuffled with a caller-supplied seed, ordered by descending skew of each
//! group's own label counts, and each group is committed to the fold that
//! minimises the mean per-label relative standard deviation after a
//! non-destructive probe.

use std::collections::HashMap;

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::error::{Result, SplitError};

/// Stratified k-fold splitter with group atomicity.
///
/// `labels` are dense composite labels (see [`merge_labels`]); `groups` carry
/// the group id of every sample. The shuffle seed is part of the observable
/// contract: identical inputs and seed always produce identical folds.
///
/// [`merge_labels`]: super::merge_labels
///
/// # Example
///
/// ```
/// use plegar::split::StratifiedGroupKFold;
///
/// let labels = [0, 0, 1, 1, 0, 1];
/// let groups = [10, 10, 20, 20, 30, 40];
/// let splitter = StratifiedGroupKFold::new(2, 1111);
/// for (train, test) in splitter.split(&labels, &groups).unwrap() {
///     assert_eq!(train.len() + test.len(), 6);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct StratifiedGroupKFold {
    n_splits: usize,
    seed: u64,
}

impl StratifiedGroupKFold {
    /// Create a splitter for `n_splits` folds with a deterministic shuffle seed.
    pub fn new(n_splits: usize, seed: u64) -> Self {
        Self { n_splits, seed }
    }

    /// Number of folds this splitter produces.
    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Assign every group to a fold and return the one-shot sequence of
    /// `(train_indices, test_indices)` pairs, in increasing fold order.
    ///
    /// # Errors
    ///
    /// [`SplitError::ShapeMismatch`] when `labels` and `groups` differ in
    /// length; [`SplitError::InvalidSplitCount`] when `n_splits < 2` or fewer
    /// groups than folds are present.
    pub fn split(&self, labels: &[usize], groups: &[u64]) -> Result<SplitIter> {
        if labels.len() != groups.len() {
            return Err(SplitError::ShapeMismatch {
                left: labels.len(),
                right: groups.len(),
            });
        }

        // Discover groups in first-occurrence order.
        let mut group_index: HashMap<u64, usize> = HashMap::new();
        let mut n_groups = 0usize;
        for &g in groups {
            group_index.entry(g).or_insert_with(|| {
                let idx = n_groups;
                n_groups += 1;
                idx
            });
        }
        if self.n_splits < 2 || n_groups < self.n_splits {
            return Err(SplitError::InvalidSplitCount {
                n_splits: self.n_splits,
                n_groups,
            });
        }

        let n_labels = labels.iter().copied().max().map_or(0, |m| m + 1);

        // Per-group label counts and the global label distribution.
        let mut counts_per_group = vec![Array1::<f64>::zeros(n_labels); n_groups];
        let mut y_distr = Array1::<f64>::zeros(n_labels);
        for (&label, &g) in labels.iter().zip(groups.iter()) {
            counts_per_group[group_index[&g]][label] += 1.0;
            y_distr[label] += 1.0;
        }

        // Seeded shuffle, then hardest groups first. The sort is stable, so
        // groups with equal skew keep their shuffled relative order, which is
        // why the seed is part of the contract.
        let mut order: Vec<usize> = (0..n_groups).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        order.shuffle(&mut rng);
        order.sort_by(|&a, &b| {
            let skew_a = counts_per_group[a].std(0.0);
            let skew_b = counts_per_group[b].std(0.0);
            skew_b.total_cmp(&skew_a)
        });

        let mut fold_counts = vec![Array1::<f64>::zeros(n_labels); self.n_splits];
        let mut fold_of_group = vec![0usize; n_groups];
        for &gi in &order {
            let mut best_fold = 0usize;
            let mut min_eval: Option<f64> = None;
            for fold in 0..self.n_splits {
                let score = probe(&mut fold_counts, fold, &counts_per_group[gi], &y_distr);
                if min_eval.map_or(true, |m| score < m) {
                    min_eval = Some(score);
                    best_fold = fold;
                }
            }
            fold_counts[best_fold] += &counts_per_group[gi];
            fold_of_group[gi] = best_fold;
        }

        let sample_folds: Vec<usize> = groups
            .iter()
            .map(|g| fold_of_group[group_index[g]])
            .collect();

        Ok(SplitIter {
            sample_folds,
            n_splits: self.n_splits,
            next_fold: 0,
        })
    }
}

/// Tentatively add a group's counts to `fold`, score the configuration, and
/// roll the counts back out.
///
/// The score is the mean over labels of the standard deviation (across folds)
/// of each fold's share of that label.
fn probe(
    fold_counts: &mut [Array1<f64>],
    fold: usize,
    group_counts: &Array1<f64>,
    y_distr: &Array1<f64>,
) -> f64 {
    fold_counts[fold] += group_counts;
    let n_labels = y_distr.len();
    let mut total = 0.0;
    for label in 0..n_labels {
        let shares: Array1<f64> = fold_counts
            .iter()
            .map(|counts| counts[label] / y_distr[label])
            .collect();
        total += shares.std(0.0);
    }
    fold_counts[fold] -= group_counts;
    total / n_labels as f64
}

/// One-shot iterator over `(train_indices, test_indices)` pairs.
///
/// Yields exactly `n_splits` pairs; each fold is held out as test once, with
/// every other fold's samples forming the train side. Not restartable: the
/// assignment is consumed with the iterator.
#[derive(Debug)]
pub struct SplitIter {
    sample_folds: Vec<usize>,
    n_splits: usize,
    next_fold: usize,
}

impl SplitIter {
    /// Committed fold index of every sample, in input order.
    pub fn sample_folds(&self) -> &[usize] {
        &self.sample_folds
    }
}

impl Iterator for SplitIter {
    type Item = (Vec<usize>, Vec<usize>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_fold >= self.n_splits {
            return None;
        }
        let fold = self.next_fold;
        self.next_fold += 1;

        let mut train = Vec::new();
        let mut test = Vec::new();
        for (idx, &f) in self.sample_folds.iter().enumerate() {
            if f == fold {
                test.push(idx);
            } else {
                train.push(idx);
            }
        }
        Some((train, test))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.n_splits - self.next_fold;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SplitIter {}

#[cfg(test)]
mod tests {
    use super::*;

    fn homogeneous_cohort() -> (Vec<usize>, Vec<u64>) {
        // 8 samples in 4 groups of 2; two groups all label 0, two all label 1.
        let labels = vec![0, 0, 0, 0, 1, 1, 1, 1];
        let groups = vec![1, 1, 2, 2, 3, 3, 4, 4];
        (labels, groups)
    }

    #[test]
    fn test_split_rejects_single_fold() {
        let (labels, groups) = homogeneous_cohort();
        let err = StratifiedGroupKFold::new(1, 0)
            .split(&labels, &groups)
            .unwrap_err();
        assert!(matches!(err, SplitError::InvalidSplitCount { n_splits: 1, .. }));
    }

    #[test]
    fn test_split_rejects_more_folds_than_groups() {
        let (labels, groups) = homogeneous_cohort();
        let err = StratifiedGroupKFold::new(5, 0)
            .split(&labels, &groups)
            .unwrap_err();
        assert!(matches!(
            err,
            SplitError::InvalidSplitCount { n_splits: 5, n_groups: 4 }
        ));
    }

    #[test]
    fn test_split_rejects_shape_mismatch() {
        let err = StratifiedGroupKFold::new(2, 0)
            .split(&[0, 1], &[1, 1, 2])
            .unwrap_err();
        assert!(matches!(err, SplitError::ShapeMismatch { left: 2, right: 3 }));
    }

    #[test]
    fn test_split_yields_n_splits_pairs() {
        let (labels, groups) = homogeneous_cohort();
        let pairs: Vec<_> = StratifiedGroupKFold::new(2, 1111)
            .split(&labels, &groups)
            .unwrap()
            .collect();
        assert_eq!(pairs.len(), 2);
        for (train, test) in &pairs {
            assert_eq!(train.len() + test.len(), labels.len());
        }
    }

    #[test]
    fn test_forced_balance_with_two_groups_per_label() {
        // With only two groups per label and two folds, balance is forced:
        // each fold's test set must hold exactly one group of each class,
        // whatever the shuffle seed.
        let (labels, groups) = homogeneous_cohort();
        for seed in [0u64, 1, 7, 42, 1111, 99999] {
            for (_, test) in StratifiedGroupKFold::new(2, seed)
                .split(&labels, &groups)
                .unwrap()
            {
                assert_eq!(test.len(), 4, "seed {seed}");
                let positives = test.iter().filter(|&&i| labels[i] == 1).count();
                assert_eq!(positives, 2, "seed {seed}");
            }
        }
    }

    #[test]
    fn test_split_is_deterministic() {
        let labels = vec![0, 1, 0, 1, 1, 0, 1, 0, 0, 1, 1, 1];
        let groups = vec![1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6];
        let splitter = StratifiedGroupKFold::new(3, 77);
        let first: Vec<_> = splitter.split(&labels, &groups).unwrap().collect();
        let second: Vec<_> = splitter.split(&labels, &groups).unwrap().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_group_atomicity() {
        let labels = vec![0, 1, 0, 1, 1, 0, 1, 0, 0, 1];
        let groups = vec![1, 1, 2, 2, 3, 3, 4, 4, 5, 5];
        let iter = StratifiedGroupKFold::new(2, 3).split(&labels, &groups).unwrap();
        let folds = iter.sample_folds().to_vec();
        for (i, &g) in groups.iter().enumerate() {
            for (j, &h) in groups.iter().enumerate() {
                if g == h {
                    assert_eq!(folds[i], folds[j], "group {g} split across folds");
                }
            }
        }
    }

    #[test]
    fn test_sample_folds_cover_all_folds() {
        let labels = vec![0, 1, 0, 1, 1, 0, 1, 0];
        let groups = vec![1, 1, 2, 2, 3, 3, 4, 4];
        let iter = StratifiedGroupKFold::new(2, 9).split(&labels, &groups).unwrap();
        let mut seen: Vec<usize> = iter.sample_folds().to_vec();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen, vec![0, 1]);
    }
}
