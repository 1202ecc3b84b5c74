//! Classification metrics: AUC, accuracy, F1, sensitivity, specificity

use serde::{Deserialize, Serialize};

use super::Metric;

/// Convert continuous predictions and targets to discrete binary labels.
fn threshold_to_labels(
    predictions: &[f32],
    targets: &[f32],
    threshold: f32,
) -> (Vec<usize>, Vec<usize>) {
    let y_pred: Vec<usize> = predictions.iter().map(|&p| usize::from(p >= threshold)).collect();
    let y_true: Vec<usize> = targets.iter().map(|&t| usize::from(t >= 0.5)).collect();
    (y_pred, y_true)
}

/// Recall of one class from discrete labels; 0.0 when the class is absent.
fn class_recall(y_pred: &[usize], y_true: &[usize], class: usize) -> f32 {
    let mut hits = 0usize;
    let mut total = 0usize;
    for (&p, &t) in y_pred.iter().zip(y_true.iter()) {
        if t == class {
            total += 1;
            if p == class {
                hits += 1;
            }
        }
    }
    if total == 0 {
        return 0.0;
    }
    hits as f32 / total as f32
}

/// Accuracy: fraction of correct thresholded predictions
///
/// # Example
///
/// ```
/// use plegar::metrics::{Accuracy, Metric};
///
/// let metric = Accuracy::new(0.5);
/// let acc = metric.compute(&[0.9, 0.2, 0.8], &[1.0, 0.0, 1.0]);
/// assert_eq!(acc, 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Accuracy {
    threshold: f32,
}

impl Accuracy {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl Default for Accuracy {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Metric for Accuracy {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f32 {
        if predictions.is_empty() {
            return 0.0;
        }
        let (y_pred, y_true) = threshold_to_labels(predictions, targets, self.threshold);
        let correct = y_pred.iter().zip(y_true.iter()).filter(|(p, t)| p == t).count();
        correct as f32 / y_pred.len() as f32
    }

    fn name(&self) -> &'static str {
        "Accuracy"
    }
}

/// Sensitivity: recall of the positive class
#[derive(Debug, Clone)]
pub struct Sensitivity {
    threshold: f32,
}

impl Sensitivity {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Metric for Sensitivity {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f32 {
        if predictions.is_empty() {
            return 0.0;
        }
        let (y_pred, y_true) = threshold_to_labels(predictions, targets, self.threshold);
        class_recall(&y_pred, &y_true, 1)
    }

    fn name(&self) -> &'static str {
        "Sensitivity"
    }
}

/// Specificity: recall of the negative class
#[derive(Debug, Clone)]
pub struct Specificity {
    threshold: f32,
}

impl Specificity {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl Default for Specificity {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Metric for Specificity {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f32 {
        if predictions.is_empty() {
            return 0.0;
        }
        let (y_pred, y_true) = threshold_to_labels(predictions, targets, self.threshold);
        class_recall(&y_pred, &y_true, 0)
    }

    fn name(&self) -> &'static str {
        "Specificity"
    }
}

/// F1 score of the positive class, zero-division → 0
#[derive(Debug, Clone)]
pub struct F1Score {
    threshold: f32,
}

impl F1Score {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl Default for F1Score {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Metric for F1Score {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f32 {
        if predictions.is_empty() {
            return 0.0;
        }
        let (y_pred, y_true) = threshold_to_labels(predictions, targets, self.threshold);

        let mut true_positives = 0usize;
        let mut predicted_positives = 0usize;
        let mut actual_positives = 0usize;
        for (&p, &t) in y_pred.iter().zip(y_true.iter()) {
            if p == 1 {
                predicted_positives += 1;
            }
            if t == 1 {
                actual_positives += 1;
                if p == 1 {
                    true_positives += 1;
                }
            }
        }
        if predicted_positives == 0 || actual_positives == 0 {
            return 0.0;
        }

        let precision = true_positives as f32 / predicted_positives as f32;
        let recall = true_positives as f32 / actual_positives as f32;
        if precision + recall == 0.0 {
            return 0.0;
        }
        2.0 * (precision * recall) / (precision + recall)
    }

    fn name(&self) -> &'static str {
        "F1"
    }
}

/// Area under the ROC curve via the rank-sum statistic, with midranks for
/// tied scores. Degenerate single-class input yields 0.5.
#[derive(Debug, Clone, Default)]
pub struct RocAuc;

impl Metric for RocAuc {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f32 {
        let n = predictions.len();
        let positives = targets.iter().filter(|&&t| t >= 0.5).count();
        let negatives = n - positives;
        if positives == 0 || negatives == 0 {
            return 0.5;
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| predictions[a].total_cmp(&predictions[b]));

        // Midranks over runs of equal scores.
        let mut ranks = vec![0.0f64; n];
        let mut i = 0;
        while i < n {
            let mut j = i;
            while j + 1 < n && predictions[order[j + 1]] == predictions[order[i]] {
                j += 1;
            }
            let midrank = (i + j) as f64 / 2.0 + 1.0;
            for k in i..=j {
                ranks[order[k]] = midrank;
            }
            i = j + 1;
        }

        let rank_sum: f64 = targets
            .iter()
            .zip(ranks.iter())
            .filter(|(&t, _)| t >= 0.5)
            .map(|(_, &r)| r)
            .sum();
        let p = positives as f64;
        let auc = (rank_sum - p * (p + 1.0) / 2.0) / (p * negatives as f64);
        auc as f32
    }

    fn name(&self) -> &'static str {
        "RocAuc"
    }
}

/// One evaluation's structured metric record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    /// Dataset-weighted loss, when the model reports one
    pub loss: Option<f64>,
    pub auc: f32,
    pub accuracy: f32,
    pub f1: f32,
    /// Recall of the positive class
    pub sensitivity: f32,
    /// Recall of the negative class
    pub specificity: f32,
}

impl EvalReport {
    /// Compute the full record from continuous scores and targets, using the
    /// 0.5 decision threshold throughout.
    pub fn from_scores(scores: &[f32], targets: &[f32], loss: Option<f64>) -> Self {
        Self {
            loss,
            auc: RocAuc.compute(scores, targets),
            accuracy: Accuracy::default().compute(scores, targets),
            f1: F1Score::default().compute(scores, targets),
            sensitivity: Sensitivity::default().compute(scores, targets),
            specificity: Specificity::default().compute(scores, targets),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_accuracy_all_correct() {
        let acc = Accuracy::default().compute(&[0.9, 0.1, 0.8], &[1.0, 0.0, 1.0]);
        assert_eq!(acc, 1.0);
    }

    #[test]
    fn test_accuracy_empty() {
        assert_eq!(Accuracy::default().compute(&[], &[]), 0.0);
    }

    #[test]
    fn test_sensitivity_and_specificity() {
        // One of two positives hit; both negatives hit.
        let scores = [0.9, 0.1, 0.2, 0.3];
        let targets = [1.0, 1.0, 0.0, 0.0];
        assert_eq!(Sensitivity::default().compute(&scores, &targets), 0.5);
        assert_eq!(Specificity::default().compute(&scores, &targets), 1.0);
    }

    #[test]
    fn test_sensitivity_no_positives_is_zero() {
        assert_eq!(Sensitivity::default().compute(&[0.9, 0.1], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_f1_zero_division() {
        // No predicted positives.
        assert_eq!(F1Score::default().compute(&[0.1, 0.2], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_f1_perfect() {
        let f1 = F1Score::default().compute(&[0.9, 0.8, 0.1], &[1.0, 1.0, 0.0]);
        assert_eq!(f1, 1.0);
    }

    #[test]
    fn test_roc_auc_perfect_separation() {
        let auc = RocAuc.compute(&[0.9, 0.8, 0.2, 0.1], &[1.0, 1.0, 0.0, 0.0]);
        assert_relative_eq!(auc, 1.0);
    }

    #[test]
    fn test_roc_auc_inverted() {
        let auc = RocAuc.compute(&[0.1, 0.2, 0.8, 0.9], &[1.0, 1.0, 0.0, 0.0]);
        assert_relative_eq!(auc, 0.0);
    }

    #[test]
    fn test_roc_auc_ties_get_midranks() {
        // Two tied scores, one positive and one negative: AUC 0.5.
        let auc = RocAuc.compute(&[0.5, 0.5], &[1.0, 0.0]);
        assert_relative_eq!(auc, 0.5);
    }

    #[test]
    fn test_roc_auc_single_class() {
        assert_eq!(RocAuc.compute(&[0.4, 0.6], &[1.0, 1.0]), 0.5);
    }

    #[test]
    fn test_eval_report_fields() {
        let report = EvalReport::from_scores(
            &[0.9, 0.8, 0.2, 0.1],
            &[1.0, 1.0, 0.0, 0.0],
            Some(0.25),
        );
        assert_eq!(report.loss, Some(0.25));
        assert_relative_eq!(report.auc, 1.0);
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.f1, 1.0);
        assert_eq!(report.sensitivity, 1.0);
        assert_eq!(report.specificity, 1.0);
    }

    #[test]
    fn test_eval_report_serde() {
        let report = EvalReport::from_scores(&[0.9, 0.1], &[1.0, 0.0], None);
        let json = serde_json::to_string(&report).unwrap();
        let parsed: EvalReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.loss, None);
        assert_eq!(parsed.accuracy, report.accuracy);
    }
}
