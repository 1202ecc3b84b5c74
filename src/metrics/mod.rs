//! Evaluation metrics for binary classification
//!
//! Metrics operate on parallel slices of continuous scores and ground-truth
//! targets. Thresholding (continuous score → discrete label) happens here;
//! the selection loop only ever sees finished numbers.

mod classification;

pub use classification::{Accuracy, EvalReport, F1Score, RocAuc, Sensitivity, Specificity};

/// Trait for evaluation metrics
pub trait Metric {
    /// Compute the metric value from continuous predictions and targets.
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f32;

    /// Metric name for logging.
    fn name(&self) -> &'static str;
}
