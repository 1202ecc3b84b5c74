//! Nested cross-validation and model selection for grouped cohort data
//!
//! Plegar partitions samples into stratified folds without ever splitting a
//! group, and drives the surrounding selection protocol: an outer split for
//! test evaluation, an inner split per hyperparameter grid point, epoch
//! training with early stopping, and best-by-metric checkpointing.
//!
//! - [`split`]: composite label encoding and the grouped stratified k-fold
//!   splitter
//! - [`select`]: grid enumeration, early stopping, best tracking, and the
//!   nested selection controller
//! - [`dataset`]: the cohort collaborator the splitter and controller index
//!   into
//! - [`metrics`]: binary-classification evaluation and the structured report
//! - [`checkpoint`]: artifact naming and the checkpoint store
//! - [`tracking`]: the experiment-tracking metrics sink
//! - [`config`]: run-level configuration
//! - [`lease`]: device reservation across processes
//!
//! # Example
//!
//! ```
//! use plegar::split::{merge_labels, StratifiedGroupKFold};
//!
//! # fn main() -> Result<(), plegar::split::SplitError> {
//! // Stratify jointly on class and session; subjects stay whole.
//! let labels = merge_labels(&[0, 0, 1, 1], &[0, 1, 0, 1])?;
//! let subjects = [10, 10, 20, 20];
//!
//! for (train, test) in StratifiedGroupKFold::new(2, 1111).split(&labels, &subjects)? {
//!     assert_eq!(train.len() + test.len(), 4);
//! }
//! # Ok(())
//! # }
//! ```

pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod lease;
pub mod metrics;
pub mod select;
pub mod split;
pub mod tracking;

pub use config::RunConfig;
pub use dataset::{Cohort, Sample};
pub use metrics::EvalReport;
pub use select::{
    Candidate, EarlyStopping, Evaluation, FoldOutcome, ModelFactory, NestedSelection, ParamGrid,
    ParamSet, ParamValue, SelectError, TrainingMode,
};
pub use split::{merge_labels, SplitError, StratifiedGroupKFold};
