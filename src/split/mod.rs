//! Grouped stratified splitting
//!
//! Two pieces: a composite label encoder that merges a class label with an
//! auxiliary attribute into one dense stratification label, and a grouped
//! stratified k-fold splitter that partitions samples into folds without ever
//! splitting a group.

mod encode;
mod error;
mod stratified;

pub(crate) use encode::encode_pairs;
pub use encode::merge_labels;
pub use error::{Result, SplitError};
pub use stratified::{SplitIter, StratifiedGroupKFold};
