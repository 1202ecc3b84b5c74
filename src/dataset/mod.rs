//! Cohort dataset collaborator
//!
//! The cohort owns its samples; the splitter and the selection loop only ever
//! see read-only index arrays into it. Samples are immutable once constructed.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::split::encode_pairs;

/// Errors from loading a cohort file
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read cohort file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse cohort file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One unit of the dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Stable sample identifier
    pub id: u64,
    /// Group id; all samples of a subject stay in the same fold
    pub subject: u64,
    /// Class label (binary or categorical)
    pub label: i64,
    /// Auxiliary stratification attribute (e.g. session index)
    #[serde(default)]
    pub session: i64,
}

/// An immutable collection of samples
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cohort {
    samples: Vec<Sample>,
}

impl Cohort {
    /// Create a cohort from owned samples.
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Load a cohort from a JSON array of samples.
    pub fn from_json_file(path: &Path) -> Result<Self, DatasetError> {
        let bytes = std::fs::read(path)?;
        let samples: Vec<Sample> = serde_json::from_slice(&bytes)?;
        Ok(Self { samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn get(&self, idx: usize) -> Option<&Sample> {
        self.samples.get(idx)
    }

    /// Class label of every sample, in order.
    pub fn labels(&self) -> Vec<i64> {
        self.samples.iter().map(|s| s.label).collect()
    }

    /// Subject (group) id of every sample, in order.
    pub fn subjects(&self) -> Vec<u64> {
        self.samples.iter().map(|s| s.subject).collect()
    }

    /// Composite labels over the whole cohort: dense encoding of every
    /// `(label, session)` pair, for joint stratification.
    pub fn merged_labels(&self) -> Vec<usize> {
        encode_pairs(self.samples.iter().map(|s| (s.label, s.session)))
    }

    /// Composite labels restricted to a subset of indices. The encoding is
    /// rebuilt for the subset, so codes stay dense.
    pub fn merged_labels_of(&self, indices: &[usize]) -> Vec<usize> {
        encode_pairs(
            indices
                .iter()
                .map(|&i| (self.samples[i].label, self.samples[i].session)),
        )
    }

    /// Subject ids restricted to a subset of indices.
    pub fn subjects_of(&self, indices: &[usize]) -> Vec<u64> {
        indices.iter().map(|&i| self.samples[i].subject).collect()
    }

    /// Class labels restricted to a subset of indices, as f32 targets.
    pub fn targets_of(&self, indices: &[usize]) -> Vec<f32> {
        indices.iter().map(|&i| self.samples[i].label as f32).collect()
    }

    /// Count of positive-class samples among the given indices.
    pub fn positives(&self, indices: &[usize]) -> usize {
        indices.iter().filter(|&&i| self.samples[i].label == 1).count()
    }
}
