//! Run configuration
//!
//! The enumerations and run-level settings shared by artifact naming, fold
//! splitting, and the selection loop. The first three letters of each
//! normalisation variant are distinct so the short codes stay unambiguous in
//! artifact names.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Source dataset family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetType {
    Hcp,
    Ukb,
}

impl fmt::Display for DatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetType::Hcp => write!(f, "hcp"),
            DatasetType::Ukb => write!(f, "ukb"),
        }
    }
}

/// Connectivity modality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnType {
    Fmri,
    Struct,
}

impl fmt::Display for ConnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnType::Fmri => write!(f, "fmri"),
            ConnType::Struct => write!(f, "struct"),
        }
    }
}

/// Time-series normalisation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalisation {
    NoNorm,
    RoiNorm,
    SubjectNorm,
}

impl Normalisation {
    /// Three-letter code used in artifact names.
    pub fn short(&self) -> &'static str {
        match self {
            Normalisation::NoNorm => "no_",
            Normalisation::RoiNorm => "roi",
            Normalisation::SubjectNorm => "sub",
        }
    }
}

impl fmt::Display for Normalisation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Normalisation::NoNorm => write!(f, "no_norm"),
            Normalisation::RoiNorm => write!(f, "roi_norm"),
            Normalisation::SubjectNorm => write!(f, "subject_norm"),
        }
    }
}

/// Analysis family: spatiotemporal node data vs flattened-correlation baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    StUnimodal,
    StMultimodal,
    FlattenCorrs,
    FlattenCorrsThreshold,
}

impl AnalysisType {
    /// The metric whose best checkpoint is reloaded for the final test
    /// evaluation: validation loss for the spatiotemporal analyses, AUC for
    /// the flattened-correlation baselines.
    pub fn primary_metric(&self) -> &'static str {
        match self {
            AnalysisType::StUnimodal | AnalysisType::StMultimodal => "loss",
            AnalysisType::FlattenCorrs | AnalysisType::FlattenCorrsThreshold => "auc",
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisType::StUnimodal => write!(f, "st_unimodal"),
            AnalysisType::StMultimodal => write!(f, "st_multimodal"),
            AnalysisType::FlattenCorrs => write!(f, "flatten_corrs"),
            AnalysisType::FlattenCorrsThreshold => write!(f, "flatten_corrs_threshold"),
        }
    }
}

/// Node-feature encoding strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingStrategy {
    None,
    Ae3Layers,
    Vae3Layers,
    Stats,
}

/// Run-level configuration for one experiment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Target variable being classified (e.g. "gender")
    pub target_var: String,
    pub dataset_type: DatasetType,
    pub analysis_type: AnalysisType,
    pub conn_type: ConnType,
    pub normalisation: Normalisation,
    pub encoding_strategy: EncodingStrategy,
    /// Nodes in the connectivity parcellation
    pub num_nodes: usize,
    /// Time-series length per node
    pub time_length: usize,
    /// Connectivity threshold percentage
    pub threshold: u32,
    pub batch_size: usize,
    /// Epoch budget for epoch-trained candidates
    pub n_epochs: usize,
    /// Early-stopping window length
    pub early_stop_steps: usize,
    /// Outer folds for test evaluation
    pub outer_splits: usize,
    /// Inner folds the splitter produces per outer fold
    pub inner_splits: usize,
    /// Inner folds actually evaluated per grid point; 1 reproduces the
    /// single-pass behaviour of the original protocol.
    pub inner_folds_to_run: usize,
    /// Shuffle seed shared by the outer and inner splitters
    pub seed: u64,
    /// Directory for model checkpoints
    pub artifact_dir: PathBuf,
    /// Directory for final predictions and labels
    pub results_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            target_var: "gender".to_string(),
            dataset_type: DatasetType::Hcp,
            analysis_type: AnalysisType::StUnimodal,
            conn_type: ConnType::Struct,
            normalisation: Normalisation::RoiNorm,
            encoding_strategy: EncodingStrategy::None,
            num_nodes: 50,
            time_length: 1200,
            threshold: 5,
            batch_size: 150,
            n_epochs: 100,
            early_stop_steps: 30,
            outer_splits: 5,
            inner_splits: 5,
            inner_folds_to_run: 1,
            seed: 1111,
            artifact_dir: PathBuf::from("logs"),
            results_dir: PathBuf::from("results"),
        }
    }
}

impl RunConfig {
    /// Deterministic dataset directory name for this configuration.
    pub fn dataset_name(&self) -> String {
        format!(
            "unbalanced_{}_{}_{}_{}_{}_{}_{}_{}_{}",
            self.target_var,
            self.dataset_type,
            self.analysis_type,
            self.conn_type,
            self.num_nodes,
            self.time_length,
            self.threshold,
            self.normalisation,
            self.seed,
        )
    }
}
