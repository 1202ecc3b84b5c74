//! Checkpoint store and deterministic artifact naming
//!
//! Artifact names encode the run configuration, fold numbers, metric, and the
//! candidate's descriptor, so the path of a best model can be re-derived from
//! the same configuration. Checkpoints are overwritten freely and never
//! deleted by this crate; the only format contract is that a saved state
//! round-trips through [`CheckpointStore::load`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::RunConfig;
use crate::select::Result;

/// Persistence for serialized model states
pub trait CheckpointStore {
    /// Persist a model state at `path`, replacing any previous artifact.
    fn save(&mut self, state: &[u8], path: &Path) -> Result<()>;

    /// Load a previously saved state.
    fn load(&self, path: &Path) -> Result<Vec<u8>>;

    /// Whether an artifact exists at this path.
    fn contains(&self, path: &Path) -> bool;
}

/// Filesystem-backed store
#[derive(Debug, Clone, Default)]
pub struct FsCheckpointStore;

impl CheckpointStore for FsCheckpointStore {
    fn save(&mut self, state: &[u8], path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, state)?;
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(path)?)
    }

    fn contains(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// In-memory store for tests and dry runs; counts save calls
#[derive(Debug, Clone, Default)]
pub struct MemoryCheckpointStore {
    artifacts: HashMap<PathBuf, Vec<u8>>,
    saves: usize,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of save calls observed.
    pub fn save_count(&self) -> usize {
        self.saves
    }

    /// Number of distinct artifact paths currently held.
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn save(&mut self, state: &[u8], path: &Path) -> Result<()> {
        self.saves += 1;
        self.artifacts.insert(path.to_path_buf(), state.to_vec());
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<Vec<u8>> {
        self.artifacts.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no checkpoint at {}", path.display()),
            )
            .into()
        })
    }

    fn contains(&self, path: &Path) -> bool {
        self.artifacts.contains_key(path)
    }
}

/// Deterministic model artifact path for one (outer fold, inner fold, metric)
/// slot of a run.
pub fn model_artifact_name(
    cfg: &RunConfig,
    descriptor: &str,
    outer_split: usize,
    inner_split: usize,
    metric: &str,
) -> PathBuf {
    let name = [
        cfg.target_var.clone(),
        cfg.dataset_type.to_string(),
        outer_split.to_string(),
        inner_split.to_string(),
        metric.to_string(),
        descriptor.to_string(),
        cfg.n_epochs.to_string(),
        cfg.threshold.to_string(),
        cfg.normalisation.short().to_string(),
        cfg.batch_size.to_string(),
        cfg.num_nodes.to_string(),
        cfg.conn_type.to_string(),
    ]
    .join("_");
    cfg.artifact_dir.join(format!("{name}.ckpt"))
}

/// Paths for the final predictions and labels derived from a winning
/// checkpoint, rehomed into the results directory.
pub fn prediction_artifact_names(cfg: &RunConfig, checkpoint: &Path) -> (PathBuf, PathBuf) {
    let stem = checkpoint
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let labels = cfg.results_dir.join(format!("labels_{stem}.json"));
    let predictions = cfg.results_dir.join(format!("predictions_{stem}.json"));
    (labels, predictions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_artifact_name_is_deterministic() {
        let cfg = RunConfig::default();
        let a = model_artifact_name(&cfg, "gcn_mean", 1, 0, "loss");
        let b = model_artifact_name(&cfg, "gcn_mean", 1, 0, "loss");
        assert_eq!(a, b);
        assert!(a.starts_with("logs"));
        assert!(a.to_string_lossy().ends_with(".ckpt"));
    }

    #[test]
    fn test_model_artifact_name_distinguishes_metric_and_fold() {
        let cfg = RunConfig::default();
        let loss = model_artifact_name(&cfg, "gcn_mean", 1, 0, "loss");
        let auc = model_artifact_name(&cfg, "gcn_mean", 1, 0, "auc");
        let fold2 = model_artifact_name(&cfg, "gcn_mean", 2, 0, "loss");
        assert_ne!(loss, auc);
        assert_ne!(loss, fold2);
    }

    #[test]
    fn test_prediction_artifact_names() {
        let cfg = RunConfig::default();
        let ckpt = model_artifact_name(&cfg, "gcn_mean", 1, 0, "loss");
        let (labels, predictions) = prediction_artifact_names(&cfg, &ckpt);
        assert!(labels.starts_with("results"));
        assert!(labels.to_string_lossy().contains("labels_"));
        assert!(predictions.to_string_lossy().contains("predictions_"));
    }

    #[test]
    fn test_memory_store_round_trip_and_count() {
        let mut store = MemoryCheckpointStore::new();
        let path = PathBuf::from("logs/model.ckpt");
        assert!(!store.contains(&path));

        store.save(b"state-a", &path).unwrap();
        store.save(b"state-b", &path).unwrap();
        assert_eq!(store.save_count(), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.load(&path).unwrap(), b"state-b");
    }

    #[test]
    fn test_memory_store_load_missing() {
        let store = MemoryCheckpointStore::new();
        assert!(store.load(Path::new("absent.ckpt")).is_err());
    }

    #[test]
    fn test_fs_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/model.ckpt");
        let mut store = FsCheckpointStore;

        store.save(b"weights", &path).unwrap();
        assert!(store.contains(&path));
        assert_eq!(store.load(&path).unwrap(), b"weights");
    }
}
