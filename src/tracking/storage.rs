//! Tracking storage backends

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use super::Run;

/// Errors from tracking persistence
#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("run not found: {0}")]
    NotFound(String),

    #[error("tracking I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("tracking serialization failure: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Pluggable persistence for experiment runs
pub trait TrackingBackend {
    fn save_run(&mut self, run: &Run) -> Result<(), TrackingError>;
    fn load_run(&self, run_id: &str) -> Result<Run, TrackingError>;
    fn list_runs(&self) -> Result<Vec<Run>, TrackingError>;
}

/// Keeps runs in memory; nothing survives the process
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    runs: HashMap<String, Run>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrackingBackend for InMemoryBackend {
    fn save_run(&mut self, run: &Run) -> Result<(), TrackingError> {
        self.runs.insert(run.run_id.clone(), run.clone());
        Ok(())
    }

    fn load_run(&self, run_id: &str) -> Result<Run, TrackingError> {
        self.runs
            .get(run_id)
            .cloned()
            .ok_or_else(|| TrackingError::NotFound(run_id.to_string()))
    }

    fn list_runs(&self) -> Result<Vec<Run>, TrackingError> {
        let mut runs: Vec<Run> = self.runs.values().cloned().collect();
        runs.sort_by(|a, b| a.run_id.cmp(&b.run_id));
        Ok(runs)
    }
}

/// One JSON file per run under a directory
#[derive(Debug, Clone)]
pub struct JsonBackend {
    dir: PathBuf,
}

impl JsonBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn run_path(&self, run_id: &str) -> PathBuf {
        self.dir.join(format!("{run_id}.json"))
    }
}

impl TrackingBackend for JsonBackend {
    fn save_run(&mut self, run: &Run) -> Result<(), TrackingError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_vec_pretty(run)?;
        fs::write(self.run_path(&run.run_id), json)?;
        Ok(())
    }

    fn load_run(&self, run_id: &str) -> Result<Run, TrackingError> {
        let path = self.run_path(run_id);
        if !path.exists() {
            return Err(TrackingError::NotFound(run_id.to_string()));
        }
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn list_runs(&self) -> Result<Vec<Run>, TrackingError> {
        let mut runs = Vec::new();
        if !self.dir.exists() {
            return Ok(runs);
        }
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                let bytes = fs::read(&path)?;
                runs.push(serde_json::from_slice(&bytes)?);
            }
        }
        runs.sort_by(|a, b| a.run_id.cmp(&b.run_id));
        Ok(runs)
    }
}
