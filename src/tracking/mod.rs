//! Experiment tracking
//!
//! The metrics sink for the selection loop: runs record hyperparameters,
//! per-step metric values, and artifact paths, persisted through a pluggable
//! [`TrackingBackend`].
//!
//! # Example
//!
//! ```
//! use plegar::tracking::{ExperimentTracker, InMemoryBackend, RunStatus};
//!
//! # fn main() -> Result<(), plegar::tracking::TrackingError> {
//! let mut tracker = ExperimentTracker::new("sex-classification", InMemoryBackend::new());
//! let run_id = tracker.start_run(Some("outer-1"))?;
//! tracker.log_param(&run_id, "lr", "0.0001")?;
//! tracker.log_metric(&run_id, "val_loss", 0.63, 1)?;
//! tracker.log_artifact(&run_id, "logs/gender_hcp_1_0_loss.ckpt")?;
//! tracker.end_run(&run_id, RunStatus::Completed)?;
//!
//! assert_eq!(tracker.get_run(&run_id)?.status, RunStatus::Completed);
//! # Ok(())
//! # }
//! ```

mod storage;

pub use storage::{InMemoryBackend, JsonBackend, TrackingBackend, TrackingError};

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::metrics::EvalReport;

/// Status of a tracking run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run is actively recording
    Active,
    /// Run completed successfully
    Completed,
    /// Run failed
    Failed,
}

/// One recorded metric value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub step: usize,
    pub value: f64,
}

/// A single experiment run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub run_id: String,
    pub run_name: Option<String>,
    pub experiment_name: String,
    pub status: RunStatus,
    /// Hyperparameters, string-encoded
    pub params: HashMap<String, String>,
    /// Metric name -> per-step values
    pub metrics: HashMap<String, Vec<MetricPoint>>,
    /// Artifact paths
    pub artifacts: Vec<String>,
    pub started_at: String,
    pub ended_at: Option<String>,
}

impl Run {
    pub fn new(run_id: String, run_name: Option<String>, experiment_name: String) -> Self {
        Self {
            run_id,
            run_name,
            experiment_name,
            status: RunStatus::Active,
            params: HashMap::new(),
            metrics: HashMap::new(),
            artifacts: Vec::new(),
            started_at: Utc::now().to_rfc3339(),
            ended_at: None,
        }
    }

    /// Latest recorded value of a metric.
    pub fn last_metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).and_then(|points| points.last()).map(|p| p.value)
    }
}

/// Top-level handle that manages runs for a named experiment
#[derive(Debug)]
pub struct ExperimentTracker<B: TrackingBackend> {
    experiment: String,
    backend: B,
    runs: HashMap<String, Run>,
    counter: usize,
}

impl<B: TrackingBackend> ExperimentTracker<B> {
    pub fn new(experiment: &str, backend: B) -> Self {
        Self {
            experiment: experiment.to_string(),
            backend,
            runs: HashMap::new(),
            counter: 0,
        }
    }

    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    /// Open a new run and return its id.
    pub fn start_run(&mut self, name: Option<&str>) -> Result<String, TrackingError> {
        self.counter += 1;
        let run_id = format!("{}-{:04}", self.experiment, self.counter);
        let run = Run::new(run_id.clone(), name.map(str::to_string), self.experiment.clone());
        self.backend.save_run(&run)?;
        self.runs.insert(run_id.clone(), run);
        Ok(run_id)
    }

    fn with_run(
        &mut self,
        run_id: &str,
        update: impl FnOnce(&mut Run),
    ) -> Result<(), TrackingError> {
        let run = self
            .runs
            .get_mut(run_id)
            .ok_or_else(|| TrackingError::NotFound(run_id.to_string()))?;
        update(run);
        self.backend.save_run(run)
    }

    pub fn log_param(&mut self, run_id: &str, key: &str, value: &str) -> Result<(), TrackingError> {
        self.with_run(run_id, |run| {
            run.params.insert(key.to_string(), value.to_string());
        })
    }

    pub fn log_metric(
        &mut self,
        run_id: &str,
        name: &str,
        value: f64,
        step: usize,
    ) -> Result<(), TrackingError> {
        self.with_run(run_id, |run| {
            run.metrics
                .entry(name.to_string())
                .or_default()
                .push(MetricPoint { step, value });
        })
    }

    /// Log every field of an evaluation record under a common prefix
    /// (`{prefix}_auc`, `{prefix}_loss`, ...).
    pub fn log_report(
        &mut self,
        run_id: &str,
        prefix: &str,
        step: usize,
        report: &EvalReport,
    ) -> Result<(), TrackingError> {
        if let Some(loss) = report.loss {
            self.log_metric(run_id, &format!("{prefix}_loss"), loss, step)?;
        }
        self.log_metric(run_id, &format!("{prefix}_auc"), f64::from(report.auc), step)?;
        self.log_metric(run_id, &format!("{prefix}_acc"), f64::from(report.accuracy), step)?;
        self.log_metric(run_id, &format!("{prefix}_f1"), f64::from(report.f1), step)?;
        self.log_metric(
            run_id,
            &format!("{prefix}_sensitivity"),
            f64::from(report.sensitivity),
            step,
        )?;
        self.log_metric(
            run_id,
            &format!("{prefix}_specificity"),
            f64::from(report.specificity),
            step,
        )
    }

    pub fn log_artifact(&mut self, run_id: &str, path: &str) -> Result<(), TrackingError> {
        self.with_run(run_id, |run| {
            run.artifacts.push(path.to_string());
        })
    }

    /// Close a run with the given status.
    pub fn end_run(&mut self, run_id: &str, status: RunStatus) -> Result<(), TrackingError> {
        self.with_run(run_id, |run| {
            run.status = status;
            run.ended_at = Some(Utc::now().to_rfc3339());
        })
    }

    pub fn get_run(&self, run_id: &str) -> Result<Run, TrackingError> {
        match self.runs.get(run_id) {
            Some(run) => Ok(run.clone()),
            None => self.backend.load_run(run_id),
        }
    }

    pub fn list_runs(&self) -> Result<Vec<Run>, TrackingError> {
        self.backend.list_runs()
    }
}
