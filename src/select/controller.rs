//! Nested selection controller
//!
//! Drives outer-fold × hyperparameter-grid × inner-fold iteration: one inner
//! train/validation split per grid point (the number of inner folds actually
//! evaluated is configurable and defaults to one), an epoch loop with early
//! stopping for epochwise candidates or a single fit for single-shot
//! candidates, best-by-metric checkpointing, and a final held-out evaluation
//! with the reloaded best model.

use std::path::PathBuf;

use crate::checkpoint::{model_artifact_name, prediction_artifact_names, CheckpointStore};
use crate::config::RunConfig;
use crate::dataset::Cohort;
use crate::metrics::EvalReport;
use crate::split::{SplitIter, StratifiedGroupKFold};
use crate::tracking::{ExperimentTracker, RunStatus, TrackingBackend};

use super::best::BestTracker;
use super::early_stop::{EarlyStopping, StopSignal};
use super::error::{Result, SelectError};
use super::grid::{ParamGrid, ParamSet};
use super::model::{Candidate, Evaluation, ModelFactory, TrainingMode};

/// Outcome of one outer fold after the final test evaluation
#[derive(Debug, Clone)]
pub struct FoldOutcome {
    /// 1-based outer fold number
    pub outer_split: usize,
    /// Metric whose best checkpoint was reloaded for the test evaluation
    pub metric: String,
    /// Best validation value of that metric across the whole grid
    pub best_value: f64,
    pub best_checkpoint: PathBuf,
    pub best_params: ParamSet,
    pub test_report: EvalReport,
    pub labels_path: PathBuf,
    pub predictions_path: PathBuf,
}

/// Nested cross-validation and model selection over a cohort
#[derive(Debug, Clone)]
pub struct NestedSelection {
    cfg: RunConfig,
}

impl NestedSelection {
    pub fn new(cfg: RunConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &RunConfig {
        &self.cfg
    }

    /// Outer train/test pairs over the whole cohort, stratified jointly on
    /// class label and session and grouped by subject.
    pub fn outer_splits(&self, cohort: &Cohort) -> Result<SplitIter> {
        let merged = cohort.merged_labels();
        let subjects = cohort.subjects();
        Ok(StratifiedGroupKFold::new(self.cfg.outer_splits, self.cfg.seed)
            .split(&merged, &subjects)?)
    }

    /// Run the full protocol for every outer fold, or only `fold_filter`
    /// (1-based) when given.
    pub fn run<B: TrackingBackend>(
        &self,
        cohort: &Cohort,
        factory: &dyn ModelFactory,
        grid: &ParamGrid,
        store: &mut dyn CheckpointStore,
        mut tracker: Option<&mut ExperimentTracker<B>>,
        fold_filter: Option<usize>,
    ) -> Result<Vec<FoldOutcome>> {
        let mut outcomes = Vec::new();
        for (idx, (train, test)) in self.outer_splits(cohort)?.enumerate() {
            let outer_split = idx + 1;
            if fold_filter.is_some_and(|f| f != outer_split) {
                continue;
            }
            outcomes.push(self.run_fold(
                cohort,
                outer_split,
                &train,
                &test,
                factory,
                grid,
                store,
                tracker.as_deref_mut(),
            )?);
        }
        Ok(outcomes)
    }

    /// Run grid selection and the final test evaluation for one outer fold.
    #[allow(clippy::too_many_arguments)]
    pub fn run_fold<B: TrackingBackend>(
        &self,
        cohort: &Cohort,
        outer_split: usize,
        outer_train: &[usize],
        outer_test: &[usize],
        factory: &dyn ModelFactory,
        grid: &ParamGrid,
        store: &mut dyn CheckpointStore,
        tracker: Option<&mut ExperimentTracker<B>>,
    ) -> Result<FoldOutcome> {
        println!(
            "{outer_split}: outer size {}/{}, positives {}/{}",
            outer_train.len(),
            outer_test.len(),
            cohort.positives(outer_train),
            cohort.positives(outer_test),
        );

        let mut sink = match tracker {
            Some(t) => {
                let name = format!("outer-{outer_split}");
                let run_id = t.start_run(Some(name.as_str()))?;
                Some((t, run_id))
            }
            None => None,
        };

        let mut best_loss = BestTracker::minimize("loss");
        let mut best_auc = BestTracker::maximize("auc");
        let mut step = 0usize;

        let merged_inner = cohort.merged_labels_of(outer_train);
        let subjects_inner = cohort.subjects_of(outer_train);

        for params in grid.combinations() {
            println!("{outer_split}: evaluating {params}");

            let inner = StratifiedGroupKFold::new(self.cfg.inner_splits, self.cfg.seed)
                .split(&merged_inner, &subjects_inner)?;

            for (inner_split, (inner_train, inner_val)) in
                inner.enumerate().take(self.cfg.inner_folds_to_run)
            {
                // Inner indices are positions within the outer training set;
                // map them back to cohort indices.
                let train_in: Vec<usize> =
                    inner_train.iter().map(|&i| outer_train[i]).collect();
                let val_in: Vec<usize> = inner_val.iter().map(|&i| outer_train[i]).collect();

                println!(
                    "{outer_split}-{inner_split}: inner size {}/{}, positives {}/{}",
                    train_in.len(),
                    val_in.len(),
                    cohort.positives(&train_in),
                    cohort.positives(&val_in),
                );

                let mut model = factory.build(&params)?;
                match model.mode() {
                    TrainingMode::SingleShot => {
                        model.fit(&train_in)?;
                        let eval = model.evaluate(&val_in)?;
                        let report = EvalReport::from_scores(&eval.scores, &eval.targets, None);
                        println!(
                            "{outer_split}-{inner_split}: auc {:.4}, acc {:.4}, f1 {:.4}",
                            report.auc, report.accuracy, report.f1,
                        );
                        step += 1;
                        if let Some((t, run_id)) = sink.as_mut() {
                            t.log_report(run_id, "val", step, &report)?;
                        }

                        if best_auc.improves(f64::from(report.auc)) {
                            let path = model_artifact_name(
                                &self.cfg,
                                &model.descriptor(),
                                outer_split,
                                inner_split,
                                "auc",
                            );
                            store.save(&model.state()?, &path)?;
                            best_auc.record(f64::from(report.auc), path, params.clone());
                        }
                    }
                    TrainingMode::Epochwise => {
                        let mut stopper = EarlyStopping::new(self.cfg.early_stop_steps);
                        for epoch in 1..=self.cfg.n_epochs {
                            model.fit(&train_in)?;
                            let eval = model.evaluate(&val_in)?;
                            let report = EvalReport::from_scores(
                                &eval.scores,
                                &eval.targets,
                                Some(eval.loss),
                            );
                            println!(
                                "{outer_split}-{inner_split}-epoch {epoch:03}: loss {:.7}, auc {:.4}, acc {:.4}, f1 {:.4}",
                                eval.loss, report.auc, report.accuracy, report.f1,
                            );
                            step += 1;
                            if let Some((t, run_id)) = sink.as_mut() {
                                t.log_report(run_id, "val", step, &report)?;
                            }

                            if stopper.observe(eval.loss) == StopSignal::Stop {
                                eprintln!(
                                    "{outer_split}-{inner_split}: early stopping at epoch {epoch} \
                                     (worse than the last {} losses)",
                                    stopper.steps(),
                                );
                                break;
                            }

                            if best_loss.improves(eval.loss) {
                                let path = model_artifact_name(
                                    &self.cfg,
                                    &model.descriptor(),
                                    outer_split,
                                    inner_split,
                                    "loss",
                                );
                                store.save(&model.state()?, &path)?;
                                best_loss.record(eval.loss, path, params.clone());
                            }
                        }
                    }
                }
            }
        }

        // Reload the best checkpoint by the primary metric and evaluate once
        // on the held-out outer test set.
        let primary = self.cfg.analysis_type.primary_metric();
        let winner = if primary == "loss" { &best_loss } else { &best_auc };
        let Some((checkpoint, winning_params)) = winner.checkpoint() else {
            if let Some((t, run_id)) = sink.as_mut() {
                t.end_run(run_id, RunStatus::Failed)?;
            }
            return Err(SelectError::NoCandidateModel(primary.to_string()));
        };
        let checkpoint = checkpoint.to_path_buf();
        let winning_params = winning_params.clone();

        println!(
            "{outer_split}: best by {primary}: {} ({})",
            checkpoint.display(),
            winner.best(),
        );

        let mut model = factory.build(&winning_params)?;
        model.restore(&store.load(&checkpoint)?)?;
        let eval = model.evaluate(outer_test)?;
        let report = EvalReport::from_scores(&eval.scores, &eval.targets, Some(eval.loss));
        println!(
            "{outer_split}-final: loss {:.7}, auc {:.4}, acc {:.4}, sens {:.4}, spec {:.4}",
            eval.loss, report.auc, report.accuracy, report.sensitivity, report.specificity,
        );

        let (labels_path, predictions_path) = self.persist_predictions(&checkpoint, &eval)?;

        if let Some((t, run_id)) = sink.as_mut() {
            for (key, value) in winning_params.iter() {
                t.log_param(run_id, key, &value.to_string())?;
            }
            t.log_report(run_id, "test", step + 1, &report)?;
            t.log_artifact(run_id, &checkpoint.to_string_lossy())?;
            t.end_run(run_id, RunStatus::Completed)?;
        }

        Ok(FoldOutcome {
            outer_split,
            metric: primary.to_string(),
            best_value: winner.best(),
            best_checkpoint: checkpoint,
            best_params: winning_params,
            test_report: report,
            labels_path,
            predictions_path,
        })
    }

    /// Write the final labels and predictions next to the winning checkpoint's
    /// name in the results directory.
    fn persist_predictions(
        &self,
        checkpoint: &std::path::Path,
        eval: &Evaluation,
    ) -> Result<(PathBuf, PathBuf)> {
        std::fs::create_dir_all(&self.cfg.results_dir)?;
        let (labels_path, predictions_path) = prediction_artifact_names(&self.cfg, checkpoint);
        std::fs::write(&labels_path, serde_json::to_vec(&eval.targets)?)?;
        std::fs::write(&predictions_path, serde_json::to_vec(&eval.scores)?)?;
        Ok((labels_path, predictions_path))
    }
}
