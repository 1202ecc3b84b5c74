//! CLI for split inspection and grid expansion
//!
//! The binary does not train models (the model collaborator is a library
//! trait); it exposes the deterministic pieces: fold assignment reports over
//! a cohort file and grid enumeration from a grid file.

mod logging;

pub use logging::{say, LogLevel};

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;

use crate::dataset::{Cohort, DatasetError};
use crate::select::{ParamGrid, ParamValue};
use crate::split::{SplitError, StratifiedGroupKFold};

/// Errors surfaced by the CLI
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Split(#[from] SplitError),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse grid file: {0}")]
    Grid(#[from] serde_json::Error),
}

#[derive(Debug, Parser)]
#[command(
    name = "plegar",
    about = "Nested stratified group k-fold cross-validation harness",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Report outer-fold assignments for a cohort
    Split(SplitArgs),
    /// Expand a hyperparameter grid and print every combination
    Grid(GridArgs),
}

#[derive(Debug, Args)]
pub struct SplitArgs {
    /// Cohort file: a JSON array of {id, subject, label, session} samples
    #[arg(long)]
    pub samples: PathBuf,

    /// Number of outer folds
    #[arg(long, default_value_t = 5)]
    pub n_splits: usize,

    /// Shuffle seed
    #[arg(long, default_value_t = 1111)]
    pub seed: u64,

    /// Only report this outer fold (1-based)
    #[arg(long)]
    pub fold_num: Option<usize>,

    /// Write the fold report as JSON instead of printing a table
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct GridArgs {
    /// Grid file: a JSON object of parameter name -> list of values
    #[arg(long)]
    pub grid: PathBuf,
}

/// One outer fold's report row
#[derive(Debug, Serialize)]
pub struct FoldReport {
    pub fold: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub train_positives: usize,
    pub test_positives: usize,
    pub test_subjects: Vec<u64>,
}

/// Execute a parsed command.
pub fn run_command(cli: Cli) -> Result<(), CliError> {
    let level = if cli.quiet { LogLevel::Quiet } else { LogLevel::Normal };
    match cli.command {
        Command::Split(args) => run_split(&args, level),
        Command::Grid(args) => run_grid(&args, level),
    }
}

fn run_split(args: &SplitArgs, level: LogLevel) -> Result<(), CliError> {
    let cohort = Cohort::from_json_file(&args.samples)?;
    let merged = cohort.merged_labels();
    let subjects = cohort.subjects();

    let splitter = StratifiedGroupKFold::new(args.n_splits, args.seed);
    let mut reports = Vec::new();
    for (idx, (train, test)) in splitter.split(&merged, &subjects)?.enumerate() {
        let fold = idx + 1;
        if args.fold_num.is_some_and(|f| f != fold) {
            continue;
        }
        let mut test_subjects = cohort.subjects_of(&test);
        test_subjects.sort_unstable();
        test_subjects.dedup();
        reports.push(FoldReport {
            fold,
            train_size: train.len(),
            test_size: test.len(),
            train_positives: cohort.positives(&train),
            test_positives: cohort.positives(&test),
            test_subjects,
        });
    }

    if let Some(out) = &args.out {
        std::fs::write(out, serde_json::to_vec_pretty(&reports)?)?;
        say(level, LogLevel::Normal, &format!("wrote {} folds to {}", reports.len(), out.display()));
    } else {
        for r in &reports {
            say(
                level,
                LogLevel::Normal,
                &format!(
                    "fold {}: size {}/{}, positives {}/{}, test subjects {:?}",
                    r.fold, r.train_size, r.test_size, r.train_positives, r.test_positives,
                    r.test_subjects,
                ),
            );
        }
    }
    Ok(())
}

fn run_grid(args: &GridArgs, level: LogLevel) -> Result<(), CliError> {
    let bytes = std::fs::read(&args.grid)?;
    let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(&bytes)?;

    let mut grid = ParamGrid::new();
    for (name, values) in &raw {
        let values = values
            .as_array()
            .map(|list| list.iter().map(json_to_param).collect::<Vec<_>>())
            .unwrap_or_else(|| vec![json_to_param(values)]);
        grid.add(name, values);
    }

    let combos = grid.combinations();
    say(level, LogLevel::Normal, &format!("{} combinations", combos.len()));
    for combo in &combos {
        say(level, LogLevel::Normal, &format!("{combo}"));
    }
    Ok(())
}

fn json_to_param(value: &serde_json::Value) -> ParamValue {
    match value {
        serde_json::Value::Number(n) if n.is_i64() => {
            ParamValue::Int(n.as_i64().unwrap_or_default())
        }
        serde_json::Value::Number(n) => ParamValue::Float(n.as_f64().unwrap_or_default()),
        other => ParamValue::Text(other.to_string().trim_matches('"').to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cohort_file(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("cohort.json");
        let mut file = std::fs::File::create(&path).unwrap();
        let samples: Vec<String> = (0..8)
            .map(|i| {
                format!(
                    r#"{{"id":{i},"subject":{},"label":{},"session":0}}"#,
                    i / 2,
                    i / 4,
                )
            })
            .collect();
        write!(file, "[{}]", samples.join(",")).unwrap();
        path
    }

    #[test]
    fn test_split_command_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("folds.json");
        let cli = Cli {
            quiet: true,
            command: Command::Split(SplitArgs {
                samples: cohort_file(&dir),
                n_splits: 2,
                seed: 1111,
                fold_num: None,
                out: Some(out.clone()),
            }),
        };
        run_command(cli).unwrap();

        let report: serde_json::Value =
            serde_json::from_slice(&std::fs::read(out).unwrap()).unwrap();
        assert_eq!(report.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_split_command_fold_filter() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("folds.json");
        let cli = Cli {
            quiet: true,
            command: Command::Split(SplitArgs {
                samples: cohort_file(&dir),
                n_splits: 2,
                seed: 1111,
                fold_num: Some(2),
                out: Some(out.clone()),
            }),
        };
        run_command(cli).unwrap();

        let report: serde_json::Value =
            serde_json::from_slice(&std::fs::read(out).unwrap()).unwrap();
        assert_eq!(report[0]["fold"], 2);
    }

    #[test]
    fn test_grid_command_parses_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.json");
        std::fs::write(&path, r#"{"gamma": [0.0, 1.0, 5.0], "n_estimators": [100, 500]}"#)
            .unwrap();

        let cli = Cli {
            quiet: true,
            command: Command::Grid(GridArgs { grid: path }),
        };
        run_command(cli).unwrap();
    }

    #[test]
    fn test_split_command_missing_file() {
        let cli = Cli {
            quiet: true,
            command: Command::Split(SplitArgs {
                samples: PathBuf::from("/nonexistent/cohort.json"),
                n_splits: 2,
                seed: 0,
                fold_num: None,
                out: None,
            }),
        };
        assert!(matches!(run_command(cli), Err(CliError::Dataset(_))));
    }

    #[test]
    fn test_json_to_param_types() {
        assert_eq!(json_to_param(&serde_json::json!(3)), ParamValue::Int(3));
        assert_eq!(json_to_param(&serde_json::json!(0.5)), ParamValue::Float(0.5));
        assert_eq!(
            json_to_param(&serde_json::json!("relu")),
            ParamValue::Text("relu".to_string())
        );
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::parse_from([
            "plegar", "split", "--samples", "cohort.json", "--n-splits", "3",
        ]);
        match cli.command {
            Command::Split(args) => {
                assert_eq!(args.n_splits, 3);
                assert_eq!(args.seed, 1111);
            }
            Command::Grid(_) => panic!("wrong subcommand"),
        }
    }
}
