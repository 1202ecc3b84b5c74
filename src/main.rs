//! Plegar CLI
//!
//! Split inspection and grid expansion for the plegar library.
//!
//! # Usage
//!
//! ```bash
//! # Report outer folds over a cohort file
//! plegar split --samples cohort.json --n-splits 5 --seed 1111
//!
//! # Only one fold, as JSON
//! plegar split --samples cohort.json --fold-num 2 --out folds.json
//!
//! # Expand a hyperparameter grid
//! plegar grid --grid grid.json
//! ```

use clap::Parser;
use plegar::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
