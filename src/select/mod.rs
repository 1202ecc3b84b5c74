//! Nested model selection
//!
//! Everything between the fold splitter and the model collaborator: grid
//! enumeration, early stopping, best-by-metric tracking, and the controller
//! that drives outer-fold × grid × inner-fold iteration with checkpointing.

mod best;
mod controller;
mod early_stop;
mod error;
mod grid;
mod model;

pub use best::{BestTracker, Direction};
pub use controller::{FoldOutcome, NestedSelection};
pub use early_stop::{EarlyStopping, StopSignal};
pub use error::{Result, SelectError};
pub use grid::{ParamGrid, ParamSet, ParamValue};
pub use model::{Candidate, Evaluation, ModelFactory, TrainingMode};
