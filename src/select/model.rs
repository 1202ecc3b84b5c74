//! Model collaborator contract
//!
//! The selection loop is polymorphic over two training shapes: epoch-trained
//! models that receive one `fit` call per epoch, and single-shot fitters
//! (gradient-boosted trees) that train in one call. Both share the
//! fit/evaluate contract; the epoch loop versus single-fit branch is the only
//! difference the controller dispatches on, once per grid point.

use super::error::Result;
use super::grid::ParamSet;

/// How a candidate consumes its training data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingMode {
    /// One `fit` call per epoch, up to the configured epoch budget
    Epochwise,
    /// A single `fit` call, no epoch loop
    SingleShot,
}

/// Raw output of one evaluation pass
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Continuous scores, one per evaluated sample
    pub scores: Vec<f32>,
    /// Ground-truth targets, parallel to `scores`
    pub targets: Vec<f32>,
    /// Dataset-weighted loss over the evaluated samples
    pub loss: f64,
}

/// A trainable candidate model
///
/// Implementations close over their dataset; the controller only ever hands
/// them read-only index arrays.
pub trait Candidate {
    /// Which training branch the controller should take.
    fn mode(&self) -> TrainingMode;

    /// Train on the given sample indices: one epoch for
    /// [`TrainingMode::Epochwise`], the whole fit for
    /// [`TrainingMode::SingleShot`].
    fn fit(&mut self, train: &[usize]) -> Result<()>;

    /// Score the given samples without updating the model.
    fn evaluate(&self, indices: &[usize]) -> Result<Evaluation>;

    /// Stable string identity used in checkpoint names.
    fn descriptor(&self) -> String;

    /// Serialized model state for checkpointing.
    fn state(&self) -> Result<Vec<u8>>;

    /// Restore from a previously saved state.
    fn restore(&mut self, state: &[u8]) -> Result<()>;
}

/// Builds candidates from grid points
pub trait ModelFactory {
    fn build(&self, params: &ParamSet) -> Result<Box<dyn Candidate>>;
}
