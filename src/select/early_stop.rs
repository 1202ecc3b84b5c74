//! Validation-loss early stopping
//!
//! Keeps a fixed-size window of the most recent validation losses. Training
//! stops as soon as the current loss is strictly worse than every value in
//! the window; otherwise the loss enters the window and the oldest entry is
//! evicted.

use std::collections::VecDeque;

/// Decision after observing one epoch's validation loss
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    /// Keep training
    Continue,
    /// Halt this hyperparameter combination immediately
    Stop,
}

/// Sliding-window early stopping on validation loss
///
/// # Example
///
/// ```
/// use plegar::select::{EarlyStopping, StopSignal};
///
/// let mut stopper = EarlyStopping::new(2);
/// assert_eq!(stopper.observe(0.5), StopSignal::Continue);
/// assert_eq!(stopper.observe(0.4), StopSignal::Continue);
/// // Worse than both windowed losses: stop.
/// assert_eq!(stopper.observe(0.6), StopSignal::Stop);
/// ```
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    window: VecDeque<f64>,
    steps: usize,
}

impl EarlyStopping {
    /// Window of `steps` losses, seeded with the `+inf` sentinel so the first
    /// `steps` observations can never trigger a stop.
    pub fn new(steps: usize) -> Self {
        Self {
            window: std::iter::repeat(f64::INFINITY).take(steps).collect(),
            steps,
        }
    }

    /// Observe one epoch's validation loss.
    pub fn observe(&mut self, val_loss: f64) -> StopSignal {
        if self.window.iter().all(|&w| val_loss > w) {
            return StopSignal::Stop;
        }
        self.window.pop_front();
        self.window.push_back(val_loss);
        StopSignal::Continue
    }

    /// Refill the window with the sentinel.
    pub fn reset(&mut self) {
        self.window.clear();
        self.window.extend(std::iter::repeat(f64::INFINITY).take(self.steps));
    }

    /// Configured window length.
    pub fn steps(&self) -> usize {
        self.steps
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// A descending-then-ascending loss curve always halts within
        /// 2 * steps observations.
        #[test]
        fn prop_halts_within_two_windows(
            steps in 1usize..16,
            start in 1.0f64..10.0,
            step_down in 0.001f64..0.1,
            step_up in 0.1f64..1.0,
        ) {
            let mut stopper = EarlyStopping::new(steps);
            let mut stopped = false;
            let mut loss = start;
            for epoch in 0..2 * steps {
                loss = if epoch < steps { loss - step_down } else { loss + step_up };
                if stopper.observe(loss) == StopSignal::Stop {
                    stopped = true;
                    break;
                }
            }
            prop_assert!(stopped);
        }

        /// A monotonically improving loss never stops.
        #[test]
        fn prop_improving_never_stops(
            steps in 1usize..16,
            epochs in 1usize..64,
        ) {
            let mut stopper = EarlyStopping::new(steps);
            for epoch in 0..epochs {
                let loss = 1.0 / (epoch + 1) as f64;
                prop_assert_eq!(stopper.observe(loss), StopSignal::Continue);
            }
        }
    }
}
