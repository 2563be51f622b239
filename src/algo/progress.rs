//! Progress reporting for the parameterization pipeline.
//!
//! The solver never writes to stdout or stderr. Callers that want to follow a
//! solve inject a [`Progress`] callback, which receives one update per
//! pipeline stage.
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use seamless::algo::Progress;
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! let progress = Progress::new(move |current, total, message| {
//!     sink.lock().unwrap().push(format!("[{}/{}] {}", current, total, message));
//! });
//!
//! progress.report(0, 2, "Assembling");
//! assert_eq!(seen.lock().unwrap()[0], "[0/2] Assembling");
//! ```

/// A progress callback that receives updates during a solve.
///
/// The callback receives:
/// - `current`: Current step (0-based)
/// - `total`: Total number of steps
/// - `message`: Description of the current step
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Report the start of a pipeline stage and mirror it to the `log` facade.
    pub(crate) fn stage(&self, stage: Stage) {
        log::debug!("{}", stage.message());
        self.report(stage as usize, Stage::COUNT, stage.message());
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}

/// Stages of a parameterization solve, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Building the differential operator and edge targets.
    Operator = 0,
    /// Building the edge mass matrix.
    Weights = 1,
    /// Assembling the augmented system.
    Assembly = 2,
    /// Factorizing and solving.
    Solve = 3,
    /// Projecting back to corners.
    Projection = 4,
}

impl Stage {
    /// Number of stages reported.
    pub const COUNT: usize = 5;

    /// Human readable message for this stage.
    pub fn message(self) -> &'static str {
        match self {
            Stage::Operator => "Building differential operator",
            Stage::Weights => "Building edge weights",
            Stage::Assembly => "Assembling saddle-point system",
            Stage::Solve => "Factorizing and solving",
            Stage::Projection => "Projecting to corners",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_stage_reports_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = Progress::new(move |current, total, _| {
            sink.lock().unwrap().push((current, total));
        });

        progress.stage(Stage::Operator);
        progress.stage(Stage::Projection);

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec![(0, 5), (4, 5)]);
    }

    #[test]
    fn test_none_is_silent() {
        let progress = Progress::default();
        progress.report(1, 2, "ignored");
        assert!(format!("{:?}", progress).starts_with("Progress"));
    }
}
