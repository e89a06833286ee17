//! Calibration capture.
//!
//! A session shows a square grid of targets one at a time, polls a gaze
//! source while each is displayed, discards readings taken during the settle
//! time and reduces the rest to one estimate per target. The resulting
//! [`CalibrationDataset`] feeds the mapper factory.

/// Per-target samples, estimates and the complete dataset
pub mod dataset;

/// Capture procedure
pub mod session;

/// Target grid layout
pub mod targets;

pub use dataset::{CalibrationDataset, CalibrationPointEstimate, CalibrationSample};
pub use session::CalibrationSession;
pub use targets::{generate_targets, CalibrationTarget};

use crate::types::GazeAngle;

/// Pull-based supplier of gaze readings
///
/// `None` means no reading is available this poll (no face, blink, tracker
/// dropout).
pub trait GazeSource {
    fn next_gaze(&mut self) -> Option<GazeAngle>;
}

impl<F> GazeSource for F
where
    F: FnMut() -> Option<GazeAngle>,
{
    fn next_gaze(&mut self) -> Option<GazeAngle> {
        self()
    }
}

/// Progress hooks for whatever draws the targets
pub trait CalibrationObserver {
    /// A target became visible
    fn on_target_shown(&mut self, _target: &CalibrationTarget) {}

    /// A target finished with an estimate
    fn on_target_captured(&mut self, _estimate: &CalibrationPointEstimate) {}

    /// Checked before every poll; returning `true` aborts the run
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CalibrationObserver for NoopObserver {}
