//! Temporal smoothing for gaze angles and screen points.
//!
//! Raw gaze estimates jitter from frame to frame; mapping them straight to
//! the screen makes the pointer shake. The filters here trade a little lag
//! for stability, with named profiles picking the trade-off.

/// First-order low-pass stage used by the adaptive filter
pub mod low_pass;

/// Named smoothing presets
pub mod profile;

/// One Euro filter over `(x, y)` pairs
pub mod temporal;

pub use profile::{FilterParams, FilterProfile};
pub use temporal::TemporalFilter;

use crate::Result;

/// Trait for all point-stream filters
pub trait PointFilter: Send + Sync {
    /// Apply filter to input values
    fn apply(&mut self, x: f64, y: f64) -> (f64, f64);

    /// Reset filter state
    fn reset(&mut self);

    /// Get filter name
    fn name(&self) -> &str;
}

/// No-op filter that passes through values unchanged
pub struct NoFilter;

impl PointFilter for NoFilter {
    fn apply(&mut self, x: f64, y: f64) -> (f64, f64) {
        (x, y)
    }

    fn reset(&mut self) {}

    fn name(&self) -> &str {
        "off"
    }
}

/// Create a point filter by profile name, or `off`/`none` for pass-through
///
/// # Errors
///
/// Returns an error for names that are neither a profile nor `off`/`none`
pub fn create_filter(name: &str) -> Result<Box<dyn PointFilter>> {
    match name.trim().to_lowercase().as_str() {
        "off" | "none" => Ok(Box::new(NoFilter)),
        other => Ok(Box::new(TemporalFilter::new(other.parse()?))),
    }
}
