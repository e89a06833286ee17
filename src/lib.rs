//! Gaze calibration library for mapping gaze angles to screen pixels.
//!
//! This library turns the `(pitch, yaw)` output of a gaze estimator into a
//! stable on-screen position:
//! - A nine-point (or any square grid) calibration session that collects
//!   gaze samples while the user looks at known targets
//! - A polynomial least-squares mapper fit from those samples, saved and
//!   loaded as JSON
//! - An adaptive One Euro filter with named smoothing profiles
//!
//! The pipeline consists of:
//! 1. Calibration: show targets, poll the gaze source, take the per-axis
//!    median of the settled samples for each target
//! 2. Fitting: solve `screen = f(pitch, yaw)` per axis with SVD
//! 3. Tracking: smooth each reading, map it, smooth and clamp the result
//!
//! # Examples
//!
//! ## Calibration
//!
//! ```no_run
//! use gaze_calibration::{calibration::CalibrationSession, config::CalibrationConfig, types::GazeAngle};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = CalibrationSession::new(CalibrationConfig::default())?;
//!
//! // Any closure returning `Option<GazeAngle>` is a gaze source
//! let mut source = || -> Option<GazeAngle> { Some(GazeAngle::new(0.05, -0.1)) };
//!
//! if session.run(&mut source) {
//!     let mapper = session.create_mapper("polynomial", 2)?;
//!     mapper.save("calibration.json")?;
//! } else if let Some(reason) = session.failure() {
//!     println!("Calibration failed: {reason}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Smoothing
//!
//! ```no_run
//! use gaze_calibration::filters::{FilterProfile, TemporalFilter};
//!
//! let mut filter = TemporalFilter::new(FilterProfile::Child);
//! let (x, y) = filter.filter(960.0, 540.0);
//! println!("Smoothed: ({x:.1}, {y:.1})");
//!
//! // Forget history, e.g. after the face was lost
//! filter.reset();
//! ```
//!
//! ## Tracking
//!
//! ```no_run
//! use gaze_calibration::{config::Config, tracker::GazeTracker, types::GazeAngle};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tracker = GazeTracker::new(Config::default())?;
//! if !tracker.load_configured()? {
//!     println!("No saved calibration, run one first");
//! }
//!
//! if let Some(tracked) = tracker.process(Some(GazeAngle::new(0.02, 0.08))) {
//!     if let Some(point) = tracked.screen {
//!         println!("Looking at ({:.0}, {:.0})", point.x, point.y);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Calibration targets, sample capture and datasets
pub mod calibration;

/// Injectable time source
pub mod clock;

/// Configuration management
pub mod config;

/// Constants used throughout the library
pub mod constants;

/// Error types and result handling
pub mod error;

/// Temporal smoothing filters
pub mod filters;

/// Gaze-to-screen mappers
pub mod mapping;

/// Tracking pipeline combining smoothing and mapping
pub mod tracker;

/// Gaze and screen value types
pub mod types;

/// Numeric helpers and safe casts
pub mod utils;

pub use error::{Error, Result};
