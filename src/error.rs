//! Error types for the gaze calibration library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Construction parameters or a configuration file were rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A calibration target ran out of polls before collecting enough samples
    #[error(
        "Calibration incomplete: target {target} collected {collected}/{required} samples in {polls} polls"
    )]
    CalibrationIncomplete {
        /// Index of the target that failed
        target: usize,
        /// Valid samples collected before the ceiling was hit
        collected: usize,
        /// Samples required per target
        required: usize,
        /// Polls spent after the settle period
        polls: usize,
    },

    /// The observer asked to abort the capture
    #[error("Calibration cancelled at target {target}")]
    CalibrationCancelled {
        /// Index of the target being captured when the run was aborted
        target: usize,
    },

    /// A persisted mapper file is missing fields or holds unusable values
    #[error("Malformed calibration file: {0}")]
    MalformedCalibrationFile(String),

    /// An operation was called before the object was ready for it
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Least-squares fitting failed
    #[error("Fit error: {0}")]
    FitError(String),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is an expected capture outcome the user can retry
    #[must_use]
    pub const fn is_calibration_failure(&self) -> bool {
        matches!(
            self,
            Self::CalibrationIncomplete { .. } | Self::CalibrationCancelled { .. }
        )
    }
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
