use super::targets::CalibrationTarget;
use crate::types::{GazeAngle, ScreenPoint};
use crate::utils::median;
use crate::{Error, Result};
use std::time::Duration;

/// One valid gaze reading taken while a target was displayed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationSample {
    pub gaze: GazeAngle,
    pub target_index: usize,
    /// Time since the session started
    pub captured_at: Duration,
}

/// Aggregated gaze for one target, paired with the target's position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationPointEstimate {
    pub target_index: usize,
    /// Per-axis median of the collected samples
    pub gaze: GazeAngle,
    /// Where the target was drawn
    pub target: ScreenPoint,
    /// Number of samples that went into the median
    pub sample_count: usize,
}

impl CalibrationPointEstimate {
    /// Aggregate samples with a per-axis median
    ///
    /// The median absorbs blinks and late saccades that slip past the
    /// settle time. Returns `None` when there are no samples.
    #[must_use]
    pub fn from_samples(target: &CalibrationTarget, samples: &[CalibrationSample]) -> Option<Self> {
        let pitches: Vec<f64> = samples.iter().map(|s| s.gaze.pitch).collect();
        let yaws: Vec<f64> = samples.iter().map(|s| s.gaze.yaw).collect();

        Some(Self {
            target_index: target.index,
            gaze: GazeAngle::new(median(&pitches)?, median(&yaws)?),
            target: target.position,
            sample_count: samples.len(),
        })
    }
}

/// Complete set of per-target estimates, ordered by target index
///
/// Only constructible when every target has a finite estimate, so a mapper
/// is never fit from a partial capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationDataset {
    points: Vec<CalibrationPointEstimate>,
}

impl CalibrationDataset {
    /// Build a dataset, checking it covers targets `0..expected` exactly once and in order
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when estimates are missing, out of order, or not finite
    pub fn new(points: Vec<CalibrationPointEstimate>, expected: usize) -> Result<Self> {
        if points.len() != expected || expected == 0 {
            return Err(Error::InvalidState(format!(
                "Calibration dataset has {} of {expected} points",
                points.len()
            )));
        }
        for (i, point) in points.iter().enumerate() {
            if point.target_index != i {
                return Err(Error::InvalidState(format!(
                    "Calibration point {i} belongs to target {}",
                    point.target_index
                )));
            }
            if !(point.gaze.is_finite() && point.target.is_finite()) {
                return Err(Error::InvalidState(format!(
                    "Calibration point {i} is not finite"
                )));
            }
        }
        Ok(Self { points })
    }

    #[must_use]
    pub fn points(&self) -> &[CalibrationPointEstimate] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CalibrationPointEstimate> {
        self.points.iter()
    }
}

impl<'a> IntoIterator for &'a CalibrationDataset {
    type Item = &'a CalibrationPointEstimate;
    type IntoIter = std::slice::Iter<'a, CalibrationPointEstimate>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> CalibrationTarget {
        CalibrationTarget {
            index: 4,
            normalized: (0.5, 0.5),
            position: ScreenPoint::new(960.0, 540.0),
        }
    }

    fn sample(pitch: f64, yaw: f64) -> CalibrationSample {
        CalibrationSample {
            gaze: GazeAngle::new(pitch, yaw),
            target_index: 4,
            captured_at: Duration::ZERO,
        }
    }

    fn estimate(index: usize) -> CalibrationPointEstimate {
        CalibrationPointEstimate {
            target_index: index,
            gaze: GazeAngle::new(0.0, 0.0),
            target: ScreenPoint::new(0.0, 0.0),
            sample_count: 1,
        }
    }

    #[test]
    fn test_median_aggregation_rejects_blink() {
        let samples = [
            sample(0.10, -0.20),
            sample(0.11, -0.21),
            sample(-1.2, 0.9), // blink
            sample(0.09, -0.19),
            sample(0.10, -0.20),
        ];
        let estimate = CalibrationPointEstimate::from_samples(&target(), &samples).unwrap();
        assert_eq!(estimate.gaze, GazeAngle::new(0.10, -0.20));
        assert_eq!(estimate.target, ScreenPoint::new(960.0, 540.0));
        assert_eq!(estimate.target_index, 4);
        assert_eq!(estimate.sample_count, 5);
    }

    #[test]
    fn test_no_samples_no_estimate() {
        assert!(CalibrationPointEstimate::from_samples(&target(), &[]).is_none());
    }

    #[test]
    fn test_dataset_requires_every_target() {
        let complete: Vec<_> = (0..9).map(estimate).collect();
        assert_eq!(CalibrationDataset::new(complete.clone(), 9).unwrap().len(), 9);

        let partial = complete[..8].to_vec();
        assert!(matches!(CalibrationDataset::new(partial, 9), Err(Error::InvalidState(_))));

        let mut shuffled = complete.clone();
        shuffled.swap(0, 1);
        assert!(CalibrationDataset::new(shuffled, 9).is_err());

        let mut not_finite = complete;
        not_finite[2].gaze.pitch = f64::NAN;
        assert!(CalibrationDataset::new(not_finite, 9).is_err());

        assert!(CalibrationDataset::new(Vec::new(), 0).is_err());
    }
}
