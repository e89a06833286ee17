//! Value types shared by calibration, mapping and tracking.

use crate::{utils::safe_cast::f64_to_i32, Result};
use serde::{Deserialize, Serialize};

/// Gaze direction relative to the camera, in radians
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazeAngle {
    /// Vertical angle
    pub pitch: f64,
    /// Horizontal angle
    pub yaw: f64,
}

impl GazeAngle {
    #[must_use]
    pub const fn new(pitch: f64, yaw: f64) -> Self {
        Self { pitch, yaw }
    }

    /// Both angles are finite numbers
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.pitch.is_finite() && self.yaw.is_finite()
    }
}

/// Position on the screen in pixels, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance in pixels
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Clamp into the visible area `[0, width - 1] x [0, height - 1]`
    #[must_use]
    pub fn clamp_to(self, width: u32, height: u32) -> Self {
        let max_x = f64::from(width.saturating_sub(1));
        let max_y = f64::from(height.saturating_sub(1));
        Self {
            x: self.x.clamp(0.0, max_x),
            y: self.y.clamp(0.0, max_y),
        }
    }

    /// Round to the nearest whole pixel
    ///
    /// # Errors
    ///
    /// Returns an error if either coordinate is not finite or does not fit in `i32`
    pub fn to_pixel(self) -> Result<(i32, i32)> {
        Ok((f64_to_i32(self.x.round())?, f64_to_i32(self.y.round())?))
    }
}
