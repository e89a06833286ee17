//! Checked conversions between floating-point coordinates and integer pixels

use crate::{Error, Result};

/// Safely convert f64 to i32 with bounds checking
///
/// # Errors
///
/// Returns an error if the value is not finite or outside i32 range
#[allow(clippy::cast_possible_truncation)] // Truncation after bounds check is safe
pub fn f64_to_i32(value: f64) -> Result<i32> {
    if value.is_finite() && value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX) {
        Ok(value as i32)
    } else {
        Err(Error::InvalidState(format!(
            "Value {value} cannot be safely converted to i32"
        )))
    }
}

/// Convert a count to f64 for averaging and grid arithmetic
#[must_use]
#[allow(clippy::cast_precision_loss)] // Counts here are far below 2^52
pub const fn usize_to_f64(value: usize) -> f64 {
    value as f64
}
