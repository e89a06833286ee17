use crate::config::CalibrationConfig;
use crate::types::ScreenPoint;
use crate::utils::safe_cast::usize_to_f64;
use crate::Result;

/// One fixed on-screen point the user looks at during capture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationTarget {
    /// Row-major position in the grid
    pub index: usize,
    /// Position as fractions of the screen size, `(u, v)` in `[margin, 1 - margin]`
    pub normalized: (f64, f64),
    /// Position in pixels
    pub position: ScreenPoint,
}

/// Lay out the square target grid, row-major from the top-left corner
///
/// # Errors
///
/// Returns `InvalidConfiguration` if the configuration is invalid
pub fn generate_targets(config: &CalibrationConfig) -> Result<Vec<CalibrationTarget>> {
    config.validate()?;
    let side = config.grid_side()?;

    let span = 1.0 - 2.0 * config.margin;
    let step = span / usize_to_f64(side - 1);
    let width = f64::from(config.screen_width);
    let height = f64::from(config.screen_height);

    let targets = (0..config.num_points)
        .map(|index| {
            let row = index / side;
            let col = index % side;
            let u = usize_to_f64(col).mul_add(step, config.margin);
            let v = usize_to_f64(row).mul_add(step, config.margin);
            CalibrationTarget {
                index,
                normalized: (u, v),
                position: ScreenPoint::new(u * width, v * height),
            }
        })
        .collect();

    Ok(targets)
}
