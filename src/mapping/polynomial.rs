use super::{GazeMapper, MapperMethod};
use crate::calibration::CalibrationDataset;
use crate::constants::{MAX_POLYNOMIAL_DEGREE, MIN_POLYNOMIAL_DEGREE, SVD_TOLERANCE};
use crate::types::{GazeAngle, ScreenPoint};
use crate::{Error, Result};
use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

/// Number of monomials `pitch^i * yaw^j` with `i + j <= degree`
#[must_use]
pub const fn basis_size(degree: usize) -> usize {
    (degree + 1) * (degree + 2) / 2
}

/// Polynomial feature vector of a gaze angle
///
/// Terms are ordered by total degree, then by descending power of pitch.
/// Degree 2 yields `[1, pitch, yaw, pitch², pitch·yaw, yaw²]`.
#[must_use]
pub fn features(gaze: GazeAngle, degree: usize) -> Vec<f64> {
    let mut pitch_pow = vec![1.0; degree + 1];
    let mut yaw_pow = vec![1.0; degree + 1];
    for k in 1..=degree {
        pitch_pow[k] = pitch_pow[k - 1] * gaze.pitch;
        yaw_pow[k] = yaw_pow[k - 1] * gaze.yaw;
    }

    let mut terms = Vec::with_capacity(basis_size(degree));
    for total in 0..=degree {
        for i in (0..=total).rev() {
            terms.push(pitch_pow[i] * yaw_pow[total - i]);
        }
    }
    terms
}

/// Check a degree against the supported range
///
/// # Errors
///
/// Returns `InvalidConfiguration` for degrees outside the supported range
pub fn validate_degree(degree: usize) -> Result<()> {
    if (MIN_POLYNOMIAL_DEGREE..=MAX_POLYNOMIAL_DEGREE).contains(&degree) {
        Ok(())
    } else {
        Err(Error::InvalidConfiguration(format!(
            "Polynomial degree must be between {MIN_POLYNOMIAL_DEGREE} and {MAX_POLYNOMIAL_DEGREE}, got {degree}"
        )))
    }
}

/// Two independent least-squares polynomials, one per screen axis
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialMapper {
    degree: usize,
    coeffs_x: Vec<f64>,
    coeffs_y: Vec<f64>,
}

impl PolynomialMapper {
    /// Fit both axes over a complete calibration dataset
    ///
    /// # Errors
    ///
    /// Returns an error if the degree is unsupported, the dataset has fewer
    /// points than basis terms, or the solver fails
    pub fn fit(dataset: &CalibrationDataset, degree: usize) -> Result<Self> {
        validate_degree(degree)?;

        let rows = dataset.len();
        let terms = basis_size(degree);
        if rows < terms {
            return Err(Error::InvalidConfiguration(format!(
                "Degree {degree} needs at least {terms} calibration points, got {rows}"
            )));
        }

        let design = DMatrix::from_row_iterator(
            rows,
            terms,
            dataset.points().iter().flat_map(|p| features(p.gaze, degree)),
        );
        let target_x = DVector::from_iterator(rows, dataset.points().iter().map(|p| p.target.x));
        let target_y = DVector::from_iterator(rows, dataset.points().iter().map(|p| p.target.y));

        let svd = design.svd(true, true);
        let eps = SVD_TOLERANCE * svd.singular_values.max();
        let rank = svd.rank(eps);
        if rank < terms {
            warn!("Calibration design matrix is rank deficient ({rank}/{terms}); using minimum-norm solution");
        }

        let coeffs_x = svd.solve(&target_x, eps).map_err(|e| Error::FitError(e.to_string()))?;
        let coeffs_y = svd.solve(&target_y, eps).map_err(|e| Error::FitError(e.to_string()))?;

        let mapper = Self {
            degree,
            coeffs_x: coeffs_x.iter().copied().collect(),
            coeffs_y: coeffs_y.iter().copied().collect(),
        };
        if !mapper.coefficients_finite() {
            return Err(Error::FitError(
                "Least-squares solution contains non-finite coefficients".to_string(),
            ));
        }

        debug!("Fitted degree-{degree} polynomial over {rows} points");
        Ok(mapper)
    }

    /// Rebuild a mapper from stored coefficients
    ///
    /// # Errors
    ///
    /// Returns `MalformedCalibrationFile` if the degree is unsupported, a
    /// coefficient list has the wrong length, or any coefficient is not finite
    pub fn from_coefficients(degree: usize, coeffs_x: Vec<f64>, coeffs_y: Vec<f64>) -> Result<Self> {
        validate_degree(degree).map_err(|e| Error::MalformedCalibrationFile(e.to_string()))?;

        let expected = basis_size(degree);
        for (axis, coeffs) in [("coeffs_x", &coeffs_x), ("coeffs_y", &coeffs_y)] {
            if coeffs.len() != expected {
                return Err(Error::MalformedCalibrationFile(format!(
                    "{axis} has {} coefficients, degree {degree} needs {expected}",
                    coeffs.len()
                )));
            }
        }

        let mapper = Self {
            degree,
            coeffs_x,
            coeffs_y,
        };
        if !mapper.coefficients_finite() {
            return Err(Error::MalformedCalibrationFile(
                "Coefficients must be finite numbers".to_string(),
            ));
        }
        Ok(mapper)
    }

    #[must_use]
    pub const fn degree(&self) -> usize {
        self.degree
    }

    #[must_use]
    pub fn coeffs_x(&self) -> &[f64] {
        &self.coeffs_x
    }

    #[must_use]
    pub fn coeffs_y(&self) -> &[f64] {
        &self.coeffs_y
    }

    fn coefficients_finite(&self) -> bool {
        self.coeffs_x.iter().chain(&self.coeffs_y).all(|c| c.is_finite())
    }
}

impl GazeMapper for PolynomialMapper {
    fn predict(&self, gaze: GazeAngle) -> ScreenPoint {
        let terms = features(gaze, self.degree);
        let dot = |coeffs: &[f64]| coeffs.iter().zip(&terms).map(|(c, t)| c * t).sum::<f64>();
        ScreenPoint::new(dot(&self.coeffs_x), dot(&self.coeffs_y))
    }

    fn method(&self) -> MapperMethod {
        MapperMethod::Polynomial
    }

    fn degree(&self) -> usize {
        self.degree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::CalibrationPointEstimate;
    use approx::assert_relative_eq;

    fn dataset_from(map: impl Fn(f64, f64) -> (f64, f64)) -> CalibrationDataset {
        let mut points = Vec::new();
        for row in 0..3usize {
            for col in 0..3usize {
                let pitch = -0.2 + 0.2 * row as f64;
                let yaw = -0.3 + 0.3 * col as f64;
                let (x, y) = map(pitch, yaw);
                points.push(CalibrationPointEstimate {
                    target_index: points.len(),
                    gaze: GazeAngle::new(pitch, yaw),
                    target: ScreenPoint::new(x, y),
                    sample_count: 1,
                });
            }
        }
        CalibrationDataset::new(points, 9).unwrap()
    }

    #[test]
    fn test_basis_sizes() {
        assert_eq!(basis_size(1), 3);
        assert_eq!(basis_size(2), 6);
        assert_eq!(basis_size(3), 10);
    }

    #[test]
    fn test_degree_two_feature_order() {
        let f = features(GazeAngle::new(2.0, 3.0), 2);
        assert_eq!(f, vec![1.0, 2.0, 3.0, 4.0, 6.0, 9.0]);
    }

    #[test]
    fn test_recovers_exact_quadratic() {
        let truth = |p: f64, y: f64| {
            (
                960.0 + 2000.0 * y + 150.0 * p * y + 300.0 * y * y,
                540.0 + 1800.0 * p - 200.0 * p * p + 50.0 * y,
            )
        };
        let mapper = PolynomialMapper::fit(&dataset_from(truth), 2).unwrap();

        let off_grid = GazeAngle::new(0.05, -0.12);
        let (ex, ey) = truth(off_grid.pitch, off_grid.yaw);
        let got = mapper.predict(off_grid);
        assert_relative_eq!(got.x, ex, epsilon = 1e-6);
        assert_relative_eq!(got.y, ey, epsilon = 1e-6);
    }

    #[test]
    fn test_linear_fit() {
        let mapper = PolynomialMapper::fit(&dataset_from(|p, y| (1000.0 * y + 960.0, 800.0 * p + 540.0)), 1).unwrap();
        assert_eq!(mapper.coeffs_x().len(), 3);
        assert_relative_eq!(mapper.coeffs_x()[0], 960.0, epsilon = 1e-6);
        assert_relative_eq!(mapper.coeffs_x()[2], 1000.0, epsilon = 1e-6);
        assert_relative_eq!(mapper.coeffs_y()[1], 800.0, epsilon = 1e-6);
    }

    #[test]
    fn test_too_few_points_for_degree() {
        // Degree 3 needs 10 points; a 3 x 3 grid only has 9
        let result = PolynomialMapper::fit(&dataset_from(|p, y| (p, y)), 3);
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_unsupported_degree() {
        assert!(PolynomialMapper::fit(&dataset_from(|p, y| (p, y)), 0).is_err());
        assert!(validate_degree(MAX_POLYNOMIAL_DEGREE + 1).is_err());
    }

    #[test]
    fn test_degenerate_gaze_does_not_fail() {
        let mut points = Vec::new();
        for i in 0..9usize {
            points.push(CalibrationPointEstimate {
                target_index: i,
                gaze: GazeAngle::new(0.1, 0.1),
                target: ScreenPoint::new(100.0 * i as f64, 50.0),
                sample_count: 1,
            });
        }
        let dataset = CalibrationDataset::new(points, 9).unwrap();
        let mapper = PolynomialMapper::fit(&dataset, 2).unwrap();
        // Identical inputs can only map to the mean target
        let p = mapper.predict(GazeAngle::new(0.1, 0.1));
        assert_relative_eq!(p.x, 400.0, epsilon = 1e-6);
    }

    #[test]
    fn test_from_coefficients_validation() {
        assert!(PolynomialMapper::from_coefficients(2, vec![0.0; 6], vec![0.0; 6]).is_ok());
        assert!(matches!(
            PolynomialMapper::from_coefficients(2, vec![0.0; 5], vec![0.0; 6]),
            Err(Error::MalformedCalibrationFile(_))
        ));
        assert!(matches!(
            PolynomialMapper::from_coefficients(9, vec![0.0; 55], vec![0.0; 55]),
            Err(Error::MalformedCalibrationFile(_))
        ));
        let mut bad = vec![0.0; 6];
        bad[3] = f64::NAN;
        assert!(PolynomialMapper::from_coefficients(2, bad, vec![0.0; 6]).is_err());
    }
}
