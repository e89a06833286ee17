//! Gaze-angle to screen-pixel mapping.
//!
//! A mapper is fit once from a complete calibration dataset, or loaded from
//! a JSON file written by an earlier session, and is immutable afterwards.
//! Every fitting method exposes the same `predict` / `save` / `load`
//! contract through [`ScreenMapper`].
//!
//! The persisted document looks like:
//!
//! ```json
//! {
//!   "method": "polynomial",
//!   "degree": 2,
//!   "coeffs_x": [960.0, 12.5, 2100.0, 3.1, 40.2, 150.0],
//!   "coeffs_y": [540.0, 1900.0, -8.0, 120.0, 7.5, -2.0]
//! }
//! ```

/// Multivariate polynomial least-squares mapper
pub mod polynomial;

pub use polynomial::PolynomialMapper;

use crate::calibration::CalibrationDataset;
use crate::types::{GazeAngle, ScreenPoint};
use crate::{Error, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Common contract of every fitted mapper
pub trait GazeMapper: Send + Sync {
    /// Screen point for a gaze angle; may fall outside the screen
    fn predict(&self, gaze: GazeAngle) -> ScreenPoint;

    /// Method tag written to the persisted file
    fn method(&self) -> MapperMethod;

    /// Model complexity (polynomial degree for polynomial mappers)
    fn degree(&self) -> usize;
}

/// Fitting technique tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapperMethod {
    /// Multivariate polynomial in pitch and yaw
    Polynomial,
}

impl MapperMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Polynomial => "polynomial",
        }
    }

    /// Resolve a method name and requested degree
    ///
    /// `linear` is accepted as shorthand for a degree-1 polynomial.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for unknown names or unsupported degrees
    pub fn parse_with_degree(name: &str, degree: usize) -> Result<(Self, usize)> {
        let resolved = match name.trim().to_lowercase().as_str() {
            "linear" => (Self::Polynomial, 1),
            other => (other.parse()?, degree),
        };
        polynomial::validate_degree(resolved.1)?;
        Ok(resolved)
    }
}

impl fmt::Display for MapperMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MapperMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "polynomial" | "poly" => Ok(Self::Polynomial),
            _ => Err(Error::InvalidConfiguration(format!("Unknown mapper method: {s}"))),
        }
    }
}

/// On-disk representation of a fitted mapper
#[derive(Debug, Serialize, Deserialize)]
struct MapperFile {
    method: String,
    degree: usize,
    coeffs_x: Vec<f64>,
    coeffs_y: Vec<f64>,
}

/// A fitted gaze-to-screen mapper
///
/// Replaced wholesale on recalibration, never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenMapper {
    Polynomial(PolynomialMapper),
}

impl ScreenMapper {
    /// Fit a mapper by method name
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown method, an unsupported degree, too few
    /// points for the basis, or a solver failure
    pub fn fit(dataset: &CalibrationDataset, method: &str, degree: usize) -> Result<Self> {
        let (method, degree) = MapperMethod::parse_with_degree(method, degree)?;
        Self::fit_with(dataset, method, degree)
    }

    /// Fit a mapper for an already parsed method
    ///
    /// # Errors
    ///
    /// See [`ScreenMapper::fit`]
    pub fn fit_with(dataset: &CalibrationDataset, method: MapperMethod, degree: usize) -> Result<Self> {
        let mapper = match method {
            MapperMethod::Polynomial => Self::Polynomial(PolynomialMapper::fit(dataset, degree)?),
        };
        info!(
            "Fitted {method} mapper (degree {degree}), RMS error {:.1} px over {} points",
            mapper.rms_error(dataset),
            dataset.len()
        );
        Ok(mapper)
    }

    fn inner(&self) -> &dyn GazeMapper {
        match self {
            Self::Polynomial(mapper) => mapper,
        }
    }

    /// Screen point for a gaze angle
    ///
    /// The result is not clamped; callers clamp to the visible screen.
    #[must_use]
    pub fn predict(&self, gaze: GazeAngle) -> ScreenPoint {
        self.inner().predict(gaze)
    }

    #[must_use]
    pub fn method(&self) -> MapperMethod {
        self.inner().method()
    }

    #[must_use]
    pub fn degree(&self) -> usize {
        self.inner().degree()
    }

    /// Pixel distance between prediction and target for every dataset point
    #[must_use]
    pub fn residuals(&self, dataset: &CalibrationDataset) -> Vec<f64> {
        dataset
            .points()
            .iter()
            .map(|p| self.predict(p.gaze).distance(&p.target))
            .collect()
    }

    /// Root-mean-square pixel error over a dataset
    #[must_use]
    pub fn rms_error(&self, dataset: &CalibrationDataset) -> f64 {
        let residuals = self.residuals(dataset);
        if residuals.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = residuals.iter().map(|r| r * r).sum();
        (sum_sq / crate::utils::safe_cast::usize_to_f64(residuals.len())).sqrt()
    }

    /// Serialize to the persisted JSON document
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_json(&self) -> Result<String> {
        let file = match self {
            Self::Polynomial(mapper) => MapperFile {
                method: MapperMethod::Polynomial.as_str().to_string(),
                degree: mapper.degree(),
                coeffs_x: mapper.coeffs_x().to_vec(),
                coeffs_y: mapper.coeffs_y().to_vec(),
            },
        };
        serde_json::to_string_pretty(&file)
            .map_err(|e| Error::InvalidState(format!("Failed to serialize mapper: {e}")))
    }

    /// Reconstruct a mapper from its JSON document
    ///
    /// # Errors
    ///
    /// Returns `MalformedCalibrationFile` when a field is missing or has the
    /// wrong type, the method is unknown, or the coefficients do not match
    /// the degree
    pub fn from_json(content: &str) -> Result<Self> {
        let file: MapperFile = serde_json::from_str(content)
            .map_err(|e| Error::MalformedCalibrationFile(e.to_string()))?;

        // Stored tags are matched exactly; the lenient names are for configuration only
        let method = [MapperMethod::Polynomial]
            .into_iter()
            .find(|m| m.as_str() == file.method)
            .ok_or_else(|| Error::MalformedCalibrationFile(format!("Unrecognized method tag: {:?}", file.method)))?;

        match method {
            MapperMethod::Polynomial => Ok(Self::Polynomial(PolynomialMapper::from_coefficients(
                file.degree,
                file.coeffs_x,
                file.coeffs_y,
            )?)),
        }
    }

    /// Write the mapper to `path` as JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        info!("Saved {} mapper to {}", self.method(), path.display());
        Ok(())
    }

    /// Read a mapper previously written by [`ScreenMapper::save`]
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read and `MalformedCalibrationFile`
    /// if its content is not a valid mapper document
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mapper = Self::from_json(&content)?;
        info!("Loaded {} mapper (degree {}) from {}", mapper.method(), mapper.degree(), path.display());
        Ok(mapper)
    }
}

impl From<PolynomialMapper> for ScreenMapper {
    fn from(mapper: PolynomialMapper) -> Self {
        Self::Polynomial(mapper)
    }
}
