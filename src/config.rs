//! Configuration management for calibration, mapping and smoothing

use crate::constants::{
    DEFAULT_CALIBRATION_FILE, DEFAULT_FILTER_PROFILE, DEFAULT_FPS, DEFAULT_MAPPER_METHOD, DEFAULT_MARGIN,
    DEFAULT_NUM_POINTS, DEFAULT_POLYNOMIAL_DEGREE, DEFAULT_SAMPLES_PER_POINT, DEFAULT_SAMPLE_DELAY_SECS,
    DEFAULT_SCREEN_HEIGHT, DEFAULT_SCREEN_WIDTH, MAX_GRID_SIDE, MIN_GRID_SIDE, POLL_CEILING_FACTOR,
};
use crate::filters::{FilterProfile, PointFilter, TemporalFilter};
use crate::mapping::MapperMethod;
use crate::utils::exact_sqrt;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Calibration capture configuration
    pub calibration: CalibrationConfig,

    /// Screen mapper configuration
    pub mapper: MapperConfig,

    /// Smoothing filter configuration
    pub filter: FilterConfig,
}

/// Calibration capture parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Screen width in pixels
    pub screen_width: u32,

    /// Screen height in pixels
    pub screen_height: u32,

    /// Number of targets; must be a perfect square from 2 x 2 to 10 x 10
    pub num_points: usize,

    /// Grid inset as a fraction of each screen dimension, in [0, 0.5)
    pub margin: f64,

    /// Valid samples collected per target
    pub samples_per_point: usize,

    /// Settle time after a target appears, in seconds
    pub sample_delay: f64,

    /// Poll ceiling per target after the settle time; defaults to
    /// `samples_per_point * 10`
    pub max_polls_per_point: Option<usize>,
}

/// Screen mapper parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Fitting method name
    pub method: String,

    /// Polynomial degree
    pub degree: usize,

    /// Where the fitted mapper is saved
    pub file: PathBuf,
}

/// Smoothing filter parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Profile name: smooth, balanced, responsive or child
    pub profile: String,

    /// Apply smoothing at all
    pub enabled: bool,

    /// Nominal sample rate of the gaze stream
    pub frame_rate: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            screen_width: DEFAULT_SCREEN_WIDTH,
            screen_height: DEFAULT_SCREEN_HEIGHT,
            num_points: DEFAULT_NUM_POINTS,
            margin: DEFAULT_MARGIN,
            samples_per_point: DEFAULT_SAMPLES_PER_POINT,
            sample_delay: DEFAULT_SAMPLE_DELAY_SECS,
            max_polls_per_point: None,
        }
    }
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            method: DEFAULT_MAPPER_METHOD.to_string(),
            degree: DEFAULT_POLYNOMIAL_DEGREE,
            file: PathBuf::from(DEFAULT_CALIBRATION_FILE),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            profile: DEFAULT_FILTER_PROFILE.to_string(),
            enabled: true,
            frame_rate: DEFAULT_FPS,
        }
    }
}

impl CalibrationConfig {
    /// Validate every capture parameter
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` naming the first rejected parameter
    pub fn validate(&self) -> Result<()> {
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err(Error::InvalidConfiguration(format!(
                "Screen dimensions must be positive, got {}x{}",
                self.screen_width, self.screen_height
            )));
        }
        self.grid_side()?;
        if !(self.margin.is_finite() && (0.0..0.5).contains(&self.margin)) {
            return Err(Error::InvalidConfiguration(format!(
                "Margin must be in [0, 0.5), got {}",
                self.margin
            )));
        }
        if self.samples_per_point == 0 {
            return Err(Error::InvalidConfiguration(
                "Samples per point must be greater than 0".to_string(),
            ));
        }
        self.settle_time()?;
        if let Some(ceiling) = self.max_polls_per_point {
            if ceiling < self.samples_per_point {
                return Err(Error::InvalidConfiguration(format!(
                    "Poll ceiling {ceiling} is below samples per point {}",
                    self.samples_per_point
                )));
            }
        }
        Ok(())
    }

    /// Side of the square target grid
    ///
    /// # Errors
    ///
    /// Returns an error when `num_points` is not a perfect square between
    /// 2 x 2 and 10 x 10
    pub fn grid_side(&self) -> Result<usize> {
        match exact_sqrt(self.num_points) {
            Some(side) if (MIN_GRID_SIDE..=MAX_GRID_SIDE).contains(&side) => Ok(side),
            _ => Err(Error::InvalidConfiguration(format!(
                "Number of points must be a perfect square from {} to {}, got {}",
                MIN_GRID_SIDE * MIN_GRID_SIDE,
                MAX_GRID_SIDE * MAX_GRID_SIDE,
                self.num_points
            ))),
        }
    }

    /// Settle time as a `Duration`
    ///
    /// # Errors
    ///
    /// Returns an error when `sample_delay` is negative, not finite, or too
    /// large for a `Duration`
    pub fn settle_time(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.sample_delay).map_err(|e| {
            Error::InvalidConfiguration(format!(
                "Sample delay must be a non-negative number of seconds, got {}: {e}",
                self.sample_delay
            ))
        })
    }

    /// Effective poll ceiling per target
    #[must_use]
    pub fn poll_ceiling(&self) -> usize {
        self.max_polls_per_point
            .unwrap_or_else(|| self.samples_per_point.saturating_mul(POLL_CEILING_FACTOR))
    }
}

impl MapperConfig {
    /// Parsed fitting method and effective degree
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown method name
    pub fn method(&self) -> Result<(MapperMethod, usize)> {
        MapperMethod::parse_with_degree(&self.method, self.degree)
    }
}

impl FilterConfig {
    /// Parsed filter profile
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown profile name
    pub fn profile(&self) -> Result<FilterProfile> {
        self.profile.parse()
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration document
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| Error::InvalidConfiguration(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::InvalidConfiguration(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Create the configured smoothing filter
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown profile or invalid frame rate
    pub fn create_filter(&self) -> Result<Box<dyn PointFilter>> {
        if !self.filter.enabled {
            return crate::filters::create_filter("off");
        }
        let filter = TemporalFilter::new(self.filter.profile()?).with_frame_rate(self.filter.frame_rate)?;
        Ok(Box::new(filter))
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns the first problem found in any section
    pub fn validate(&self) -> Result<()> {
        self.calibration.validate()?;
        self.mapper.method()?;
        self.filter.profile()?;
        if !(self.filter.frame_rate.is_finite() && self.filter.frame_rate > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "Frame rate must be positive, got {}",
                self.filter.frame_rate
            )));
        }
        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Gaze Calibration Configuration

# Calibration capture
calibration:
  screen_width: 1920
  screen_height: 1080
  num_points: 9
  margin: 0.15
  samples_per_point: 30
  sample_delay: 0.8

# Screen mapper
mapper:
  method: "polynomial"
  degree: 2
  file: "calibration.json"

# Smoothing
filter:
  profile: "balanced"
  enabled: true
  frame_rate: 30.0
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_matches_defaults() {
        let parsed = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
        assert_eq!(parsed, Config::default());
        parsed.validate().unwrap();
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed = Config::from_yaml("filter:\n  profile: child\n").unwrap();
        assert_eq!(parsed.filter.profile().unwrap(), FilterProfile::Child);
        assert_eq!(parsed.calibration, CalibrationConfig::default());
    }

    #[test]
    fn test_rejects_bad_calibration_values() {
        let base = CalibrationConfig::default();

        let cases = [
            CalibrationConfig { screen_width: 0, ..base.clone() },
            CalibrationConfig { screen_height: 0, ..base.clone() },
            CalibrationConfig { num_points: 8, ..base.clone() },
            CalibrationConfig { num_points: 1, ..base.clone() },
            CalibrationConfig { margin: 0.5, ..base.clone() },
            CalibrationConfig { margin: -0.01, ..base.clone() },
            CalibrationConfig { margin: f64::NAN, ..base.clone() },
            CalibrationConfig { samples_per_point: 0, ..base.clone() },
            CalibrationConfig { num_points: 121, ..base.clone() },
            CalibrationConfig { num_points: usize::MAX, ..base.clone() },
            CalibrationConfig { sample_delay: -1.0, ..base.clone() },
            CalibrationConfig { sample_delay: f64::NAN, ..base.clone() },
            CalibrationConfig { sample_delay: 1e20, ..base.clone() },
            CalibrationConfig { max_polls_per_point: Some(5), ..base.clone() },
        ];

        for config in cases {
            match config.validate() {
                Err(Error::InvalidConfiguration(_)) => {}
                other => panic!("Expected InvalidConfiguration for {config:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_poll_ceiling_default() {
        let config = CalibrationConfig::default();
        assert_eq!(config.poll_ceiling(), 300);
        let config = CalibrationConfig {
            max_polls_per_point: Some(45),
            ..config
        };
        assert_eq!(config.poll_ceiling(), 45);
    }

    #[test]
    fn test_grid_side() {
        let config = CalibrationConfig {
            num_points: 16,
            ..CalibrationConfig::default()
        };
        assert_eq!(config.grid_side().unwrap(), 4);

        let largest = CalibrationConfig {
            num_points: 100,
            ..CalibrationConfig::default()
        };
        assert_eq!(largest.grid_side().unwrap(), 10);
    }

    #[test]
    fn test_settle_time() {
        let config = CalibrationConfig::default();
        assert_eq!(config.settle_time().unwrap(), Duration::from_millis(800));

        let huge = CalibrationConfig {
            sample_delay: 1e20,
            ..config
        };
        assert!(matches!(huge.settle_time(), Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            Config::from_yaml("calibration: [1, 2"),
            Err(Error::InvalidConfiguration(_))
        ));
        let bad_profile = Config::from_yaml("filter:\n  profile: jittery\n").unwrap();
        assert!(bad_profile.validate().is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gaze.yaml");

        let mut config = Config::default();
        config.filter.profile = "smooth".to_string();
        config.calibration.max_polls_per_point = Some(120);
        config.to_file(&path).unwrap();

        assert_eq!(Config::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_create_filter_respects_enabled() {
        let mut config = Config::default();
        assert_eq!(config.create_filter().unwrap().name(), "balanced");
        config.filter.enabled = false;
        assert_eq!(config.create_filter().unwrap().name(), "off");
    }
}
