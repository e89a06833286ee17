//! Gaze tracking pipeline: smoothing, calibration and screen mapping.

use crate::{
    calibration::{CalibrationObserver, CalibrationSession, GazeSource, NoopObserver},
    clock::{Clock, SystemClock},
    config::Config,
    error::{Error, Result},
    filters::{FilterProfile, NoFilter, PointFilter, TemporalFilter},
    mapping::ScreenMapper,
    types::{GazeAngle, ScreenPoint},
};
use log::{info, warn};
use std::path::Path;

/// Result of processing one gaze reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedGaze {
    /// Smoothed gaze angle
    pub gaze: GazeAngle,
    /// Smoothed on-screen position, when a calibration is loaded
    pub screen: Option<ScreenPoint>,
}

/// Turns a stream of raw gaze readings into screen positions
pub struct GazeTracker {
    config: Config,
    mapper: Option<ScreenMapper>,
    gaze_filter: Box<dyn PointFilter>,
    screen_filter: Box<dyn PointFilter>,
}

impl GazeTracker {
    /// Create an uncalibrated tracker
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the configuration does not validate
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        info!(
            "Initializing gaze tracker for {}x{} screen",
            config.calibration.screen_width, config.calibration.screen_height
        );

        let gaze_filter = config.create_filter()?;
        let screen_filter = config.create_filter()?;
        info!("Smoothing: {}", gaze_filter.name());

        Ok(Self {
            config,
            mapper: None,
            gaze_filter,
            screen_filter,
        })
    }

    /// Process one reading from the gaze estimator
    ///
    /// Absent or non-finite readings produce `None` and leave the filters
    /// untouched.
    pub fn process(&mut self, reading: Option<GazeAngle>) -> Option<TrackedGaze> {
        let raw = reading.filter(GazeAngle::is_finite)?;
        let (pitch, yaw) = self.gaze_filter.apply(raw.pitch, raw.yaw);
        let gaze = GazeAngle::new(pitch, yaw);

        let screen = self.mapper.as_ref().map(|mapper| {
            let point = mapper.predict(gaze);
            let (x, y) = self.screen_filter.apply(point.x, point.y);
            ScreenPoint::new(x, y).clamp_to(self.config.calibration.screen_width, self.config.calibration.screen_height)
        });

        Some(TrackedGaze { gaze, screen })
    }

    /// Map a gaze angle without smoothing or clamping
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if no calibration is loaded
    pub fn map(&self, gaze: GazeAngle) -> Result<ScreenPoint> {
        self.mapper
            .as_ref()
            .map(|mapper| mapper.predict(gaze))
            .ok_or_else(|| Error::InvalidState("Gaze tracker is not calibrated".to_string()))
    }

    /// Run a calibration against real time
    ///
    /// # Errors
    ///
    /// See [`GazeTracker::calibrate_with`]
    pub fn calibrate<S: GazeSource + ?Sized>(&mut self, source: &mut S) -> Result<bool> {
        self.calibrate_with(SystemClock, source, &mut NoopObserver)
    }

    /// Run a calibration and install the fitted mapper
    ///
    /// Returns `Ok(false)` when the capture fails or is cancelled; the
    /// previous mapper, if any, stays in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the mapper cannot be fit from a complete capture
    pub fn calibrate_with<C, S, O>(&mut self, clock: C, source: &mut S, observer: &mut O) -> Result<bool>
    where
        C: Clock,
        S: GazeSource + ?Sized,
        O: CalibrationObserver + ?Sized,
    {
        let mut session = CalibrationSession::with_clock(self.config.calibration.clone(), clock)?;
        let dataset = match session.capture(source, observer) {
            Ok(dataset) => dataset,
            Err(e) if e.is_calibration_failure() => {
                warn!("Calibration failed, keeping previous mapper: {e}");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let (method, degree) = self.config.mapper.method()?;
        let mapper = ScreenMapper::fit_with(&dataset, method, degree)?;
        self.set_mapper(mapper);
        Ok(true)
    }

    /// Save the current calibration
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if no calibration is loaded, or an I/O error
    pub fn save_calibration<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mapper = self
            .mapper
            .as_ref()
            .ok_or_else(|| Error::InvalidState("No calibration to save".to_string()))?;
        mapper.save(path)
    }

    /// Load a saved calibration, replacing the current one
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is malformed; the
    /// current calibration is kept in that case
    pub fn load_calibration<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let mapper = ScreenMapper::load(path)?;
        self.set_mapper(mapper);
        Ok(())
    }

    /// Save the current calibration to the configured mapper file
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if no calibration is loaded, or an I/O error
    pub fn save_configured(&self) -> Result<()> {
        self.save_calibration(&self.config.mapper.file)
    }

    /// Load the configured mapper file if it exists
    ///
    /// Returns `false` and keeps the current calibration when there is no
    /// file at the configured path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is malformed
    pub fn load_configured(&mut self) -> Result<bool> {
        let path = &self.config.mapper.file;
        if !path.exists() {
            info!("No saved calibration at {}", path.display());
            return Ok(false);
        }
        let mapper = ScreenMapper::load(path)?;
        self.set_mapper(mapper);
        Ok(true)
    }

    /// Drop the current calibration
    pub fn reset_calibration(&mut self) {
        if self.mapper.take().is_some() {
            info!("Calibration cleared");
        }
        self.screen_filter.reset();
    }

    /// Install a mapper, restarting screen smoothing
    pub fn set_mapper(&mut self, mapper: ScreenMapper) {
        info!("Using {} mapper (degree {})", mapper.method(), mapper.degree());
        self.mapper = Some(mapper);
        self.screen_filter.reset();
    }

    /// Replace both filters with fresh ones for `profile`
    ///
    /// # Errors
    ///
    /// Returns an error if the configured frame rate is invalid
    pub fn enable_filter(&mut self, profile: FilterProfile) -> Result<()> {
        let frame_rate = self.config.filter.frame_rate;
        self.gaze_filter = Box::new(TemporalFilter::new(profile).with_frame_rate(frame_rate)?);
        self.screen_filter = Box::new(TemporalFilter::new(profile).with_frame_rate(frame_rate)?);
        self.config.filter.profile = profile.as_str().to_string();
        self.config.filter.enabled = true;
        info!("Smoothing enabled: {profile}");
        Ok(())
    }

    /// Pass readings through unsmoothed
    pub fn disable_filter(&mut self) {
        self.gaze_filter.reset();
        self.screen_filter.reset();
        self.gaze_filter = Box::new(NoFilter);
        self.screen_filter = Box::new(NoFilter);
        self.config.filter.enabled = false;
        info!("Smoothing disabled");
    }

    #[must_use]
    pub const fn is_calibrated(&self) -> bool {
        self.mapper.is_some()
    }

    #[must_use]
    pub const fn mapper(&self) -> Option<&ScreenMapper> {
        self.mapper.as_ref()
    }

    /// Name of the active smoothing filter
    #[must_use]
    pub fn filter_name(&self) -> &str {
        self.gaze_filter.name()
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}
