use super::dataset::{CalibrationDataset, CalibrationPointEstimate, CalibrationSample};
use super::targets::{generate_targets, CalibrationTarget};
use super::{CalibrationObserver, GazeSource, NoopObserver};
use crate::clock::{Clock, SystemClock};
use crate::config::CalibrationConfig;
use crate::mapping::ScreenMapper;
use crate::{Error, Result};
use log::{debug, info, warn};
use std::time::Instant;

/// One calibration run over a fixed grid of targets
///
/// Targets are laid out once at construction. Each call to [`run`] or
/// [`capture`] starts from scratch and replaces the previous outcome.
///
/// Time is read from the injected [`Clock`] at every poll and the session
/// never sleeps, so a source that returns immediately simply spins through
/// the settle time. With a [`ManualClock`](crate::clock::ManualClock) the
/// source is responsible for advancing time.
///
/// [`run`]: CalibrationSession::run
/// [`capture`]: CalibrationSession::capture
#[derive(Debug)]
pub struct CalibrationSession<C: Clock = SystemClock> {
    config: CalibrationConfig,
    targets: Vec<CalibrationTarget>,
    clock: C,
    dataset: Option<CalibrationDataset>,
    failure: Option<Error>,
}

impl CalibrationSession<SystemClock> {
    /// Create a session driven by real time
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if any parameter is rejected
    pub fn new(config: CalibrationConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> CalibrationSession<C> {
    /// Create a session reading time from `clock`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if any parameter is rejected
    pub fn with_clock(config: CalibrationConfig, clock: C) -> Result<Self> {
        let targets = generate_targets(&config)?;
        Ok(Self {
            config,
            targets,
            clock,
            dataset: None,
            failure: None,
        })
    }

    /// Run the capture, reporting only success
    pub fn run<S: GazeSource + ?Sized>(&mut self, source: &mut S) -> bool {
        self.run_with_observer(source, &mut NoopObserver)
    }

    /// Run the capture with progress notifications, reporting only success
    ///
    /// The failure reason stays available through [`failure`](Self::failure).
    pub fn run_with_observer<S, O>(&mut self, source: &mut S, observer: &mut O) -> bool
    where
        S: GazeSource + ?Sized,
        O: CalibrationObserver + ?Sized,
    {
        match self.capture(source, observer) {
            Ok(_) => true,
            Err(e) => {
                warn!("Calibration failed: {e}");
                self.failure = Some(e);
                false
            }
        }
    }

    /// Run the capture and return the dataset or the reason it failed
    ///
    /// Anything collected by a failed run is discarded.
    ///
    /// # Errors
    ///
    /// Returns `CalibrationIncomplete` when a target hits its poll ceiling
    /// and `CalibrationCancelled` when the observer aborts
    pub fn capture<S, O>(&mut self, source: &mut S, observer: &mut O) -> Result<CalibrationDataset>
    where
        S: GazeSource + ?Sized,
        O: CalibrationObserver + ?Sized,
    {
        self.dataset = None;
        self.failure = None;

        info!(
            "Starting calibration: {} targets, {} samples each, {:.2}s settle",
            self.targets.len(),
            self.config.samples_per_point,
            self.config.sample_delay
        );

        let started = self.clock.now();
        let mut points = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            let samples = self.collect_target(target, started, source, observer)?;
            let estimate = CalibrationPointEstimate::from_samples(target, &samples).ok_or_else(|| {
                Error::InvalidState(format!("Target {} produced no samples", target.index))
            })?;
            debug!(
                "Target {} at ({:.0}, {:.0}): pitch {:.4}, yaw {:.4} from {} samples",
                target.index,
                target.position.x,
                target.position.y,
                estimate.gaze.pitch,
                estimate.gaze.yaw,
                estimate.sample_count
            );
            observer.on_target_captured(&estimate);
            points.push(estimate);
        }

        let dataset = CalibrationDataset::new(points, self.targets.len())?;
        info!("Calibration complete: {} points", dataset.len());
        self.dataset = Some(dataset.clone());
        Ok(dataset)
    }

    fn collect_target<S, O>(
        &self,
        target: &CalibrationTarget,
        started: Instant,
        source: &mut S,
        observer: &mut O,
    ) -> Result<Vec<CalibrationSample>>
    where
        S: GazeSource + ?Sized,
        O: CalibrationObserver + ?Sized,
    {
        let required = self.config.samples_per_point;
        let ceiling = self.config.poll_ceiling();
        let settle = self.config.settle_time()?;

        observer.on_target_shown(target);
        let shown_at = self.clock.now();

        let mut samples = Vec::with_capacity(required);
        let mut polls = 0;
        let mut settle_polls = 0usize;
        while samples.len() < required {
            if polls >= ceiling {
                return Err(Error::CalibrationIncomplete {
                    target: target.index,
                    collected: samples.len(),
                    required,
                    polls,
                });
            }
            if observer.is_cancelled() {
                return Err(Error::CalibrationCancelled { target: target.index });
            }

            let reading = source.next_gaze();
            let now = self.clock.now();
            if now.saturating_duration_since(shown_at) < settle {
                settle_polls += 1;
                continue;
            }

            polls += 1;
            if let Some(gaze) = reading.filter(|g| g.is_finite()) {
                samples.push(CalibrationSample {
                    gaze,
                    target_index: target.index,
                    captured_at: now.saturating_duration_since(started),
                });
            }
        }

        debug!(
            "Target {}: {} samples in {polls} polls ({settle_polls} discarded while settling)",
            target.index,
            samples.len()
        );
        Ok(samples)
    }

    /// Fit a mapper from the last successful capture
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if no complete dataset exists, otherwise any
    /// fitting error
    pub fn create_mapper(&self, method: &str, degree: usize) -> Result<ScreenMapper> {
        let dataset = self.dataset.as_ref().ok_or_else(|| {
            Error::InvalidState("Cannot create a mapper before a successful calibration".to_string())
        })?;
        ScreenMapper::fit(dataset, method, degree)
    }

    /// Dataset from the last successful capture
    #[must_use]
    pub const fn dataset(&self) -> Option<&CalibrationDataset> {
        self.dataset.as_ref()
    }

    /// Take ownership of the dataset, consuming the session
    #[must_use]
    pub fn into_dataset(self) -> Option<CalibrationDataset> {
        self.dataset
    }

    /// Why the last `run` failed, if it did
    #[must_use]
    pub const fn failure(&self) -> Option<&Error> {
        self.failure.as_ref()
    }

    #[must_use]
    pub fn targets(&self) -> &[CalibrationTarget] {
        &self.targets
    }

    #[must_use]
    pub const fn config(&self) -> &CalibrationConfig {
        &self.config
    }
}
