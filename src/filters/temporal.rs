use super::low_pass::{smoothing_factor, LowPassFilter};
use super::profile::{FilterParams, FilterProfile};
use super::PointFilter;
use crate::constants::DEFAULT_FPS;
use crate::{Error, Result};

/// One axis of a One Euro filter: a speed-adaptive low-pass
#[derive(Debug, Clone, Default)]
struct OneEuroChannel {
    value: LowPassFilter,
    derivative: LowPassFilter,
}

impl OneEuroChannel {
    fn apply(&mut self, input: f64, dt: f64, params: &FilterParams) -> f64 {
        let Some(previous) = self.value.last() else {
            self.derivative.apply(0.0, 1.0);
            return self.value.apply(input, 1.0);
        };

        let speed = (input - previous) / dt;
        let smoothed_speed = self
            .derivative
            .apply(speed, smoothing_factor(dt, params.d_cutoff));
        let cutoff = params.beta.mul_add(smoothed_speed.abs(), params.min_cutoff);

        self.value.apply(input, smoothing_factor(dt, cutoff))
    }

    fn last(&self) -> Option<f64> {
        self.value.last()
    }

    fn reset(&mut self) {
        self.value.reset();
        self.derivative.reset();
    }
}

/// Temporal smoothing for a stream of `(x, y)` pairs
///
/// Each axis runs a One Euro filter: at rest the cutoff sits at
/// `min_cutoff`, and it rises with the smoothed speed so fast saccades are
/// followed with little lag. One instance serves one logical channel pair
/// (gaze angles or screen points), never both.
#[derive(Debug, Clone)]
pub struct TemporalFilter {
    profile: Option<FilterProfile>,
    params: FilterParams,
    frame_interval: f64,
    x: OneEuroChannel,
    y: OneEuroChannel,
    last_timestamp: Option<f64>,
}

impl TemporalFilter {
    /// Create a filter for a named profile at the default frame rate
    #[must_use]
    pub fn new(profile: FilterProfile) -> Self {
        Self {
            profile: Some(profile),
            params: profile.params(),
            frame_interval: 1.0 / DEFAULT_FPS,
            x: OneEuroChannel::default(),
            y: OneEuroChannel::default(),
            last_timestamp: None,
        }
    }

    /// Create a filter from explicit parameters
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid or the frame rate is not positive
    pub fn with_params(params: FilterParams, frame_rate: f64) -> Result<Self> {
        params.validate()?;
        let mut filter = Self::new(FilterProfile::default()).with_frame_rate(frame_rate)?;
        filter.profile = None;
        filter.params = params;
        Ok(filter)
    }

    /// Set the nominal sample rate used by [`TemporalFilter::filter`]
    ///
    /// # Errors
    ///
    /// Returns an error if the frame rate is not a positive finite number
    pub fn with_frame_rate(mut self, frame_rate: f64) -> Result<Self> {
        if !(frame_rate.is_finite() && frame_rate > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "Frame rate must be positive, got {frame_rate}"
            )));
        }
        self.frame_interval = 1.0 / frame_rate;
        Ok(self)
    }

    /// Smooth one sample taken one nominal frame after the previous one
    pub fn filter(&mut self, x: f64, y: f64) -> (f64, f64) {
        self.update(x, y, self.frame_interval)
    }

    /// Smooth one sample captured at `timestamp` seconds
    ///
    /// Timestamps that do not move forward fall back to the nominal frame
    /// interval.
    pub fn filter_at(&mut self, x: f64, y: f64, timestamp: f64) -> (f64, f64) {
        if !(x.is_finite() && y.is_finite() && timestamp.is_finite()) {
            return self.hold(x, y);
        }

        let dt = match self.last_timestamp {
            Some(last) if timestamp > last => timestamp - last,
            _ => self.frame_interval,
        };
        self.last_timestamp = Some(timestamp);
        self.update(x, y, dt)
    }

    fn update(&mut self, x: f64, y: f64, dt: f64) -> (f64, f64) {
        if !(x.is_finite() && y.is_finite()) {
            return self.hold(x, y);
        }
        (
            self.x.apply(x, dt, &self.params),
            self.y.apply(y, dt, &self.params),
        )
    }

    /// Output for an ignored sample: the last smoothed value, or the input if there is none
    fn hold(&self, x: f64, y: f64) -> (f64, f64) {
        match (self.x.last(), self.y.last()) {
            (Some(last_x), Some(last_y)) => (last_x, last_y),
            _ => (x, y),
        }
    }

    /// Discard all state; the next sample passes through unchanged
    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
        self.last_timestamp = None;
    }

    /// Last smoothed value, if any sample has been accepted
    #[must_use]
    pub fn current(&self) -> Option<(f64, f64)> {
        Some((self.x.last()?, self.y.last()?))
    }

    #[must_use]
    pub const fn profile(&self) -> Option<FilterProfile> {
        self.profile
    }

    #[must_use]
    pub const fn params(&self) -> &FilterParams {
        &self.params
    }
}

impl PointFilter for TemporalFilter {
    fn apply(&mut self, x: f64, y: f64) -> (f64, f64) {
        self.filter(x, y)
    }

    fn reset(&mut self) {
        TemporalFilter::reset(self);
    }

    fn name(&self) -> &str {
        self.profile.map_or("custom", FilterProfile::as_str)
    }
}
