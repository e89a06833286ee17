/// First-order low-pass stage for a single channel
///
/// Unlike a fixed-alpha smoother the blend factor is supplied per sample, so
/// adaptive filters can move their cutoff frequency on every update.
#[derive(Debug, Clone, Default)]
pub struct LowPassFilter {
    last: Option<f64>,
}

impl LowPassFilter {
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Blend `value` into the state with factor `alpha` in (0, 1]
    ///
    /// The first value after construction or reset passes through unchanged.
    pub fn apply(&mut self, value: f64, alpha: f64) -> f64 {
        let filtered = match self.last {
            Some(last) => alpha.mul_add(value - last, last),
            None => value,
        };
        self.last = Some(filtered);
        filtered
    }

    /// Last filtered value, if any
    #[must_use]
    pub const fn last(&self) -> Option<f64> {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Blend factor of a first-order low-pass with cutoff `cutoff_hz` sampled every `dt` seconds
#[must_use]
pub fn smoothing_factor(dt: f64, cutoff_hz: f64) -> f64 {
    let tau = 1.0 / (2.0 * std::f64::consts::PI * cutoff_hz);
    1.0 / (1.0 + tau / dt)
}
