use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named smoothing preset trading lag against noise rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterProfile {
    /// Strongest noise rejection, highest lag
    Smooth,
    /// Mid-point default
    Balanced,
    /// Lowest lag, least rejection
    Responsive,
    /// Faster, less stable motion of a child user
    Child,
}

/// One Euro parameters behind a profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    /// Cutoff frequency at rest, in Hz
    pub min_cutoff: f64,
    /// How fast the cutoff rises with speed
    pub beta: f64,
    /// Cutoff used to smooth the speed estimate, in Hz
    pub d_cutoff: f64,
}

impl FilterParams {
    /// Check that the parameters describe a stable filter
    ///
    /// # Errors
    ///
    /// Returns an error if a cutoff is not positive or beta is negative
    pub fn validate(&self) -> Result<()> {
        if !(self.min_cutoff.is_finite() && self.min_cutoff > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "Minimum cutoff must be positive, got {}",
                self.min_cutoff
            )));
        }
        if !(self.d_cutoff.is_finite() && self.d_cutoff > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "Derivative cutoff must be positive, got {}",
                self.d_cutoff
            )));
        }
        if !(self.beta.is_finite() && self.beta >= 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "Beta must be non-negative, got {}",
                self.beta
            )));
        }
        Ok(())
    }
}

impl FilterProfile {
    /// Every profile, from most to least smoothing
    pub const ALL: [Self; 4] = [Self::Smooth, Self::Balanced, Self::Child, Self::Responsive];

    #[must_use]
    pub const fn params(self) -> FilterParams {
        match self {
            Self::Smooth => FilterParams {
                min_cutoff: 0.3,
                beta: 0.001,
                d_cutoff: 1.0,
            },
            Self::Balanced => FilterParams {
                min_cutoff: 1.0,
                beta: 0.007,
                d_cutoff: 1.0,
            },
            Self::Responsive => FilterParams {
                min_cutoff: 2.5,
                beta: 0.02,
                d_cutoff: 1.0,
            },
            Self::Child => FilterParams {
                min_cutoff: 1.5,
                beta: 0.05,
                d_cutoff: 1.5,
            },
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Smooth => "smooth",
            Self::Balanced => "balanced",
            Self::Responsive => "responsive",
            Self::Child => "child",
        }
    }
}

impl Default for FilterProfile {
    fn default() -> Self {
        Self::Balanced
    }
}

impl fmt::Display for FilterProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "smooth" => Ok(Self::Smooth),
            "balanced" => Ok(Self::Balanced),
            "responsive" => Ok(Self::Responsive),
            "child" => Ok(Self::Child),
            _ => Err(Error::InvalidConfiguration(format!(
                "Unknown filter profile: {s} (expected smooth, balanced, responsive or child)"
            ))),
        }
    }
}
