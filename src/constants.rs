//! Constants used throughout the library

/// Default screen size in pixels
pub const DEFAULT_SCREEN_WIDTH: u32 = 1920;
pub const DEFAULT_SCREEN_HEIGHT: u32 = 1080;

/// Default calibration grid (3 x 3)
pub const DEFAULT_NUM_POINTS: usize = 9;

/// Default inset of the target grid, as a fraction of each screen dimension
pub const DEFAULT_MARGIN: f64 = 0.15;

/// Default number of valid samples gathered per target
pub const DEFAULT_SAMPLES_PER_POINT: usize = 30;

/// Default settle time after a target appears, in seconds
pub const DEFAULT_SAMPLE_DELAY_SECS: f64 = 0.8;

/// Poll ceiling per target, as a multiple of `samples_per_point`
pub const POLL_CEILING_FACTOR: usize = 10;

/// Smallest grid side supported by the target layout
pub const MIN_GRID_SIDE: usize = 2;

/// Largest grid side accepted by configuration (10 x 10 targets)
pub const MAX_GRID_SIDE: usize = 10;

/// Default mapper method and degree
pub const DEFAULT_MAPPER_METHOD: &str = "polynomial";
pub const DEFAULT_POLYNOMIAL_DEGREE: usize = 2;

/// Supported polynomial degrees
pub const MIN_POLYNOMIAL_DEGREE: usize = 1;
pub const MAX_POLYNOMIAL_DEGREE: usize = 4;

/// Default path of the persisted mapper
pub const DEFAULT_CALIBRATION_FILE: &str = "calibration.json";

/// Relative tolerance for SVD pseudo-inverse computation
pub const SVD_TOLERANCE: f64 = 1e-10;

/// Default frames per second assumption
pub const DEFAULT_FPS: f64 = 30.0;

/// Default filter profile name
pub const DEFAULT_FILTER_PROFILE: &str = "balanced";
