//! Integration tests for the calibration to tracking pipeline


use approx::assert_relative_eq;
use gaze_calibration::{
    calibration::CalibrationSession,
    clock::ManualClock,
    config::{CalibrationConfig, Config},
    mapping::ScreenMapper,
    tracker::GazeTracker,
    types::{GazeAngle, ScreenPoint},
    Error,
};
use std::time::Duration;
use test_helpers::{init_logging, true_gaze, SyntheticUser};

fn default_session(clock: &ManualClock) -> CalibrationSession<ManualClock> {
    CalibrationSession::with_clock(CalibrationConfig::default(), clock.clone()).unwrap()
}

/// 30 samples per target, 0.8 s settle and five dropped polls per target
#[test]
fn test_end_to_end_nine_point_calibration() {
    init_logging();
    let clock = ManualClock::new();
    let mut session = default_session(&clock);

    let mut user = SyntheticUser::new(&clock);
    user.nulls_per_target = 5;
    user.settle = Duration::from_millis(800);
    let (mut source, mut observer) = user.split();

    let dataset = session.capture(&mut source, &mut observer).unwrap();
    assert_eq!(dataset.len(), 9);
    assert_eq!(source.shown(), 9);
    assert_eq!(source.captured().len(), 9);
    assert_eq!(source.interleaved_nulls(), 45);

    for (point, target) in dataset.iter().zip(session.targets()) {
        assert_eq!(point.target_index, target.index);
        assert_eq!(point.target, target.position);
        assert_eq!(point.sample_count, 30);
        assert_relative_eq!(point.gaze.pitch, true_gaze(target.position).pitch, epsilon = 1e-12);
        assert_relative_eq!(point.gaze.yaw, true_gaze(target.position).yaw, epsilon = 1e-12);
    }

    let mapper = session.create_mapper("polynomial", 2).unwrap();
    assert!(mapper.rms_error(&dataset) < 1e-6);

    let off_grid = ScreenPoint::new(700.0, 300.0);
    let predicted = mapper.predict(true_gaze(off_grid));
    assert_relative_eq!(predicted.x, off_grid.x, epsilon = 1e-6);
    assert_relative_eq!(predicted.y, off_grid.y, epsilon = 1e-6);
}

#[test]
fn test_dropped_polls_do_not_change_estimates() {
    let run = |nulls: usize, every: usize| {
        let clock = ManualClock::new();
        let mut session = default_session(&clock);
        let mut user = SyntheticUser::new(&clock);
        user.nulls_per_target = nulls;
        user.null_every = every;
        user.settle = Duration::from_millis(800);
        user.jitter = 0.01;
        let (mut source, mut observer) = user.split();
        let dataset = session.capture(&mut source, &mut observer).unwrap();
        (dataset, source.interleaved_nulls())
    };

    let (clean, _) = run(0, 3);
    for (nulls, every) in [(5, 1), (5, 4), (12, 2), (5, 0)] {
        let (with_dropouts, interleaved) = run(nulls, every);
        assert_eq!(clean, with_dropouts, "{nulls} dropped polls every {every} samples");
        if every > 0 {
            assert_eq!(interleaved, 9 * nulls);
        }
    }
}

#[test]
fn test_lost_tracking_fails_at_ceiling() {
    let clock = ManualClock::new();
    let mut session = default_session(&clock);
    let mut user = SyntheticUser::new(&clock);
    user.dead = true;
    let (mut source, mut observer) = user.split();

    assert!(!session.run_with_observer(&mut source, &mut observer));
    match session.failure() {
        Some(Error::CalibrationIncomplete { target, polls, .. }) => {
            assert_eq!(*target, 0);
            assert_eq!(*polls, 300);
        }
        other => panic!("Expected CalibrationIncomplete, got {other:?}"),
    }
    assert!(session.dataset().is_none());
}

#[test]
fn test_cancel_mid_run() {
    let clock = ManualClock::new();
    let mut session = default_session(&clock);
    let mut user = SyntheticUser::new(&clock);
    user.cancel_after = Some(6);
    let (mut source, mut observer) = user.split();

    let result = session.capture(&mut source, &mut observer);
    assert!(matches!(result, Err(Error::CalibrationCancelled { target: 6 })));
    assert!(session.dataset().is_none());
    assert!(session.create_mapper("polynomial", 2).is_err());
}

#[test]
fn test_tracker_calibrates_saves_and_reloads() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calibration.json");

    let mut config = Config::default();
    config.filter.enabled = false;
    config.mapper.file = path.clone();

    let clock = ManualClock::new();
    let mut tracker = GazeTracker::new(config.clone()).unwrap();
    let mut user = SyntheticUser::new(&clock);
    user.settle = Duration::from_millis(800);
    let (mut source, mut observer) = user.split();

    assert!(tracker.calibrate_with(clock, &mut source, &mut observer).unwrap());
    tracker.save_configured().unwrap();
    assert!(path.exists());

    let mut reloaded = GazeTracker::new(config).unwrap();
    assert!(reloaded.load_configured().unwrap());

    for point in [ScreenPoint::new(100.0, 100.0), ScreenPoint::new(960.0, 540.0), ScreenPoint::new(1800.0, 1000.0)] {
        let gaze = true_gaze(point);
        let a = tracker.map(gaze).unwrap();
        let b = reloaded.map(gaze).unwrap();
        assert_relative_eq!(a.x, b.x, epsilon = 1e-6);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-6);
        assert_relative_eq!(a.x, point.x, epsilon = 1e-4);
        assert_relative_eq!(a.y, point.y, epsilon = 1e-4);
    }

    let tracked = reloaded.process(Some(true_gaze(ScreenPoint::new(5000.0, -300.0)))).unwrap();
    assert_eq!(tracked.screen, Some(ScreenPoint::new(1919.0, 0.0)));
}

#[test]
fn test_tracker_smooths_screen_output() {
    let mut tracker = GazeTracker::new(Config::default()).unwrap();
    let mapper = ScreenMapper::from_json(
        r#"{"method": "linear", "degree": 1, "coeffs_x": [960, 0, 2000], "coeffs_y": [540, 1800, 0]}"#,
    );
    // "linear" is a configuration alias, not a file tag
    assert!(matches!(mapper, Err(Error::MalformedCalibrationFile(_))));

    let mapper = ScreenMapper::from_json(
        r#"{"method": "polynomial", "degree": 1, "coeffs_x": [960, 0, 2000], "coeffs_y": [540, 1800, 0]}"#,
    )
    .unwrap();
    tracker.set_mapper(mapper);

    let first = tracker.process(Some(GazeAngle::new(0.0, 0.0))).unwrap();
    assert_eq!(first.screen, Some(ScreenPoint::new(960.0, 540.0)));

    // A jump is followed, but not in a single frame
    let jumped = tracker.process(Some(GazeAngle::new(0.0, 0.2))).unwrap().screen.unwrap();
    assert!(jumped.x > 960.0 && jumped.x < 1360.0);
}
