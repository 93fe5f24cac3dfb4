use log::{debug, error};

use crate::robot::config::SearchConfig;
use crate::robot::error::RobotError;
use crate::robot::platform::Platform;
use crate::robot::state::SearchState;

pub const FULL_ROTATION_DEGREES: f64 = 360.0;

/// Estimates how far the robot turned during one spin slice.
pub trait HeadingEstimator {
    /// Degrees turned while spinning for `slice_seconds`.
    fn advance(&mut self, slice_seconds: f64) -> f64;
}

/// Assumes one full turn per second of spinning. No heading sensor is
/// consulted, so the estimate drifts with wheel slip and battery level.
#[derive(Debug, Clone, Copy)]
pub struct OpenLoopEstimator {
    pub degrees_per_second: f64,
}

impl Default for OpenLoopEstimator {
    fn default() -> Self {
        Self {
            degrees_per_second: FULL_ROTATION_DEGREES,
        }
    }
}

impl HeadingEstimator for OpenLoopEstimator {
    fn advance(&mut self, slice_seconds: f64) -> f64 {
        slice_seconds * self.degrees_per_second
    }
}

/// One slice of the slow rotational sweep, plus the running angle since
/// the last completed rotation.
#[derive(Debug, Clone)]
pub struct SpinSearch<E = OpenLoopEstimator> {
    total_angle: f64,
    estimator: E,
    left_speed: f32,
    right_speed: f32,
    slice_seconds: f64,
}

impl SpinSearch<OpenLoopEstimator> {
    pub fn new(config: &SearchConfig) -> Self {
        Self::with_estimator(config, OpenLoopEstimator::default())
    }
}

impl<E: HeadingEstimator> SpinSearch<E> {
    pub fn with_estimator(config: &SearchConfig, estimator: E) -> Self {
        Self {
            total_angle: 0.0,
            estimator,
            left_speed: config.spin_left_speed,
            right_speed: config.spin_right_speed,
            slice_seconds: config.spin_slice_seconds,
        }
    }

    pub fn total_angle(&self) -> f64 {
        self.total_angle
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    /// Issues one spin slice. Returns `Ok(true)` when this slice completed
    /// a full rotation, in which case `state.spin_count` was incremented.
    /// A failed drive leaves the angle untouched.
    pub fn step<P: Platform + ?Sized>(
        &mut self,
        platform: &mut P,
        state: &mut SearchState,
    ) -> Result<bool, RobotError> {
        let slice = self.slice_seconds as f32;
        if let Err(e) = platform.drive(self.left_speed, self.right_speed, slice) {
            error!("Robot: Spin slice failed: {}", e);
            return Err(e);
        }

        self.total_angle += self.estimator.advance(self.slice_seconds);

        if self.total_angle >= FULL_ROTATION_DEGREES {
            self.total_angle = 0.0;
            state.record_rotation();
            debug!("Robot: Full rotation completed, spin count {}.", state.spin_count);
            return Ok(true);
        }
        Ok(false)
    }
}
