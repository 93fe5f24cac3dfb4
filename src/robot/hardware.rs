use crate::robot::error::RobotError;

/// Controller-board primitives the rover is built on: hobby servos for the
/// wheels and gripper, a blob-tracking camera, and a millisecond clock.
pub trait Hardware {
    fn enable_servo(&mut self, pin: u8) -> Result<(), RobotError>;

    fn set_servo_position(&mut self, pin: u8, position: i32) -> Result<(), RobotError>;

    fn camera_open(&mut self) -> Result<(), RobotError>;

    /// Grabs a fresh frame and runs blob detection on it.
    fn camera_update(&mut self) -> Result<(), RobotError>;

    /// Number of blobs seen on `channel` in the last frame.
    fn object_count(&self, channel: u8) -> Result<usize, RobotError>;

    fn now_ms(&self) -> u64;

    fn sleep_ms(&mut self, ms: u64);
}

/// Linear map of `value` from one range onto another.
pub fn map_range(value: f32, from_low: f32, from_high: f32, to_low: f32, to_high: f32) -> f32 {
    to_low + ((value - from_low) / (from_high - from_low)) * (to_high - to_low)
}

/// Servo positions for a pair of normalized wheel speeds. The right motor
/// is mounted mirrored, so its range is reversed.
pub fn wheel_positions(left: f32, right: f32, full_scale: f32) -> (i32, i32) {
    let left = left.clamp(-1.0, 1.0);
    let right = right.clamp(-1.0, 1.0);
    (
        map_range(left, -1.0, 1.0, 0.0, full_scale) as i32,
        map_range(right, -1.0, 1.0, full_scale, 0.0) as i32,
    )
}

/// Inverse of [`wheel_positions`].
pub fn wheel_speeds(left_position: i32, right_position: i32, full_scale: f32) -> (f32, f32) {
    (
        map_range(left_position as f32, 0.0, full_scale, -1.0, 1.0),
        map_range(right_position as f32, full_scale, 0.0, -1.0, 1.0),
    )
}
