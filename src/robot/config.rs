use crate::robot::error::RobotError;

/// Number of full rotations without a sighting before the robot drives
/// forward and widens the spiral.
pub const ESCALATION_THRESHOLD: u32 = 5;
/// Forward-drive duration (seconds) of the first spiral step.
pub const INITIAL_SPIRAL_LENGTH: u32 = 1;

/// Wheel speeds of one spin-search slice (slight arc)
pub const SPIN_LEFT_SPEED: f32 = -0.07;
pub const SPIN_RIGHT_SPEED: f32 = 0.07;
/// Duration of one spin-search slice (seconds)
pub const SPIN_SLICE_SECONDS: f64 = 0.1;
/// Wheel speed of the spiral forward drive
pub const SPIRAL_SPEED: f32 = 0.3;

/// Servo pins of the controller board
pub const RIGHT_MOTOR_PIN: u8 = 0;
pub const LEFT_MOTOR_PIN: u8 = 1;
pub const GRIPPER_PIN: u8 = 2;

/// Gripper servo positions
pub const GRIPPER_OPEN_POSITION: i32 = 0;
pub const GRIPPER_CLOSED_POSITION: i32 = 1023;

/// Full-scale servo position for the drive motors
pub const SERVO_MAX_POSITION: f32 = 2047.0;

/// Camera channels configured on the controller
pub const TARGET_CHANNEL: u8 = 0;
pub const DROP_ZONE_CHANNEL: u8 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct IdleDanceConfig {
    /// Time without any sighting before the robot dances (milliseconds)
    pub after_ms: u64,
    /// How long the dance lasts (milliseconds)
    pub duration_ms: u64,
}

pub const DEFAULT_IDLE_DANCE: IdleDanceConfig = IdleDanceConfig {
    after_ms: 30_000,
    duration_ms: 10_000,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub escalation_threshold: u32,
    pub initial_spiral_length: u32,
    pub spin_left_speed: f32,
    pub spin_right_speed: f32,
    pub spin_slice_seconds: f64,
    pub spiral_speed: f32,
    pub idle_dance: Option<IdleDanceConfig>,
}

pub const DEFAULT_SEARCH_CONFIG: SearchConfig = SearchConfig {
    escalation_threshold: ESCALATION_THRESHOLD,
    initial_spiral_length: INITIAL_SPIRAL_LENGTH,
    spin_left_speed: SPIN_LEFT_SPEED,
    spin_right_speed: SPIN_RIGHT_SPEED,
    spin_slice_seconds: SPIN_SLICE_SECONDS,
    spiral_speed: SPIRAL_SPEED,
    idle_dance: None,
};

impl Default for SearchConfig {
    fn default() -> Self {
        DEFAULT_SEARCH_CONFIG
    }
}

impl SearchConfig {
    pub fn with_idle_dance(mut self, dance: IdleDanceConfig) -> Self {
        self.idle_dance = Some(dance);
        self
    }

    pub fn validate(&self) -> Result<(), RobotError> {
        if self.escalation_threshold == 0 {
            return Err(RobotError::config("escalation threshold must be at least 1"));
        }
        if self.initial_spiral_length == 0 {
            return Err(RobotError::config("initial spiral length must be at least 1"));
        }
        if !(self.spin_slice_seconds > 0.0) {
            return Err(RobotError::config(format!(
                "spin slice must be positive; got {}",
                self.spin_slice_seconds
            )));
        }
        for speed in [self.spin_left_speed, self.spin_right_speed, self.spiral_speed] {
            if !(-1.0..=1.0).contains(&speed) {
                return Err(RobotError::config(format!(
                    "wheel speed {speed} outside [-1, 1]"
                )));
            }
        }
        if let Some(dance) = &self.idle_dance {
            if dance.duration_ms == 0 {
                return Err(RobotError::config("idle dance duration must be positive"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoverConfig {
    pub left_motor_pin: u8,
    pub right_motor_pin: u8,
    pub gripper_pin: u8,
    pub gripper_open: i32,
    pub gripper_closed: i32,
    /// Raw servo positions used while creeping towards an object
    pub forward_left_position: i32,
    pub forward_right_position: i32,
    /// Timer-gate duration before the first drive command (milliseconds)
    pub initial_timer_ms: u64,
    /// Settle time between camera update and object count (milliseconds)
    pub camera_settle_ms: u64,
    pub target_poll_ms: u64,
    pub drop_poll_ms: u64,
    /// Upper bound on one approach, so a target that never leaves the
    /// frame cannot hold the loop (milliseconds)
    pub approach_timeout_ms: u64,
    pub gripper_wait_ms: u64,
}

pub const DEFAULT_ROVER_CONFIG: RoverConfig = RoverConfig {
    left_motor_pin: LEFT_MOTOR_PIN,
    right_motor_pin: RIGHT_MOTOR_PIN,
    gripper_pin: GRIPPER_PIN,
    gripper_open: GRIPPER_OPEN_POSITION,
    gripper_closed: GRIPPER_CLOSED_POSITION,
    forward_left_position: 1200,
    forward_right_position: 800,
    initial_timer_ms: 500,
    camera_settle_ms: 10,
    target_poll_ms: 50,
    drop_poll_ms: 500,
    approach_timeout_ms: 15_000,
    gripper_wait_ms: 1000,
};

impl Default for RoverConfig {
    fn default() -> Self {
        DEFAULT_ROVER_CONFIG
    }
}

impl RoverConfig {
    pub fn validate(&self) -> Result<(), RobotError> {
        let pins = [self.left_motor_pin, self.right_motor_pin, self.gripper_pin];
        if pins[0] == pins[1] || pins[0] == pins[2] || pins[1] == pins[2] {
            return Err(RobotError::config(format!(
                "servo pins must be distinct; got {pins:?}"
            )));
        }
        if self.target_poll_ms == 0 || self.drop_poll_ms == 0 {
            return Err(RobotError::config("approach poll interval must be positive"));
        }
        if self.approach_timeout_ms == 0 {
            return Err(RobotError::config("approach timeout must be positive"));
        }
        Ok(())
    }
}
