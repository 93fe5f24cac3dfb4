use crate::robot::config::{GRIPPER_PIN, LEFT_MOTOR_PIN, RIGHT_MOTOR_PIN};
use crate::robot::error::RobotError;

/// Servo ports on the simulated controller board
pub const SERVO_PORTS: usize = 3;

/// Physical parameters of the simulated arena and robot. Distances are in
/// metres, angles in degrees, times in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub arena_width: f64,
    pub arena_height: f64,
    /// x, y and heading (degrees) of the robot at power-on
    pub start: (f64, f64, f64),
    pub flower_count: usize,
    pub flower_regrow_ms: u64,
    pub drop_zone: (f64, f64),
    pub drop_zone_radius: f64,

    /// Ground speed of a wheel at full servo deflection (m/s)
    pub max_wheel_speed: f64,
    pub wheel_base: f64,
    /// The right motor is weaker than the left, which is why the creep
    /// positions are not symmetric.
    pub right_motor_gain: f64,
    /// Largest fraction of wheel speed lost to slip
    pub slip_amplitude: f64,

    pub camera_fov: f64,
    pub camera_range: f64,
    /// Objects closer than this are below the lens
    pub camera_min_range: f64,
    /// Chance that a visible object is missed in a frame
    pub camera_miss_rate: f64,
    /// Chance that a frame cannot be read at all
    pub camera_glitch_rate: f64,

    pub grab_range: f64,
    pub physics_step_ms: u64,

    pub left_motor_pin: u8,
    pub right_motor_pin: u8,
    pub gripper_pin: u8,
}

pub const DEFAULT_SIM_CONFIG: SimConfig = SimConfig {
    arena_width: 6.0,
    arena_height: 3.0,
    start: (3.0, 1.5, 0.0),
    flower_count: 6,
    flower_regrow_ms: 60_000,
    drop_zone: (0.6, 1.5),
    drop_zone_radius: 0.35,

    max_wheel_speed: 1.0,
    wheel_base: 0.15,
    right_motor_gain: 0.79,
    slip_amplitude: 0.15,

    camera_fov: 50.0,
    camera_range: 2.5,
    camera_min_range: 0.12,
    camera_miss_rate: 0.05,
    camera_glitch_rate: 0.01,

    grab_range: 0.2,
    physics_step_ms: 10,

    left_motor_pin: LEFT_MOTOR_PIN,
    right_motor_pin: RIGHT_MOTOR_PIN,
    gripper_pin: GRIPPER_PIN,
};

impl Default for SimConfig {
    fn default() -> Self {
        DEFAULT_SIM_CONFIG
    }
}

impl SimConfig {
    /// Perfect sensors and traction, for deterministic runs.
    pub fn ideal(mut self) -> Self {
        self.slip_amplitude = 0.0;
        self.camera_miss_rate = 0.0;
        self.camera_glitch_rate = 0.0;
        self
    }

    pub fn validate(&self) -> Result<(), RobotError> {
        if self.arena_width <= 0.0 || self.arena_height <= 0.0 {
            return Err(RobotError::config("arena must have a positive size"));
        }
        if self.wheel_base <= 0.0 {
            return Err(RobotError::config("wheel base must be positive"));
        }
        let pins = [self.left_motor_pin, self.right_motor_pin, self.gripper_pin];
        if let Some(pin) = pins.iter().find(|&&p| usize::from(p) >= SERVO_PORTS) {
            return Err(RobotError::config(format!(
                "servo pin {pin} outside the {SERVO_PORTS} board ports"
            )));
        }
        if pins[0] == pins[1] || pins[0] == pins[2] || pins[1] == pins[2] {
            return Err(RobotError::config(format!(
                "servo pins must be distinct; got {pins:?}"
            )));
        }
        if self.physics_step_ms == 0 {
            return Err(RobotError::config("physics step must be positive"));
        }
        for (name, rate) in [
            ("miss", self.camera_miss_rate),
            ("glitch", self.camera_glitch_rate),
            ("slip", self.slip_amplitude),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(RobotError::config(format!(
                    "{name} rate must be within [0, 1]; got {rate}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(DEFAULT_SIM_CONFIG.validate().is_ok());
        assert!(SimConfig::default().ideal().validate().is_ok());
    }

    #[test]
    fn pin_past_last_port_is_rejected() {
        let config = SimConfig {
            left_motor_pin: 3,
            ..SimConfig::default()
        };
        assert!(matches!(config.validate(), Err(RobotError::InvalidConfig(_))));
    }

    #[test]
    fn shared_pins_are_rejected() {
        let config = SimConfig {
            right_motor_pin: GRIPPER_PIN,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
