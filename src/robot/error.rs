use thiserror::Error;

/// Failures at the actuation/sensing boundary.
///
/// None of these stop the control loop. Sensor failures are read as
/// "nothing detected", actuator failures are logged and the next tick
/// carries on.
#[derive(Debug, Error)]
pub enum RobotError {
    /// The camera (or another sensor) produced no usable frame.
    #[error("sensor unavailable on channel {channel}: {reason}")]
    SensorUnavailable { channel: u8, reason: String },

    /// A servo or motor rejected a command.
    #[error("actuator fault on pin {pin}: {reason}")]
    ActuatorFault { pin: u8, reason: String },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RobotError {
    pub fn sensor(channel: u8, reason: impl Into<String>) -> Self {
        Self::SensorUnavailable {
            channel,
            reason: reason.into(),
        }
    }

    pub fn actuator(pin: u8, reason: impl Into<String>) -> Self {
        Self::ActuatorFault {
            pin,
            reason: reason.into(),
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}
