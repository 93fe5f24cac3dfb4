pub mod config;
pub mod control;
pub mod error;
pub mod hardware;
pub mod platform;
pub mod rover;
pub mod spin;
pub mod state;

pub use control::{ControlLoop, StepOutcome};
pub use error::RobotError;
pub use platform::{Platform, SnapshotMode, StopSignal};
pub use rover::Rover;
pub use spin::{HeadingEstimator, OpenLoopEstimator, SpinSearch};
pub use state::SearchState;
