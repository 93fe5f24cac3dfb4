use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::robot::config::{DROP_ZONE_CHANNEL, TARGET_CHANNEL};
use crate::robot::error::RobotError;

/// Object class a snapshot is classified against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotMode {
    /// Flower carrying pollen (camera channel 0)
    Target,
    /// Drop zone (camera channel 1)
    DropZone,
}

impl SnapshotMode {
    pub fn channel(self) -> u8 {
        match self {
            SnapshotMode::Target => TARGET_CHANNEL,
            SnapshotMode::DropZone => DROP_ZONE_CHANNEL,
        }
    }
}

/// Actuation and sensing boundary of the search loop.
///
/// Everything physical (motors, camera, gripper, clock) sits behind this
/// trait. The loop only consumes detection booleans and the payload flag.
pub trait Platform {
    /// Commands differential motion. `duration_s` re-arms the timer gate.
    fn drive(&mut self, left: f32, right: f32, duration_s: f32) -> Result<(), RobotError>;

    fn stop(&mut self) -> Result<(), RobotError>;

    /// Polled gate: true once the duration of the last drive has passed.
    fn timer_elapsed(&mut self) -> bool;

    fn search_snapshot(&mut self, mode: SnapshotMode) -> Result<bool, RobotError>;

    /// Drives at the detected object and grips it. Leaves `have_pollen`
    /// set on return.
    fn approach_object(&mut self, mode: SnapshotMode) -> Result<(), RobotError>;

    /// Drives at the detected drop zone and releases the payload. Leaves
    /// `have_pollen` cleared on return.
    fn approach_drop(&mut self) -> Result<(), RobotError>;

    fn have_pollen(&self) -> bool;

    /// Platform clock in milliseconds.
    fn now_ms(&self) -> u64;

    /// Spins back and forth in place for `duration_ms`.
    fn dance(&mut self, duration_ms: u64) -> Result<(), RobotError>;
}

/// Cooperative cancellation flag checked at the top of every loop step.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_modes_map_to_camera_channels() {
        assert_eq!(SnapshotMode::Target.channel(), 0);
        assert_eq!(SnapshotMode::DropZone.channel(), 1);
    }

    #[test]
    fn stop_signal_is_shared_between_clones() {
        let signal = StopSignal::new();
        let remote = signal.clone();
        assert!(!signal.is_triggered());
        remote.trigger();
        assert!(signal.is_triggered());
    }
}
