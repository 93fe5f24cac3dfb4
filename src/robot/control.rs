use log::{error, info, warn};

use crate::robot::config::SearchConfig;
use crate::robot::error::RobotError;
use crate::robot::platform::{Platform, SnapshotMode, StopSignal};
use crate::robot::spin::{HeadingEstimator, OpenLoopEstimator, SpinSearch};
use crate::robot::state::SearchState;

/// What one call to [`ControlLoop::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The stop signal was set; nothing was commanded.
    Cancelled,
    /// Searching, but the timer gate had not elapsed yet.
    Idle,
    /// Nothing found for too long; the robot danced.
    Danced,
    ApproachedTarget,
    ApproachedDrop,
    /// One spin slice was issued while looking for the target or drop zone.
    Spun {
        delivering: bool,
        rotation_completed: bool,
    },
    /// A spin slice completed the last allowed rotation and the robot
    /// drove forward for `length` seconds.
    Escalated { length: u32 },
    /// An actuator rejected a command; the loop carries on next tick.
    Faulted,
}

/// Two-mode search loop: look for pollen while empty-handed, look for the
/// drop zone while carrying it.
pub struct ControlLoop<P: Platform, E: HeadingEstimator = OpenLoopEstimator> {
    platform: P,
    spin: SpinSearch<E>,
    state: SearchState,
    config: SearchConfig,
    last_found_ms: u64,
}

impl<P: Platform> ControlLoop<P, OpenLoopEstimator> {
    pub fn new(platform: P, config: SearchConfig) -> Result<Self, RobotError> {
        let spin = SpinSearch::new(&config);
        Self::with_spin(platform, config, spin)
    }
}

impl<P: Platform, E: HeadingEstimator> ControlLoop<P, E> {
    pub fn with_spin(
        platform: P,
        config: SearchConfig,
        spin: SpinSearch<E>,
    ) -> Result<Self, RobotError> {
        config.validate()?;
        let last_found_ms = platform.now_ms();
        info!(
            "Robot: Search loop ready (escalation after {} rotations).",
            config.escalation_threshold
        );
        Ok(Self {
            platform,
            spin,
            state: SearchState::new(config.initial_spiral_length),
            config,
            last_found_ms,
        })
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn spin(&self) -> &SpinSearch<E> {
        &self.spin
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Runs one iteration of the loop.
    pub fn step(&mut self, stop: &StopSignal) -> StepOutcome {
        if stop.is_triggered() {
            return StepOutcome::Cancelled;
        }

        if self.platform.have_pollen() {
            self.deliver_step()
        } else {
            self.search_step()
        }
    }

    /// Steps until the stop signal is set.
    pub fn run(&mut self, stop: &StopSignal) {
        info!("Robot: Search loop running.");
        while self.step(stop) != StepOutcome::Cancelled {}
        info!("Robot: Search loop stopped.");
    }

    fn search_step(&mut self) -> StepOutcome {
        if !self.platform.timer_elapsed() {
            return StepOutcome::Idle;
        }

        if self.idle_too_long() {
            return self.dance();
        }

        if self.snapshot(SnapshotMode::Target) {
            info!("Robot: Target spotted, approaching.");
            if let Err(e) = self.platform.approach_object(SnapshotMode::Target) {
                error!("Robot: Approach to target failed: {}", e);
            }
            self.last_found_ms = self.platform.now_ms();
            return StepOutcome::ApproachedTarget;
        }

        let rotation_completed = match self.spin.step(&mut self.platform, &mut self.state) {
            Ok(completed) => completed,
            Err(_) => return StepOutcome::Faulted,
        };

        if self.state.should_escalate(self.config.escalation_threshold) {
            return self.escalate();
        }

        StepOutcome::Spun {
            delivering: false,
            rotation_completed,
        }
    }

    fn deliver_step(&mut self) -> StepOutcome {
        if self.snapshot(SnapshotMode::DropZone) {
            info!("Robot: Drop zone spotted, delivering pollen.");
            if let Err(e) = self.platform.approach_drop() {
                error!("Robot: Approach to drop zone failed: {}", e);
            }
            self.last_found_ms = self.platform.now_ms();
            return StepOutcome::ApproachedDrop;
        }

        match self.spin.step(&mut self.platform, &mut self.state) {
            Ok(rotation_completed) => StepOutcome::Spun {
                delivering: true,
                rotation_completed,
            },
            Err(_) => StepOutcome::Faulted,
        }
    }

    /// Drives straight out for the current spiral length. The counters move
    /// on even if the motors refuse.
    fn escalate(&mut self) -> StepOutcome {
        let length = self.state.escalate();
        info!(
            "Robot: No target after {} rotations, spiral step of {}s.",
            self.config.escalation_threshold, length
        );

        let speed = self.config.spiral_speed;
        let result = self
            .platform
            .stop()
            .and_then(|_| self.platform.drive(speed, speed, length as f32));

        match result {
            Ok(()) => StepOutcome::Escalated { length },
            Err(e) => {
                error!("Robot: Spiral step failed: {}", e);
                StepOutcome::Faulted
            }
        }
    }

    fn idle_too_long(&self) -> bool {
        match &self.config.idle_dance {
            Some(dance) => {
                self.platform.now_ms().saturating_sub(self.last_found_ms) > dance.after_ms
            }
            None => false,
        }
    }

    fn dance(&mut self) -> StepOutcome {
        let duration_ms = match &self.config.idle_dance {
            Some(dance) => dance.duration_ms,
            None => return StepOutcome::Idle,
        };
        info!("Robot: Nothing found for a while, dancing.");

        let result = self
            .platform
            .stop()
            .and_then(|_| self.platform.dance(duration_ms));
        self.last_found_ms = self.platform.now_ms();

        match result {
            Ok(()) => StepOutcome::Danced,
            Err(e) => {
                error!("Robot: Dance failed: {}", e);
                StepOutcome::Faulted
            }
        }
    }

    /// Sensor failures count as "not detected".
    fn snapshot(&mut self, mode: SnapshotMode) -> bool {
        match self.platform.search_snapshot(mode) {
            Ok(found) => found,
            Err(e) => {
                warn!("Robot: Snapshot {:?} unavailable, treating as empty: {}", mode, e);
                false
            }
        }
    }
}
