use log::info;

use crate::mission::MissionLog;
use crate::robot::config::{RoverConfig, SearchConfig, DEFAULT_IDLE_DANCE};
use crate::robot::{ControlLoop, Platform, RobotError, Rover, StepOutcome, StopSignal};
use crate::sim::{SimConfig, SimWorld};

/// Simulated time that passes between two loop iterations (milliseconds)
pub const SIM_STEP_MS: u64 = 20;
/// Loop iterations run per UI tick
pub const STEPS_PER_TICK: usize = 5;

pub type SimControl = ControlLoop<Rover<SimWorld>>;

pub struct App {
    pub control: SimControl,
    pub mission: MissionLog,
    pub last_outcome: StepOutcome,
    pub paused: bool,
    stop: StopSignal,
}

impl App {
    /// Builds the arena from the given seeds, powers the rover up on it and
    /// wraps it in the search loop.
    pub fn new(world_seed: u64, slip_seed: u32) -> Result<Self, RobotError> {
        let world = SimWorld::new(SimConfig::default(), world_seed, slip_seed)?;
        let rover = Rover::new(world, RoverConfig::default())?;
        let config = SearchConfig::default().with_idle_dance(DEFAULT_IDLE_DANCE);
        let control = ControlLoop::new(rover, config)?;
        info!("App: Simulation ready (world seed {}).", world_seed);
        Ok(Self {
            control,
            mission: MissionLog::new(),
            last_outcome: StepOutcome::Idle,
            paused: false,
            stop: StopSignal::new(),
        })
    }

    pub fn world(&self) -> &SimWorld {
        self.control.platform().hardware()
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Advances the simulation by one UI tick.
    pub fn update(&mut self) {
        if self.paused {
            return;
        }
        for _ in 0..STEPS_PER_TICK {
            self.control.platform_mut().hardware_mut().advance(SIM_STEP_MS);
            let outcome = self.control.step(&self.stop);
            if outcome == StepOutcome::Cancelled {
                self.last_outcome = outcome;
                return;
            }
            let now = self.control.platform().now_ms();
            self.mission.record(outcome, now);
            if outcome != StepOutcome::Idle {
                self.last_outcome = outcome;
            }
        }
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        info!("App: {}", if self.paused { "Paused." } else { "Resumed." });
    }

    pub fn quit(&self) {
        self.stop.trigger();
    }

    pub fn should_quit(&self) -> bool {
        self.stop.is_triggered()
    }
}
