use log::{debug, info, warn};

use crate::robot::config::{RoverConfig, SERVO_MAX_POSITION};
use crate::robot::error::RobotError;
use crate::robot::hardware::{wheel_positions, Hardware};
use crate::robot::platform::{Platform, SnapshotMode};

/// Wheel speeds and duration of `stop()`
const STOP_DURATION_SECONDS: f32 = 0.25;
/// Reverse-and-turn after releasing pollen
const DROP_BACKUP: (f32, f32, f32, u64) = (-1.0, -1.0, 0.2, 800);
const DROP_TURN: (f32, f32, f32, u64) = (-1.0, 1.0, 0.3, 1000);
/// Half-cycle of the idle dance
const DANCE_SPEED: f32 = 0.2;
const DANCE_HALF_SECONDS: f32 = 0.5;
const DANCE_HALF_MS: u64 = 500;

/// Differential-drive robot with a gripper and a camera.
///
/// Drive commands are fire-and-forget: the servos keep turning after
/// `drive` returns and the timer gate reports when the commanded duration
/// has run out.
pub struct Rover<H: Hardware> {
    hardware: H,
    config: RoverConfig,
    timer_start_ms: u64,
    timer_duration_ms: u64,
    have_pollen: bool,
}

impl<H: Hardware> Rover<H> {
    /// Enables the servos, parks the wheels and opens the camera.
    pub fn new(hardware: H, config: RoverConfig) -> Result<Self, RobotError> {
        config.validate()?;
        let timer_start_ms = hardware.now_ms();
        let mut rover = Self {
            hardware,
            timer_duration_ms: config.initial_timer_ms,
            config,
            timer_start_ms,
            have_pollen: false,
        };

        rover.hardware.enable_servo(rover.config.left_motor_pin)?;
        rover.hardware.enable_servo(rover.config.right_motor_pin)?;
        rover.hardware.enable_servo(rover.config.gripper_pin)?;
        rover.drive(0.0, 0.0, 1.0)?;
        rover.hardware.camera_open()?;

        info!("Robot: Rover initialized.");
        Ok(rover)
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    /// Creeps forward on raw servo positions, without touching the timer.
    fn forward(&mut self) -> Result<(), RobotError> {
        self.hardware
            .set_servo_position(self.config.left_motor_pin, self.config.forward_left_position)?;
        self.hardware
            .set_servo_position(self.config.right_motor_pin, self.config.forward_right_position)
    }

    fn set_gripper(&mut self, position: i32) -> Result<(), RobotError> {
        self.hardware
            .set_servo_position(self.config.gripper_pin, position)
    }

    /// A missing frame ends an approach the same way losing sight does.
    fn still_visible(&mut self, mode: SnapshotMode) -> bool {
        match self.search_snapshot(mode) {
            Ok(visible) => visible,
            Err(e) => {
                warn!("Robot: Lost camera during approach: {}", e);
                false
            }
        }
    }

    /// Creeps forward while the object stays in frame, bounded by the
    /// approach timeout.
    fn creep_towards(&mut self, mode: SnapshotMode, poll_ms: u64) -> Result<(), RobotError> {
        let started = self.hardware.now_ms();
        while self.still_visible(mode) {
            if self.hardware.now_ms().saturating_sub(started) > self.config.approach_timeout_ms {
                warn!("Robot: Approach to {:?} timed out.", mode);
                break;
            }
            self.forward()?;
            self.hardware.sleep_ms(poll_ms);
        }
        Ok(())
    }
}

impl<H: Hardware> Platform for Rover<H> {
    fn drive(&mut self, left: f32, right: f32, duration_s: f32) -> Result<(), RobotError> {
        let (left_position, right_position) = wheel_positions(left, right, SERVO_MAX_POSITION);

        self.timer_duration_ms = (duration_s.max(0.0) * 1000.0) as u64;
        self.timer_start_ms = self.hardware.now_ms();

        self.hardware
            .set_servo_position(self.config.left_motor_pin, left_position)?;
        self.hardware
            .set_servo_position(self.config.right_motor_pin, right_position)
    }

    fn stop(&mut self) -> Result<(), RobotError> {
        self.drive(0.0, 0.0, STOP_DURATION_SECONDS)
    }

    fn timer_elapsed(&mut self) -> bool {
        self.hardware.now_ms() > self.timer_start_ms + self.timer_duration_ms
    }

    fn search_snapshot(&mut self, mode: SnapshotMode) -> Result<bool, RobotError> {
        self.hardware.camera_update()?;
        self.hardware.sleep_ms(self.config.camera_settle_ms);
        let count = self.hardware.object_count(mode.channel())?;
        if count > 0 {
            debug!("Robot: Found {} object(s) for {:?}.", count, mode);
        }
        Ok(count > 0)
    }

    fn approach_object(&mut self, mode: SnapshotMode) -> Result<(), RobotError> {
        let wait = self.config.gripper_wait_ms;
        self.stop()?;
        self.set_gripper(self.config.gripper_open)?;
        self.hardware.sleep_ms(wait);

        self.creep_towards(mode, self.config.target_poll_ms)?;

        // out of frame means it is between the gripper fingers
        self.stop()?;
        self.hardware.sleep_ms(wait);
        self.set_gripper(self.config.gripper_closed)?;
        self.have_pollen = true;
        self.hardware.sleep_ms(wait);
        info!("Robot: Gripper closed, carrying pollen.");
        Ok(())
    }

    fn approach_drop(&mut self) -> Result<(), RobotError> {
        let wait = self.config.gripper_wait_ms;
        self.stop()?;

        self.creep_towards(SnapshotMode::DropZone, self.config.drop_poll_ms)?;

        self.stop()?;
        self.hardware.sleep_ms(wait);
        self.set_gripper(self.config.gripper_open)?;
        self.have_pollen = false;
        self.hardware.sleep_ms(wait);
        info!("Robot: Pollen released.");

        for (left, right, duration, pause) in [DROP_BACKUP, DROP_TURN] {
            self.drive(left, right, duration)?;
            self.hardware.sleep_ms(pause);
        }
        Ok(())
    }

    fn have_pollen(&self) -> bool {
        self.have_pollen
    }

    fn now_ms(&self) -> u64 {
        self.hardware.now_ms()
    }

    fn dance(&mut self, duration_ms: u64) -> Result<(), RobotError> {
        let started = self.hardware.now_ms();
        while self.hardware.now_ms().saturating_sub(started) < duration_ms {
            self.drive(DANCE_SPEED, -DANCE_SPEED, DANCE_HALF_SECONDS)?;
            self.hardware.sleep_ms(DANCE_HALF_MS);
            self.drive(-DANCE_SPEED, DANCE_SPEED, DANCE_HALF_SECONDS)?;
            self.hardware.sleep_ms(DANCE_HALF_MS);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::config::{GRIPPER_CLOSED_POSITION, GRIPPER_OPEN_POSITION, GRIPPER_PIN};
    use std::collections::VecDeque;

    /// Board double with a manual clock and scripted camera frames.
    #[derive(Default)]
    struct FakeBoard {
        now_ms: u64,
        enabled: Vec<u8>,
        writes: Vec<(u8, i32)>,
        /// One entry per camera update: counts for channel 0 and 1
        frames: VecDeque<[usize; 2]>,
        frame: [usize; 2],
        camera_open: bool,
        camera_broken: bool,
        stuck_pin: Option<u8>,
    }

    impl Hardware for FakeBoard {
        fn enable_servo(&mut self, pin: u8) -> Result<(), RobotError> {
            self.enabled.push(pin);
            Ok(())
        }
        fn set_servo_position(&mut self, pin: u8, position: i32) -> Result<(), RobotError> {
            if self.stuck_pin == Some(pin) {
                return Err(RobotError::actuator(pin, "stuck"));
            }
            self.writes.push((pin, position));
            Ok(())
        }
        fn camera_open(&mut self) -> Result<(), RobotError> {
            self.camera_open = true;
            Ok(())
        }
        fn camera_update(&mut self) -> Result<(), RobotError> {
            if self.camera_broken {
                return Err(RobotError::sensor(0, "no frame"));
            }
            self.frame = self.frames.pop_front().unwrap_or([0, 0]);
            Ok(())
        }
        fn object_count(&self, channel: u8) -> Result<usize, RobotError> {
            Ok(self.frame[usize::from(channel)])
        }
        fn now_ms(&self) -> u64 {
            self.now_ms
        }
        fn sleep_ms(&mut self, ms: u64) {
            self.now_ms += ms;
        }
    }

    fn rover(board: FakeBoard) -> Rover<FakeBoard> {
        Rover::new(board, RoverConfig::default()).unwrap()
    }

    fn gripper_writes(rover: &Rover<FakeBoard>) -> Vec<i32> {
        rover
            .hardware()
            .writes
            .iter()
            .filter(|(pin, _)| *pin == GRIPPER_PIN)
            .map(|(_, pos)| *pos)
            .collect()
    }

    #[test]
    fn startup_enables_servos_and_parks_wheels() {
        let rover = rover(FakeBoard::default());
        let board = rover.hardware();
        assert_eq!(board.enabled, vec![1, 0, 2]);
        assert_eq!(board.writes, vec![(1, 1023), (0, 1023)]);
        assert!(board.camera_open);
    }

    #[test]
    fn drive_maps_speeds_to_mirrored_servos() {
        let mut rover = rover(FakeBoard::default());
        rover.hardware_mut().writes.clear();

        rover.drive(1.0, 1.0, 0.5).unwrap();

        assert_eq!(rover.hardware().writes, vec![(1, 2047), (0, 0)]);
    }

    #[test]
    fn timer_gate_follows_last_drive() {
        let mut rover = rover(FakeBoard::default());
        // startup parked the wheels for one second
        rover.hardware_mut().now_ms = 1000;
        assert!(!rover.timer_elapsed());
        rover.hardware_mut().now_ms = 1001;
        assert!(rover.timer_elapsed());

        rover.drive(-0.07, 0.07, 0.1).unwrap();
        rover.hardware_mut().now_ms = 1101;
        assert!(!rover.timer_elapsed());
        rover.hardware_mut().now_ms = 1102;
        assert!(rover.timer_elapsed());
    }

    #[test]
    fn snapshot_reads_requested_channel() {
        let mut board = FakeBoard::default();
        board.frames.extend([[0, 2], [3, 0]]);
        let mut rover = rover(board);

        assert!(!rover.search_snapshot(SnapshotMode::Target).unwrap());
        assert!(!rover.search_snapshot(SnapshotMode::DropZone).unwrap());
        assert_eq!(rover.hardware().now_ms, 20);
    }

    #[test]
    fn broken_camera_surfaces_sensor_error() {
        let board = FakeBoard {
            camera_broken: true,
            ..FakeBoard::default()
        };
        let mut rover = rover(board);
        assert!(matches!(
            rover.search_snapshot(SnapshotMode::Target),
            Err(RobotError::SensorUnavailable { .. })
        ));
    }

    #[test]
    fn approach_creeps_until_target_leaves_frame_then_grips() {
        let mut board = FakeBoard::default();
        board.frames.extend([[1, 0], [1, 0], [1, 0]]);
        let mut rover = rover(board);
        rover.hardware_mut().writes.clear();

        rover.approach_object(SnapshotMode::Target).unwrap();

        assert!(rover.have_pollen());
        assert_eq!(
            gripper_writes(&rover),
            vec![GRIPPER_OPEN_POSITION, GRIPPER_CLOSED_POSITION]
        );
        let creeps = rover
            .hardware()
            .writes
            .iter()
            .filter(|w| **w == (1, 1200))
            .count();
        assert_eq!(creeps, 3);
    }

    #[test]
    fn approach_gives_up_after_timeout() {
        let mut board = FakeBoard::default();
        board.frames.extend(std::iter::repeat([1, 0]).take(10_000));
        let config = RoverConfig {
            approach_timeout_ms: 500,
            ..RoverConfig::default()
        };
        let mut rover = Rover::new(board, config).unwrap();

        rover.approach_object(SnapshotMode::Target).unwrap();

        assert!(rover.have_pollen());
        assert!(rover.hardware().frames.len() > 9_000);
    }

    #[test]
    fn drop_releases_and_backs_away() {
        let mut board = FakeBoard::default();
        board.frames.extend([[1, 0], [0, 1]]);
        let mut rover = rover(board);
        rover.approach_object(SnapshotMode::Target).unwrap();
        rover.hardware_mut().writes.clear();

        rover.approach_drop().unwrap();

        assert!(!rover.have_pollen());
        assert_eq!(gripper_writes(&rover), vec![GRIPPER_OPEN_POSITION]);
        let tail: Vec<_> = rover.hardware().writes.iter().rev().take(4).copied().collect();
        // reverse, then spin left
        assert_eq!(tail, vec![(0, 0), (1, 0), (0, 2047), (1, 0)]);
    }

    #[test]
    fn dance_runs_for_requested_time() {
        let mut rover = rover(FakeBoard::default());
        rover.hardware_mut().writes.clear();

        rover.dance(2000).unwrap();

        assert_eq!(rover.hardware().now_ms, 2000);
        assert_eq!(rover.hardware().writes.len(), 8);
    }

    #[test]
    fn stuck_motor_is_reported() {
        let mut rover = rover(FakeBoard::default());
        rover.hardware_mut().stuck_pin = Some(0);
        assert!(matches!(
            rover.stop(),
            Err(RobotError::ActuatorFault { pin: 0, .. })
        ));
    }
}
