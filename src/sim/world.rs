use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::f64::consts::TAU;

use crate::robot::config::{DROP_ZONE_CHANNEL, SERVO_MAX_POSITION, TARGET_CHANNEL};
use crate::robot::error::RobotError;
use crate::robot::hardware::{wheel_speeds, Hardware};
use crate::sim::config::{SimConfig, SERVO_PORTS};
use crate::sim::flowers::{Flower, FlowerField};
use crate::sim::slip::{Wheel, WheelSlip};

/// Flowers are kept at least this far from the drop zone and the start
const FLOWER_CLEARANCE: f64 = 0.8;
/// Keeps the chassis inside the arena walls
const WALL_MARGIN: f64 = 0.1;
/// Normalized wheel speed below which a servo does not turn
const SERVO_DEADBAND: f32 = 0.002;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    /// Radians, counter-clockwise from +x
    pub heading: f64,
}

impl Pose {
    /// Distance and bearing (degrees, positive to the left) of a point.
    pub fn relative(&self, x: f64, y: f64) -> (f64, f64) {
        let dx = x - self.x;
        let dy = y - self.y;
        let bearing = dy.atan2(dx) - self.heading;
        let bearing = (bearing + std::f64::consts::PI).rem_euclid(TAU) - std::f64::consts::PI;
        (dx.hypot(dy), bearing.to_degrees())
    }

    pub fn heading_degrees(&self) -> f64 {
        self.heading.to_degrees().rem_euclid(360.0)
    }
}

/// Simulated arena: a differential-drive robot, pollen flowers and a drop
/// zone, seen through a blob-tracking camera. Implements [`Hardware`] so
/// the real rover code drives it.
pub struct SimWorld {
    config: SimConfig,
    clock_ms: u64,
    pose: Pose,
    servo_positions: [i32; SERVO_PORTS],
    enabled: HashSet<u8>,
    camera_open: bool,
    frame: [usize; 2],
    flowers: FlowerField,
    carrying: bool,
    delivered: u32,
    spilled: u32,
    turned_degrees: f64,
    distance_travelled: f64,
    slip: WheelSlip,
    rng: StdRng,
}

impl SimWorld {
    pub fn new(config: SimConfig, seed: u64, slip_seed: u32) -> Result<Self, RobotError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let (start_x, start_y, _) = config.start;
        let flowers = FlowerField::scatter(
            &mut rng,
            config.flower_count,
            config.arena_width,
            config.arena_height,
            &[config.drop_zone, (start_x, start_y)],
            FLOWER_CLEARANCE,
            config.flower_regrow_ms,
        );
        let world = Self::with_flowers(config, flowers, rng, slip_seed)?;
        info!(
            "Sim: Arena {}x{} m with {} flowers.",
            world.config.arena_width,
            world.config.arena_height,
            world.flowers.flowers().len()
        );
        Ok(world)
    }

    /// World with hand-placed flowers.
    pub fn with_flowers(
        config: SimConfig,
        flowers: FlowerField,
        rng: StdRng,
        slip_seed: u32,
    ) -> Result<Self, RobotError> {
        config.validate()?;
        let (x, y, heading_deg) = config.start;
        let neutral = (SERVO_MAX_POSITION / 2.0) as i32;
        Ok(Self {
            slip: WheelSlip::new(slip_seed, config.slip_amplitude),
            config,
            clock_ms: 0,
            pose: Pose {
                x,
                y,
                heading: heading_deg.to_radians(),
            },
            servo_positions: [neutral; SERVO_PORTS],
            enabled: HashSet::new(),
            camera_open: false,
            frame: [0, 0],
            flowers,
            carrying: false,
            delivered: 0,
            spilled: 0,
            turned_degrees: 0.0,
            distance_travelled: 0.0,
            rng,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn flowers(&self) -> &[Flower] {
        self.flowers.flowers()
    }

    pub fn carrying(&self) -> bool {
        self.carrying
    }

    pub fn delivered(&self) -> u32 {
        self.delivered
    }

    pub fn spilled(&self) -> u32 {
        self.spilled
    }

    /// Total absolute rotation of the chassis so far (degrees).
    pub fn turned_degrees(&self) -> f64 {
        self.turned_degrees
    }

    pub fn distance_travelled(&self) -> f64 {
        self.distance_travelled
    }

    pub fn in_drop_zone(&self) -> bool {
        let (x, y) = self.config.drop_zone;
        (self.pose.x - x).hypot(self.pose.y - y) <= self.config.drop_zone_radius
    }

    /// Current wheel ground speeds (m/s) before slip.
    pub fn wheel_speeds(&self) -> (f64, f64) {
        let left = self.servo_positions[usize::from(self.config.left_motor_pin)];
        let right = self.servo_positions[usize::from(self.config.right_motor_pin)];
        let (l, r) = wheel_speeds(left, right, SERVO_MAX_POSITION);
        let (l, r) = (deadband(l), deadband(r));
        (
            f64::from(l) * self.config.max_wheel_speed,
            f64::from(r) * self.config.max_wheel_speed * self.config.right_motor_gain,
        )
    }

    /// Lets `ms` of simulated time pass with the current servo outputs.
    pub fn advance(&mut self, ms: u64) {
        let step = self.config.physics_step_ms;
        let mut remaining = ms;
        while remaining > 0 {
            let dt_ms = remaining.min(step);
            self.integrate(dt_ms);
            self.clock_ms += dt_ms;
            remaining -= dt_ms;
        }
        self.flowers.regrow(self.clock_ms);
    }

    fn integrate(&mut self, dt_ms: u64) {
        let (left, right) = self.wheel_speeds();
        let left = left * self.slip.traction(Wheel::Left, self.clock_ms);
        let right = right * self.slip.traction(Wheel::Right, self.clock_ms);
        let dt = dt_ms as f64 / 1000.0;

        let speed = (left + right) / 2.0;
        let omega = (right - left) / self.config.wheel_base;

        let dtheta = omega * dt;
        self.pose.heading = (self.pose.heading + dtheta).rem_euclid(TAU);
        self.turned_degrees += dtheta.abs().to_degrees();

        let x = self.pose.x + speed * self.pose.heading.cos() * dt;
        let y = self.pose.y + speed * self.pose.heading.sin() * dt;
        let clamped_x = x.clamp(WALL_MARGIN, self.config.arena_width - WALL_MARGIN);
        let clamped_y = y.clamp(WALL_MARGIN, self.config.arena_height - WALL_MARGIN);
        self.distance_travelled += (clamped_x - self.pose.x).hypot(clamped_y - self.pose.y);
        self.pose.x = clamped_x;
        self.pose.y = clamped_y;
    }

    fn in_view(&self, x: f64, y: f64) -> bool {
        let (distance, bearing) = self.pose.relative(x, y);
        distance >= self.config.camera_min_range
            && distance <= self.config.camera_range
            && bearing.abs() <= self.config.camera_fov / 2.0
    }

    fn seen(&mut self, visible: bool) -> bool {
        visible && !self.rng.random_bool(self.config.camera_miss_rate)
    }

    fn operate_gripper(&mut self, position: i32) {
        let closing = position as f32 >= SERVO_MAX_POSITION / 4.0;
        if closing {
            if self.carrying {
                return;
            }
            let pose = self.pose;
            let reach = self.config.grab_range;
            let half_fov = self.config.camera_fov / 2.0;
            self.carrying = self.flowers.harvest(self.clock_ms, |flower| {
                let (distance, bearing) = pose.relative(flower.x, flower.y);
                (distance <= reach && bearing.abs() <= half_fov).then_some(distance)
            });
            if self.carrying {
                info!("Sim: Pollen picked up at ({:.2}, {:.2}).", pose.x, pose.y);
            } else {
                debug!("Sim: Gripper closed on nothing.");
            }
        } else if self.carrying {
            self.carrying = false;
            if self.in_drop_zone() {
                self.delivered += 1;
                info!("Sim: Pollen delivered ({} total).", self.delivered);
            } else {
                self.spilled += 1;
                warn!("Sim: Pollen dropped outside the drop zone.");
            }
        }
    }
}

fn deadband(speed: f32) -> f32 {
    if speed.abs() < SERVO_DEADBAND {
        0.0
    } else {
        speed
    }
}

impl Hardware for SimWorld {
    fn enable_servo(&mut self, pin: u8) -> Result<(), RobotError> {
        if usize::from(pin) >= self.servo_positions.len() {
            return Err(RobotError::actuator(pin, "no such servo port"));
        }
        self.enabled.insert(pin);
        Ok(())
    }

    fn set_servo_position(&mut self, pin: u8, position: i32) -> Result<(), RobotError> {
        if !self.enabled.contains(&pin) {
            return Err(RobotError::actuator(pin, "servo not enabled"));
        }
        let position = position.clamp(0, SERVO_MAX_POSITION as i32);
        self.servo_positions[usize::from(pin)] = position;
        if pin == self.config.gripper_pin {
            self.operate_gripper(position);
        }
        Ok(())
    }

    fn camera_open(&mut self) -> Result<(), RobotError> {
        self.camera_open = true;
        Ok(())
    }

    fn camera_update(&mut self) -> Result<(), RobotError> {
        if !self.camera_open {
            return Err(RobotError::sensor(TARGET_CHANNEL, "camera not open"));
        }
        if self.rng.random_bool(self.config.camera_glitch_rate) {
            self.frame = [0, 0];
            return Err(RobotError::sensor(TARGET_CHANNEL, "frame dropped"));
        }

        let visible: Vec<bool> = self
            .flowers
            .with_pollen()
            .map(|f| self.in_view(f.x, f.y))
            .collect();
        let targets = visible.into_iter().filter(|&v| self.seen(v)).count();

        let (zone_x, zone_y) = self.config.drop_zone;
        let zone_visible = self.in_view(zone_x, zone_y);
        let zone = usize::from(self.seen(zone_visible));

        self.frame = [targets, zone];
        Ok(())
    }

    fn object_count(&self, channel: u8) -> Result<usize, RobotError> {
        match channel {
            TARGET_CHANNEL | DROP_ZONE_CHANNEL => Ok(self.frame[usize::from(channel)]),
            other => Err(RobotError::sensor(other, "channel not configured")),
        }
    }

    fn now_ms(&self) -> u64 {
        self.clock_ms
    }

    fn sleep_ms(&mut self, ms: u64) {
        self.advance(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with(flowers: Vec<Flower>) -> SimWorld {
        let config = SimConfig::default().ideal();
        let field = FlowerField::new(flowers, config.flower_regrow_ms);
        let mut world = SimWorld::with_flowers(config, field, StdRng::seed_from_u64(7), 3).unwrap();
        for pin in 0..SERVO_PORTS as u8 {
            world.enable_servo(pin).unwrap();
        }
        world.camera_open().unwrap();
        world
    }

    #[test]
    fn world_refuses_pins_off_the_board() {
        let config = SimConfig {
            left_motor_pin: 3,
            ..SimConfig::default().ideal()
        };
        let field = FlowerField::new(Vec::new(), config.flower_regrow_ms);
        let world = SimWorld::with_flowers(config, field, StdRng::seed_from_u64(1), 1);
        assert!(matches!(world, Err(RobotError::InvalidConfig(_))));
    }

    #[test]
    fn relative_bearing_is_signed_left_positive() {
        let pose = Pose {
            x: 0.0,
            y: 0.0,
            heading: 0.0,
        };
        let (distance, bearing) = pose.relative(1.0, 1.0);
        assert!((distance - 2f64.sqrt()).abs() < 1e-9);
        assert!((bearing - 45.0).abs() < 1e-9);
        let (_, bearing) = pose.relative(-1.0, -0.0001);
        assert!(bearing < -179.0);
    }

    #[test]
    fn camera_sees_flower_ahead_but_not_behind() {
        let mut world = world_with(vec![Flower::new(4.0, 1.5)]);
        world.camera_update().unwrap();
        assert_eq!(world.object_count(0).unwrap(), 1);

        let mut world = world_with(vec![Flower::new(2.0, 1.5)]);
        world.camera_update().unwrap();
        assert_eq!(world.object_count(0).unwrap(), 0);
    }

    #[test]
    fn closed_camera_has_no_frames() {
        let config = SimConfig::default().ideal();
        let field = FlowerField::new(Vec::new(), 0);
        let mut world = SimWorld::with_flowers(config, field, StdRng::seed_from_u64(1), 1).unwrap();
        assert!(world.camera_update().is_err());
        assert!(world.object_count(5).is_err());
    }

    #[test]
    fn servo_must_be_enabled() {
        let config = SimConfig::default().ideal();
        let field = FlowerField::new(Vec::new(), 0);
        let mut world = SimWorld::with_flowers(config, field, StdRng::seed_from_u64(1), 1).unwrap();
        assert!(matches!(
            world.set_servo_position(1, 2047),
            Err(RobotError::ActuatorFault { pin: 1, .. })
        ));
    }

    #[test]
    fn full_forward_moves_along_heading() {
        let mut world = world_with(Vec::new());
        world.set_servo_position(1, 2047).unwrap();
        world.set_servo_position(0, 0).unwrap();

        world.advance(1000);

        let pose = world.pose();
        assert!(pose.x > 3.5, "x = {}", pose.x);
        assert!(world.distance_travelled() > 0.5);
        assert_eq!(world.now_ms(), 1000);
    }

    #[test]
    fn opposite_wheels_turn_in_place() {
        let mut world = world_with(Vec::new());
        world.set_servo_position(1, 0).unwrap();
        world.set_servo_position(0, 0).unwrap();

        world.advance(500);

        assert!(world.turned_degrees() > 90.0);
        assert!(world.pose().heading_degrees() > 0.0);
    }

    #[test]
    fn parked_servos_hold_still() {
        let mut world = world_with(Vec::new());
        world.set_servo_position(1, 1023).unwrap();
        world.set_servo_position(0, 1023).unwrap();

        world.advance(5000);

        assert_eq!(world.distance_travelled(), 0.0);
        assert_eq!(world.turned_degrees(), 0.0);
    }

    #[test]
    fn gripper_picks_up_and_delivers() {
        let mut world = world_with(vec![Flower::new(3.15, 1.5)]);
        world.set_servo_position(2, 1023).unwrap();
        assert!(world.carrying());
        assert!(!world.flowers()[0].has_pollen);

        world.pose = Pose {
            x: 0.6,
            y: 1.5,
            heading: 0.0,
        };
        world.set_servo_position(2, 0).unwrap();
        assert!(!world.carrying());
        assert_eq!(world.delivered(), 1);
    }

    #[test]
    fn pollen_released_outside_zone_is_spilled() {
        let mut world = world_with(vec![Flower::new(3.15, 1.5)]);
        world.set_servo_position(2, 1023).unwrap();
        world.set_servo_position(2, 0).unwrap();
        assert_eq!(world.spilled(), 1);
        assert_eq!(world.delivered(), 0);
    }
}
